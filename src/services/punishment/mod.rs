pub mod dispatcher;
pub mod state_machine;

pub use state_machine::{apply_violation, PunishmentAction, Tier, Transition};
