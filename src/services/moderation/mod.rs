pub mod pipeline;

pub use pipeline::{
    Decision, InboundMessage, ModerationPipeline, ModerationPolicy, PunishmentOutcome, SkipReason,
};
