/// Private notice sent on a first offense
pub const WARNING_NOTICE: &str = "⚠️ Your message in the server was flagged as spam and has been removed.\n\n\
This is your first warning. Another violation will get you kicked from the server.\n\
If you think this is a mistake, please contact a server administrator.";

/// Private notice sent after a kick
pub const KICK_NOTICE: &str = "🚫 You have been kicked from the server for repeatedly posting spam.\n\n\
This was your second violation. You may rejoin, but one more violation will get you banned permanently.";

/// Private notice sent after a ban
pub const BAN_NOTICE: &str = "🔒 You have been permanently banned from the server for continuing to post spam.\n\n\
If you think this is a mistake, please contact a server administrator.";

/// Audit reasons attached to kicks and bans
pub const KICK_REASON: &str = "Spam (second violation)";
pub const BAN_REASON: &str = "Spam (third violation)";

/// Shown on /stats once today's scoring calls are used up
pub const QUOTA_EXHAUSTED_NOTE: &str =
    "⚠️ **Daily scoring limit reached.** New messages pass unscored until the quota resets at midnight.";
