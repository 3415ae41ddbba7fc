use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Persistence failure. Fatal for the message being processed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    /// Normal skip signal from the rate limiter, not a failure
    #[error("Daily scoring quota exhausted")]
    QuotaExhausted,

    #[error("Spam scorer unavailable: {0}")]
    ScorerUnavailable(String),

    #[error("Spam scorer returned a malformed response: {0}")]
    ScorerMalformedResponse(String),

    #[error("Failed to dispatch {action}: {reason}")]
    EnforcementDispatchFailed { action: String, reason: String },

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    pub fn dispatch_failed<A: ToString, R: ToString>(action: A, reason: R) -> Self {
        Error::EnforcementDispatchFailed {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Scorer failures never produce a verdict; the message passes unpunished.
    pub fn is_scorer_failure(&self) -> bool {
        matches!(
            self,
            Error::ScorerUnavailable(_) | Error::ScorerMalformedResponse(_)
        )
    }

    /// Whether the current message's cycle must be abandoned.
    pub fn is_fatal_for_message(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}
