// Error taxonomy for the scoring engine.
//
// Only request-level problems are errors: a malformed job, an empty batch,
// or an invalid weight override. A single bad candidate is data, not an
// error — it lands on the outcome's excluded list with a reason code and
// the rest of the batch proceeds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The request is unusable as a whole; nothing was scored.
    #[error("invalid input: {0}")]
    Input(String),

    /// A weight override was rejected at the what-if boundary. The original
    /// outcome is unaffected.
    #[error("invalid configuration for `{field}`: {reason}")]
    Config { field: String, reason: String },
}

impl EngineError {
    pub fn input(msg: impl Into<String>) -> Self {
        EngineError::Input(msg.into())
    }

    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
