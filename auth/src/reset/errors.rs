use thiserror::Error;

/// Error type for reset token generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResetTokenError {
    #[error("Reset token generation failed")]
    GenerationFailed,
}
