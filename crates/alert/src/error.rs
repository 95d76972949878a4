//! Error types for the alert service.

use thiserror::Error;

/// Errors raised by an alert channel while delivering build state.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// Channel did not finish within its time budget
    #[error("Timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Channel task panicked or was aborted
    #[error("Channel task failed: {0}")]
    Panicked(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors returned synchronously to callers of the mutation API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A build or job identifier was empty or blank
    #[error("Invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },
}

impl ServiceError {
    pub(crate) fn check_build(name: &str) -> Result<(), Self> {
        Self::check("build", name)
    }

    pub(crate) fn check_job(name: &str) -> Result<(), Self> {
        Self::check("job", name)
    }

    fn check(kind: &'static str, name: &str) -> Result<(), Self> {
        if name.trim().is_empty() {
            return Err(Self::InvalidName {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ChannelError::Timeout { timeout_ms: 250 }.to_string(),
            "Timed out after 250ms"
        );
        assert_eq!(
            ServiceError::check_job(" ").unwrap_err().to_string(),
            "Invalid job name: \" \""
        );
        assert!(ServiceError::check_build("bolt").is_ok());
    }
}
