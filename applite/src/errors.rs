//! Error types for the applite provisioning pipeline.
//!
//! Errors are categorized by recovery path:
//! - [`AppliteError::Classification`]: no bootable image, provisioning aborts
//! - [`AppliteError::Configuration`]: malformed override, synthesis falls
//!   back to the default document
//! - [`AppliteError::ReadinessTimeout`]: restart budget spent, surfaced to
//!   the caller instead of restarting again
//! - [`AppliteError::PostBoot`]: the appliance matched its ready pattern but
//!   a post-boot action failed, so it must not be reported usable

use std::io;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type AppliteResult<T> = Result<T, AppliteError>;

/// Errors that can occur while seeding or monitoring an appliance.
#[derive(Debug, Error)]
pub enum AppliteError {
    /// No bootable disk image was found; provisioning cannot proceed.
    #[error("classification: {0}")]
    Classification(String),

    /// A user-supplied override document was present but malformed.
    #[error("configuration: {0}")]
    Configuration(String),

    /// Console silence outlasted the profile threshold and the restart
    /// budget is spent.
    #[error("boot silence persisted through {restarts} restart(s)")]
    ReadinessTimeout { restarts: u32 },

    /// A post-boot action failed after the ready pattern matched.
    #[error("post-boot action: {0}")]
    PostBoot(String),

    /// A persona template could not be loaded.
    #[error("template: {0}")]
    Template(String),

    /// Seed media creation failed.
    #[error("media: {0}")]
    Media(String),

    /// The console transport failed outside the bounded-read contract.
    #[error("console: {0}")]
    Console(String),

    /// Generic IO error (catch-all).
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// YAML serialization failure while writing a document.
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppliteError::Classification("no qcow2 image in /".into());
        assert_eq!(err.to_string(), "classification: no qcow2 image in /");

        let err = AppliteError::ReadinessTimeout { restarts: 3 };
        assert!(err.to_string().contains("3 restart(s)"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: AppliteError = io_err.into();
        assert!(matches!(err, AppliteError::Io(_)));
    }
}
