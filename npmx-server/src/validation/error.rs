//! # Validation Error Types

/// Error types for request validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Package name is required")]
    MissingPackageName,

    #[error("Version is required")]
    MissingVersion,

    #[error("Package name too long: {actual} exceeds maximum {max}")]
    PackageNameTooLong { actual: usize, max: usize },

    #[error("Version too long: {actual} exceeds maximum {max}")]
    VersionTooLong { actual: usize, max: usize },

    #[error("Invalid package name \"{name}\": {reason}")]
    InvalidPackageName { name: String, reason: &'static str },

    #[error("Invalid version \"{version}\": {reason}")]
    InvalidVersion { version: String, reason: String },
}

impl ValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingPackageName
            | ValidationError::PackageNameTooLong { .. }
            | ValidationError::InvalidPackageName { .. } => "packageName",
            ValidationError::MissingVersion
            | ValidationError::VersionTooLong { .. }
            | ValidationError::InvalidVersion { .. } => "version",
        }
    }
}
