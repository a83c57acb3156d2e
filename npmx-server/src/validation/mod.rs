//! # Input Validation Utilities
//!
//! Everything taken from a request path is validated here before it is
//! allowed anywhere near an upstream call.

pub mod error;
pub mod limits;
pub mod package;

pub use self::{
    error::ValidationError,
    limits::{MAX_PACKAGE_NAME_LENGTH, MAX_VERSION_LENGTH},
    package::{validate_package_name, validate_package_query, validate_version, PackageVersionQuery},
};

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
