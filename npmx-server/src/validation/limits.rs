//! # Input Validation: Size Limits

/// Maximum package name length accepted by the npm registry
pub const MAX_PACKAGE_NAME_LENGTH: usize = 214;

/// Maximum allowed version string length
pub const MAX_VERSION_LENGTH: usize = 256;
