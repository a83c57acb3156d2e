//! # Input Validation: Package Names and Versions
//!
//! Names follow the npm registry rules that still hold for existing
//! packages: legacy names with capital letters or `~'!()*` remain valid
//! because they can still be installed and browsed.

use crate::validation::error::ValidationError;
use crate::validation::limits::{MAX_PACKAGE_NAME_LENGTH, MAX_VERSION_LENGTH};
use crate::validation::ValidationResult;

const RESERVED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// A package name and version that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionQuery {
    pub package_name: String,
    pub version: String,
}

/// Characters `encodeURIComponent` leaves untouched.
fn is_url_safe(part: &str) -> bool {
    !part.is_empty()
        && part.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
        })
}

fn invalid(name: &str, reason: &'static str) -> ValidationError {
    ValidationError::InvalidPackageName {
        name: name.to_string(),
        reason,
    }
}

/// Validate an npm package name, scoped (`@scope/name`) or not.
pub fn validate_package_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::MissingPackageName);
    }

    if name.len() > MAX_PACKAGE_NAME_LENGTH {
        return Err(ValidationError::PackageNameTooLong {
            actual: name.len(),
            max: MAX_PACKAGE_NAME_LENGTH,
        });
    }

    if name.trim() != name {
        return Err(invalid(name, "name cannot contain leading or trailing spaces"));
    }

    if name.starts_with('.') {
        return Err(invalid(name, "name cannot start with a period"));
    }

    if name.starts_with('_') {
        return Err(invalid(name, "name cannot start with an underscore"));
    }

    if RESERVED_NAMES
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
    {
        return Err(invalid(name, "name is reserved"));
    }

    let url_safe = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, package)) => is_url_safe(scope) && is_url_safe(package),
            None => false,
        },
        None => is_url_safe(name),
    };

    if !url_safe {
        return Err(invalid(name, "name can only contain URL-friendly characters"));
    }

    Ok(())
}

/// Validate a semantic version string.
pub fn validate_version(version: &str) -> ValidationResult<()> {
    if version.is_empty() {
        return Err(ValidationError::MissingVersion);
    }

    if version.len() > MAX_VERSION_LENGTH {
        return Err(ValidationError::VersionTooLong {
            actual: version.len(),
            max: MAX_VERSION_LENGTH,
        });
    }

    semver::Version::parse(version)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidVersion {
            version: version.to_string(),
            reason: e.to_string(),
        })
}

/// Validate raw values extracted from a request path.
///
/// Missing values are rejected here, so a path that could not be parsed
/// never reaches an upstream call.
pub fn validate_package_query(
    raw_package_name: Option<&str>,
    raw_version: Option<&str>,
) -> ValidationResult<PackageVersionQuery> {
    let package_name = raw_package_name.ok_or(ValidationError::MissingPackageName)?;
    validate_package_name(package_name)?;

    let version = raw_version.ok_or(ValidationError::MissingVersion)?;
    validate_version(version)?;

    Ok(PackageVersionQuery {
        package_name: package_name.to_string(),
        version: version.to_string(),
    })
}
