//! Package name and version extraction from catch-all route parameters.
//!
//! Supported shapes:
//! - `name/v/1.2.3`
//! - `@scope/name/v/1.2.3`

/// Values pulled out of the path, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPackageParams {
    pub raw_package_name: Option<String>,
    pub raw_version: Option<String>,
}

/// Strip trailing slashes and surrounding whitespace from a route parameter.
///
/// Only used for cache keys; parsing keeps whitespace so that validation
/// can reject it.
pub fn normalize_pkg_path(pkg: &str) -> &str {
    pkg.trim_end_matches('/').trim()
}

/// Split a route parameter into path segments, ignoring trailing slashes.
pub fn split_segments(pkg: &str) -> Vec<&str> {
    let path = pkg.trim_end_matches('/');
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Parse `[name, "v", version]` or `[@scope, name, "v", version]`.
///
/// Any other shape yields empty values, which validation rejects.
pub fn parse_package_params(segments: &[&str]) -> RawPackageParams {
    match segments {
        [name, "v", version] => RawPackageParams {
            raw_package_name: Some(name.to_string()),
            raw_version: Some(version.to_string()),
        },
        [scope, name, "v", version] if scope.starts_with('@') => RawPackageParams {
            raw_package_name: Some(format!("{scope}/{name}")),
            raw_version: Some(version.to_string()),
        },
        _ => RawPackageParams::default(),
    }
}
