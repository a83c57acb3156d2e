//! Shared constants for the HTTP API.

/// One year in seconds.
pub const CACHE_MAX_AGE_ONE_YEAR: u64 = 60 * 60 * 24 * 365;

/// Message returned to clients whenever the file listing cannot be fetched.
pub const ERROR_FILE_LIST_FETCH_FAILED: &str = "Failed to fetch file list.";

/// Cache namespace for file tree responses. Bump the version when the
/// response shape changes so old entries are never served.
pub const FILES_CACHE_NAMESPACE: &str = "files:v2";
