//! # npmx Server
//!
//! Web front end and API layer for browsing npm package metadata.
//!
//! ## Key Modules
//!
//! - [`config`]: Configuration management and settings
//! - [`state`]: Application state and shared resources
//! - [`error`]: Error handling and standardized responses
//! - [`upstream`]: File listings from the jsDelivr data API
//! - [`files`]: The cached file tree endpoint
//! - [`cache`]: Stale-while-revalidate response cache
//! - [`validation`]: Package name and version validation

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod file_tree;
pub mod files;
pub mod params;
pub mod server;
pub mod state;
pub mod upstream;
pub mod validation;

pub use config::Config;
pub use error::{ApiErrorResponse, AppError, AppResult, ErrorCode};
pub use file_tree::{build_file_tree, FileTreeNode, PackageFileTreeResponse};
pub use server::{build_router, run_server};
pub use state::AppState;
pub use upstream::{FileListSource, JsDelivrClient};

/// Calculate SHA1 hash of data.
///
/// Returns the digest as a lowercase hexadecimal string.
///
/// ```
/// # use npmx_server::sha1_hash;
/// let hash = sha1_hash(b"hello world");
/// assert_eq!(hash.len(), 40);
/// ```
pub fn sha1_hash(data: &[u8]) -> String {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_hash() {
        let hash = sha1_hash(b"hello world");
        assert_eq!(hash, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
    }
}
