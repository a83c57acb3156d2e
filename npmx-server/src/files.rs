//! File tree endpoint.
//!
//! # Route
//! `GET /api/registry/files/{*pkg}`
//!
//! - `/api/registry/files/packageName/v/1.2.3`
//! - `/api/registry/files/@scope/packageName/v/1.2.3`
//!
//! File listings of a published version never change, so responses are
//! cached for a year and served stale while being refreshed.

use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    http::HeaderMap,
    response::Response,
};
use bytes::Bytes;
use tracing::debug;

use crate::cache::cached;
use crate::constants::FILES_CACHE_NAMESPACE;
use crate::file_tree::PackageFileTreeResponse;
use crate::params::{normalize_pkg_path, parse_package_params, split_segments};
use crate::upstream::FileListSource;
use crate::validation::validate_package_query;
use crate::{AppError, AppResult, AppState};

/// Cache key for a raw `{pkg}` route parameter.
pub fn files_cache_key(pkg: &str) -> String {
    format!("{FILES_CACHE_NAMESPACE}:{}", normalize_pkg_path(pkg))
}

/// Parse, validate, fetch and convert. Nothing reaches `source` unless the
/// name and version are valid.
pub async fn resolve_file_tree(
    source: &dyn FileListSource,
    pkg: &str,
) -> AppResult<PackageFileTreeResponse> {
    let segments = split_segments(pkg);
    let params = parse_package_params(&segments);
    let query = validate_package_query(
        params.raw_package_name.as_deref(),
        params.raw_version.as_deref(),
    )?;

    let listing = source
        .fetch_file_list(&query.package_name, &query.version)
        .await?;

    Ok(PackageFileTreeResponse::from_listing(
        query.package_name,
        query.version,
        listing,
    ))
}

pub async fn package_files(
    State(state): State<Arc<AppState>>,
    AxumPath(pkg): AxumPath<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    serve_file_tree(&state, pkg, &headers).await
}

/// `GET /api/registry/files/` with no package, rejected by validation.
pub async fn package_files_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    serve_file_tree(&state, String::new(), &headers).await
}

async fn serve_file_tree(
    state: &AppState,
    pkg: String,
    headers: &HeaderMap,
) -> AppResult<Response> {
    let key = files_cache_key(&pkg);
    debug!(pkg = %pkg, key = %key, "Incoming file tree request");

    let source = Arc::clone(&state.file_source);
    let (entry, status) = cached(&state.files_cache, key, move || async move {
        let response = resolve_file_tree(source.as_ref(), &pkg).await?;
        Ok::<_, AppError>(Bytes::from(serde_json::to_vec(&response)?))
    })
    .await?;

    Ok(entry.to_json_response(status, state.files_cache.options(), headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{FileListing, FlatFile, UpstreamError};
    use crate::validation::ValidationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl FileListSource for RecordingSource {
        async fn fetch_file_list(
            &self,
            _package_name: &str,
            _version: &str,
        ) -> Result<FileListing, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(UpstreamError::Status {
                    status: 500,
                    url: "https://cdn.test".to_string(),
                });
            }
            Ok(FileListing {
                default: Some("/index.js".to_string()),
                files: vec![FlatFile {
                    name: "/index.js".to_string(),
                    hash: None,
                    size: 3,
                }],
            })
        }
    }

    #[test]
    fn cache_key_strips_trailing_slashes() {
        assert_eq!(files_cache_key("pkg/v/1.0.0/"), files_cache_key("pkg/v/1.0.0"));
        assert_eq!(files_cache_key("pkg/v/1.0.0"), "files:v2:pkg/v/1.0.0");
        assert_eq!(files_cache_key("@s/pkg/v/1.0.0//"), "files:v2:@s/pkg/v/1.0.0");
    }

    #[tokio::test]
    async fn resolves_scoped_packages() {
        let source = RecordingSource::default();
        let response = resolve_file_tree(&source, "@scope/name/v/1.2.3").await.unwrap();

        assert_eq!(response.package, "@scope/name");
        assert_eq!(response.version, "1.2.3");
        assert_eq!(response.default.as_deref(), Some("/index.js"));
        assert_eq!(response.tree.len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_upstream() {
        let source = RecordingSource::default();

        for pkg in [
            "",
            "react",
            "react/v/latest",
            ".bad/v/1.0.0",
            "a/b/c/d",
            " react/v/1.0.0",
        ] {
            let result = resolve_file_tree(&source, pkg).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{pkg}");
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        let result = resolve_file_tree(&source, "react/v/1.0").await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::InvalidVersion { .. }))
        ));
    }

    #[tokio::test]
    async fn upstream_failures_become_upstream_errors() {
        let source = RecordingSource {
            fail: true,
            ..Default::default()
        };

        let result = resolve_file_tree(&source, "react/v/18.2.0").await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
