//! Common test utilities and helpers
//!
//! Shared setup for the HTTP integration tests: a temporary asset root, a
//! resolved build environment and a scriptable file listing source.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum_test::TestServer;
use npmx_build_env::{AppEnv, EnvVars};
use npmx_server::cli::build_env_options;
use npmx_server::upstream::{FileListSource, FileListing, FlatFile, UpstreamError};
use npmx_server::{build_router, AppState, Config};
use tempfile::TempDir;

pub const TEST_COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";
pub const TEST_BRANCH: &str = "feature/files";

/// How the fake upstream answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Ok,
    /// Non-success HTTP status.
    Fail,
    /// Connection refused before any response.
    Transport,
    /// Listing URL could not be built.
    BadUrl,
}

/// File listing source that counts calls and answers with a fixed listing.
pub struct FakeSource {
    mode: SourceMode,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(mode: SourceMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileListSource for FakeSource {
    async fn fetch_file_list(
        &self,
        _package_name: &str,
        _version: &str,
    ) -> Result<FileListing, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            SourceMode::Ok => Ok(sample_listing()),
            SourceMode::Fail => Err(UpstreamError::Status {
                status: 503,
                url: "https://data.jsdelivr.test/v1/packages".to_string(),
            }),
            SourceMode::Transport => {
                match reqwest::Client::new().get("http://127.0.0.1:1/").send().await {
                    Err(e) => Err(UpstreamError::Request(e)),
                    Ok(response) => Err(UpstreamError::Status {
                        status: response.status().as_u16(),
                        url: "http://127.0.0.1:1/".to_string(),
                    }),
                }
            }
            SourceMode::BadUrl => Err(UpstreamError::InvalidUrl(url::ParseError::EmptyHost)),
        }
    }
}

pub fn sample_listing() -> FileListing {
    let file = |name: &str, size: u64| FlatFile {
        name: name.to_string(),
        hash: Some(format!("hash-{size}")),
        size,
    };
    FileListing {
        default: Some("/index.js".to_string()),
        files: vec![
            file("/package.json", 120),
            file("/index.js", 40),
            file("/lib/util.js", 300),
            file("/lib/nested/deep.js", 10),
            file("/README.md", 900),
        ],
    }
}

pub struct TestSetup {
    pub temp_dir: TempDir,
    pub source: Arc<FakeSource>,
    pub server: TestServer,
}

/// Lay out `public/` and `public-staging/` under `root`.
pub fn create_asset_dirs(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("public"))?;
    fs::create_dir_all(root.join("public-staging"))?;
    fs::create_dir_all(root.join("public-dev"))?;

    fs::write(root.join("public/privacy.html"), "<h1>Privacy</h1>")?;
    fs::write(root.join("public/index.html"), "<h1>npmx</h1>")?;
    fs::write(root.join("public/robots.txt"), "User-agent: *\nAllow: /\n")?;
    fs::write(
        root.join("public-staging/robots.txt"),
        "User-agent: *\nDisallow: /\n",
    )?;
    Ok(())
}

/// Variables describing a local release build on a feature branch.
pub fn test_vars() -> EnvVars {
    [("GITHUB_SHA", TEST_COMMIT), ("GITHUB_REF_NAME", TEST_BRANCH)]
        .into_iter()
        .collect()
}

pub async fn create_test_setup(mode: SourceMode) -> Result<TestSetup> {
    let temp_dir = TempDir::new()?;
    create_asset_dirs(temp_dir.path())?;

    let mut config = Config::default();
    config.assets.root = temp_dir.path().to_path_buf();

    let options = build_env_options(&config, false, test_vars());
    let app_env = AppEnv::resolve(&options).await?;

    let source = FakeSource::new(mode);
    let state = AppState::new(config, app_env, source.clone());
    let server = TestServer::new(build_router(Arc::new(state)))?;

    Ok(TestSetup {
        temp_dir,
        source,
        server,
    })
}
