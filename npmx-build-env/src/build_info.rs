//! # Build Information
//!
//! Resolves the immutable [`AppEnv`] once at startup. The environment
//! classification and the privacy policy timestamp are independent lookups
//! and run concurrently; either failing aborts startup.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assets::{public_asset_dirs, AssetLayout};
use crate::env::{classify, is_ci, Env, EnvVars};
use crate::error::{BuildEnvError, BuildEnvResult};
use crate::git::detect_git_info;

/// Metadata describing the running build, exposed to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    pub commit: String,
    pub short_commit: String,
    pub branch: String,
    pub env: Env,
    pub privacy_policy_date: DateTime<Utc>,
}

/// Environment plus git metadata, before the build timestamp is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvInfo {
    pub env: Env,
    pub commit: String,
    pub short_commit: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct BuildEnvOptions {
    pub dev: bool,
    pub version: String,
    pub repo_root: PathBuf,
    pub privacy_policy_path: PathBuf,
    pub layout: AssetLayout,
    pub vars: EnvVars,
}

/// Process-wide application configuration derived from the build.
#[derive(Debug, Clone)]
pub struct AppEnv {
    pub env: Env,
    pub build_info: BuildInfo,
    /// Static asset directories, highest priority first.
    pub public_assets: Vec<PathBuf>,
}

impl AppEnv {
    pub async fn resolve(options: &BuildEnvOptions) -> BuildEnvResult<Self> {
        let build_info = resolve_build_info(options).await?;
        let public_assets =
            public_asset_dirs(build_info.env, is_ci(&options.vars), &options.layout);

        info!(
            env = %build_info.env,
            commit = %build_info.short_commit,
            branch = %build_info.branch,
            assets = ?public_assets,
            "Build environment resolved"
        );

        Ok(Self {
            env: build_info.env,
            build_info,
            public_assets,
        })
    }
}

pub async fn resolve_env(dev: bool, vars: EnvVars, repo_root: PathBuf) -> BuildEnvResult<EnvInfo> {
    let (git, vars) = tokio::task::spawn_blocking(move || {
        let git = detect_git_info(&vars, &repo_root)?;
        Ok::<_, BuildEnvError>((git, vars))
    })
    .await??;

    Ok(EnvInfo {
        env: classify(dev, &vars, &git.branch),
        commit: git.commit,
        short_commit: git.short_commit,
        branch: git.branch,
    })
}

pub async fn file_last_updated(path: &Path) -> BuildEnvResult<DateTime<Utc>> {
    let to_error = |source| BuildEnvError::FileTimestamp {
        path: path.to_path_buf(),
        source,
    };
    let metadata = tokio::fs::metadata(path).await.map_err(to_error)?;
    let modified = metadata.modified().map_err(to_error)?;
    Ok(DateTime::<Utc>::from(modified))
}

pub async fn resolve_build_info(options: &BuildEnvOptions) -> BuildEnvResult<BuildInfo> {
    let (env_info, privacy_policy_date) = tokio::try_join!(
        resolve_env(
            options.dev,
            options.vars.clone(),
            options.repo_root.clone()
        ),
        file_last_updated(&options.privacy_policy_path),
    )?;

    Ok(BuildInfo {
        version: options.version.clone(),
        time: Utc::now().timestamp_millis(),
        commit: env_info.commit,
        short_commit: env_info.short_commit,
        branch: env_info.branch,
        env: env_info.env,
        privacy_policy_date,
    })
}
