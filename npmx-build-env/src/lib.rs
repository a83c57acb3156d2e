//! # Build Environment
//!
//! Resolves what kind of build is running (dev, preview, canary or
//! production), where it came from (commit and branch) and which static
//! asset directories it should expose. The result is computed once at
//! startup into an immutable [`AppEnv`] and shared by reference.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), npmx_build_env::BuildEnvError> {
//! use npmx_build_env::{AppEnv, AssetLayout, BuildEnvOptions, EnvVars};
//!
//! let options = BuildEnvOptions {
//!     dev: false,
//!     version: "0.1.0".to_string(),
//!     repo_root: ".".into(),
//!     privacy_policy_path: "public/privacy.html".into(),
//!     layout: AssetLayout::under("."),
//!     vars: EnvVars::capture(),
//! };
//! let app_env = AppEnv::resolve(&options).await?;
//! println!("{} build {}", app_env.env, app_env.build_info.short_commit);
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod build_info;
pub mod env;
pub mod error;
pub mod git;

pub use assets::{extra_asset_dir, public_asset_dirs, AssetLayout};
pub use build_info::{
    file_last_updated, resolve_build_info, resolve_env, AppEnv, BuildEnvOptions, BuildInfo,
    EnvInfo,
};
pub use env::{classify, is_ci, Env, EnvVars};
pub use error::{BuildEnvError, BuildEnvResult};
pub use git::{detect_git_info, GitInfo};
