//! Public asset directory selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::env::Env;

/// Locations of the static asset directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLayout {
    /// Always served, last in the lookup chain.
    pub public_dir: PathBuf,
    /// Overrides for local development.
    pub dev_dir: PathBuf,
    /// Overrides for canary, preview and local release builds.
    pub staging_dir: PathBuf,
}

impl AssetLayout {
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            public_dir: root.join("public"),
            dev_dir: root.join("public-dev"),
            staging_dir: root.join("public-staging"),
        }
    }
}

/// The extra directory layered in front of the public one, if any.
pub fn extra_asset_dir(env: Env, is_ci: bool, layout: &AssetLayout) -> Option<PathBuf> {
    match env {
        Env::Dev => Some(layout.dev_dir.clone()),
        Env::Canary | Env::Preview => Some(layout.staging_dir.clone()),
        Env::Production if !is_ci => Some(layout.staging_dir.clone()),
        Env::Production => None,
    }
}

/// Directories to serve static files from, highest priority first.
pub fn public_asset_dirs(env: Env, is_ci: bool, layout: &AssetLayout) -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(2);
    if let Some(extra) = extra_asset_dir(env, is_ci, layout) {
        dirs.push(extra);
    }
    dirs.push(layout.public_dir.clone());
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> AssetLayout {
        AssetLayout::under("/srv/npmx")
    }

    #[test]
    fn dev_prepends_dev_dir() {
        let dirs = public_asset_dirs(Env::Dev, false, &layout());
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/srv/npmx/public-dev"),
                PathBuf::from("/srv/npmx/public"),
            ]
        );
    }

    #[test]
    fn staging_for_canary_preview_and_local_builds() {
        let staging = Some(PathBuf::from("/srv/npmx/public-staging"));
        assert_eq!(extra_asset_dir(Env::Canary, true, &layout()), staging);
        assert_eq!(extra_asset_dir(Env::Preview, true, &layout()), staging);
        assert_eq!(extra_asset_dir(Env::Production, false, &layout()), staging);
    }

    #[test]
    fn production_in_ci_has_no_extra_dir() {
        assert_eq!(extra_asset_dir(Env::Production, true, &layout()), None);
        assert_eq!(
            public_asset_dirs(Env::Production, true, &layout()),
            vec![PathBuf::from("/srv/npmx/public")]
        );
    }
}
