//! # Application State Management
//!
//! [`AppState`] is built once during startup and shared across request
//! handlers behind an `Arc`. Nothing in it is mutated after construction
//! except the response cache, which synchronizes internally.

use std::sync::Arc;

use npmx_build_env::AppEnv;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::upstream::FileListSource;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Build metadata and asset layout, resolved at startup
    pub app_env: Arc<AppEnv>,
    /// Source of package file listings
    pub file_source: Arc<dyn FileListSource>,
    pub files_cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(config: Config, app_env: AppEnv, file_source: Arc<dyn FileListSource>) -> Self {
        let files_cache = Arc::new(ResponseCache::new(
            config.cache.capacity,
            config.cache.options(),
        ));

        Self {
            config: Arc::new(config),
            app_env: Arc::new(app_env),
            file_source,
            files_cache,
        }
    }
}
