//! Environment classification from CI and deployment variables.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment flavour the application was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Dev,
    Preview,
    Canary,
    Production,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Dev => "dev",
            Env::Preview => "preview",
            Env::Canary => "canary",
            Env::Production => "production",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch whose production deployments are published as canary builds.
pub const CANARY_BRANCH: &str = "main";

const CI_PROVIDER_VARS: &[&str] = &[
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "VERCEL",
    "NETLIFY",
    "BUILDKITE",
    "CIRCLECI",
];

/// Snapshot of environment variables.
///
/// Classification reads from this instead of the live process environment so
/// the result is reproducible and tests never touch global state.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        std::env::vars().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// First non-empty value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    fn is_truthy(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|value| !matches!(value, "0" | "false" | "FALSE" | "False"))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvVars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Whether the process runs under a CI or deployment builder.
pub fn is_ci(vars: &EnvVars) -> bool {
    vars.is_truthy("CI") || CI_PROVIDER_VARS.iter().any(|key| vars.get(key).is_some())
}

fn is_preview(vars: &EnvVars) -> bool {
    vars.get("VERCEL_ENV") == Some("preview")
        || matches!(vars.get("CONTEXT"), Some("deploy-preview" | "branch-deploy"))
        || vars.is_truthy("PULL_REQUEST")
        || vars.get("GITHUB_EVENT_NAME") == Some("pull_request")
}

fn is_production_deploy(vars: &EnvVars) -> bool {
    vars.get("VERCEL_ENV") == Some("production") || vars.get("CONTEXT") == Some("production")
}

/// Classify the build.
///
/// `branch` is the resolved git branch, used to tell canary deployments of
/// the default branch apart from release deployments.
pub fn classify(dev: bool, vars: &EnvVars, branch: &str) -> Env {
    if dev {
        return Env::Dev;
    }
    if is_preview(vars) {
        return Env::Preview;
    }
    if is_production_deploy(vars) && branch == CANARY_BRANCH {
        return Env::Canary;
    }
    Env::Production
}
