//! Git metadata detection.
//!
//! CI builders usually check out a shallow or detached copy, so the commit and
//! branch are taken from provider variables first and the local repository is
//! only consulted for whatever is still missing.

use std::path::{Path, PathBuf};

use git2::Repository;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::EnvVars;
use crate::error::{BuildEnvError, BuildEnvResult};

const COMMIT_VARS: &[&str] = &["VERCEL_GIT_COMMIT_SHA", "COMMIT_REF", "GITHUB_SHA"];

const BRANCH_VARS: &[&str] = &[
    "VERCEL_GIT_COMMIT_REF",
    "BRANCH",
    "HEAD",
    "GITHUB_HEAD_REF",
    "GITHUB_REF_NAME",
];

const SHORT_COMMIT_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub commit: String,
    pub short_commit: String,
    pub branch: String,
}

impl GitInfo {
    pub fn new(commit: impl Into<String>, branch: impl Into<String>) -> Self {
        let commit = commit.into();
        let short_commit = commit.chars().take(SHORT_COMMIT_LEN).collect();
        Self {
            commit,
            short_commit,
            branch: branch.into(),
        }
    }
}

/// Resolve commit and branch, preferring CI variables over the repository.
pub fn detect_git_info(vars: &EnvVars, repo_root: &Path) -> BuildEnvResult<GitInfo> {
    let commit = vars.first_of(COMMIT_VARS).map(str::to_string);
    let branch = vars.first_of(BRANCH_VARS).map(str::to_string);

    if let (Some(commit), Some(branch)) = (&commit, &branch) {
        debug!(commit = %commit, branch = %branch, "Git metadata taken from environment");
        return Ok(GitInfo::new(commit.clone(), branch.clone()));
    }

    let from_repo = read_repository(repo_root)?;
    debug!(
        repo = %repo_root.display(),
        commit = %from_repo.commit,
        branch = %from_repo.branch,
        "Git metadata read from repository"
    );

    Ok(GitInfo::new(
        commit.unwrap_or(from_repo.commit),
        branch.unwrap_or(from_repo.branch),
    ))
}

fn read_repository(repo_root: &Path) -> BuildEnvResult<GitInfo> {
    let repo = Repository::discover(repo_root)?;
    let head = repo.head()?;
    let commit = head.peel_to_commit().map_err(|_| BuildEnvError::NoCommit {
        path: PathBuf::from(repo_root),
    })?;

    let branch = if head.is_branch() {
        head.shorthand().unwrap_or("HEAD").to_string()
    } else {
        "HEAD".to_string()
    };

    Ok(GitInfo::new(commit.id().to_string(), branch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        std::fs::write(workdir.join(name), "content").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("npmx", "npmx@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap()
    }

    #[test]
    fn short_commit_is_seven_chars() {
        let info = GitInfo::new("0123456789abcdef", "main");
        assert_eq!(info.short_commit, "0123456");
    }

    #[test]
    fn environment_variables_take_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let vars: EnvVars = [
            ("GITHUB_SHA", "abcdef0123456789"),
            ("GITHUB_REF_NAME", "main"),
        ]
        .into_iter()
        .collect();

        let info = detect_git_info(&vars, temp_dir.path()).unwrap();
        assert_eq!(info.commit, "abcdef0123456789");
        assert_eq!(info.short_commit, "abcdef0");
        assert_eq!(info.branch, "main");
    }

    #[test]
    fn falls_back_to_local_repository() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        let oid = commit_file(&repo, "README.md");

        let info = detect_git_info(&EnvVars::default(), temp_dir.path()).unwrap();
        assert_eq!(info.commit, oid.to_string());
        assert_eq!(info.short_commit, &oid.to_string()[..7]);
        assert!(!info.branch.is_empty());
    }

    #[test]
    fn partial_environment_is_completed_from_repository() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        let oid = commit_file(&repo, "README.md");
        let vars: EnvVars = [("BRANCH", "feat/tree")].into_iter().collect();

        let info = detect_git_info(&vars, temp_dir.path()).unwrap();
        assert_eq!(info.commit, oid.to_string());
        assert_eq!(info.branch, "feat/tree");
    }

    #[test]
    fn missing_repository_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = detect_git_info(&EnvVars::default(), temp_dir.path());
        assert!(matches!(result, Err(BuildEnvError::Git(_))));
    }
}
