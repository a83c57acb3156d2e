//! Conversion of flat file listings into nested file trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::upstream::{FileListing, FlatFile};

/// A file or directory inside a package.
///
/// Paths are relative to the package root and never start with a slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileTreeNode {
    File {
        name: String,
        path: String,
        size: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hash: Option<String>,
    },
    Directory {
        name: String,
        path: String,
        children: Vec<FileTreeNode>,
    },
}

impl FileTreeNode {
    pub fn name(&self) -> &str {
        match self {
            FileTreeNode::File { name, .. } | FileTreeNode::Directory { name, .. } => name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FileTreeNode::File { path, .. } | FileTreeNode::Directory { path, .. } => path,
        }
    }
}

/// Body of `GET /api/registry/files/{pkg}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFileTreeResponse {
    pub package: String,
    pub version: String,
    /// Default entry as reported upstream, e.g. `/index.js`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub tree: Vec<FileTreeNode>,
}

impl PackageFileTreeResponse {
    pub fn from_listing(package: String, version: String, listing: FileListing) -> Self {
        Self {
            package,
            version,
            tree: build_file_tree(&listing.files),
            default: listing.default,
        }
    }
}

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: BTreeMap<String, (u64, Option<String>)>,
}

impl DirBuilder {
    fn insert(&mut self, segments: &[&str], size: u64, hash: Option<String>) {
        match segments {
            [] => {}
            [file] => {
                self.files.insert(file.to_string(), (size, hash));
            }
            [dir, rest @ ..] => self
                .dirs
                .entry(dir.to_string())
                .or_default()
                .insert(rest, size, hash),
        }
    }

    fn into_nodes(self, parent: &str) -> Vec<FileTreeNode> {
        let join = |name: &str| {
            if parent.is_empty() {
                name.to_string()
            } else {
                format!("{parent}/{name}")
            }
        };

        let mut nodes = Vec::with_capacity(self.dirs.len() + self.files.len());
        for (name, dir) in self.dirs {
            let path = join(&name);
            let children = dir.into_nodes(&path);
            nodes.push(FileTreeNode::Directory {
                name,
                path,
                children,
            });
        }
        for (name, (size, hash)) in self.files {
            let path = join(&name);
            nodes.push(FileTreeNode::File {
                name,
                path,
                size,
                hash,
            });
        }
        nodes
    }
}

/// Build a tree from a flat listing.
///
/// Directories come before files at every level, each group sorted by name.
/// Empty segments are ignored, so `/a//b.js` and `a/b.js` are the same file.
pub fn build_file_tree(files: &[FlatFile]) -> Vec<FileTreeNode> {
    let mut root = DirBuilder::default();
    for file in files {
        let segments: Vec<&str> = file.name.split('/').filter(|s| !s.is_empty()).collect();
        root.insert(&segments, file.size, file.hash.clone());
    }
    root.into_nodes("")
}
