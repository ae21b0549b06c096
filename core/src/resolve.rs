//! Which index files apply to the file being edited.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const INDEX_FILE_NAME: &str = "cscope.out";

/// Filesystem facts the resolver needs.
pub trait Workspace {
    fn exists(&self, path: &Path) -> bool;
    fn project_root_of(&self, file: &Path) -> Option<PathBuf>;
    fn current_dir(&self) -> PathBuf;
}

/// One path or several, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexPaths {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl IndexPaths {
    pub fn as_slice(&self) -> &[PathBuf] {
        match self {
            IndexPaths::One(path) => std::slice::from_ref(path),
            IndexPaths::Many(paths) => paths,
        }
    }
}

/// Explicitly configured index files, trusted without an existence check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Searched for every file, after everything else.
    #[serde(default)]
    pub global: Vec<PathBuf>,
    /// Keyed by project root.
    #[serde(default)]
    pub projects: BTreeMap<String, IndexPaths>,
}

impl IndexConfig {
    pub fn add_project(&mut self, root: impl Into<String>, paths: IndexPaths) {
        self.projects.insert(normalize_key(&root.into()), paths);
    }

    pub fn project_paths(&self, root: &Path) -> &[PathBuf] {
        let key = normalize_key(&root.to_string_lossy());
        self.projects
            .iter()
            .find(|(configured, _)| normalize_key(configured) == key)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or_default()
    }

    /// Later layers add global paths and replace per-project entries.
    pub fn merge(mut self, overlay: IndexConfig) -> IndexConfig {
        self.global.extend(overlay.global);
        for (root, paths) in overlay.projects {
            self.add_project(root, paths);
        }
        self
    }
}

fn normalize_key(key: &str) -> String {
    let trimmed = key.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        key.to_owned()
    } else {
        trimmed.to_owned()
    }
}

pub struct IndexResolver<W> {
    workspace: W,
    config: IndexConfig,
}

impl<W: Workspace> IndexResolver<W> {
    pub fn new(workspace: W, config: IndexConfig) -> Self {
        Self { workspace, config }
    }

    /// Every applicable index file, in precedence order, duplicates kept:
    /// the file's own directory, the project root, the project's configured
    /// overrides, then the global list. A relative file is taken relative to
    /// the workspace's current directory.
    pub fn resolve(&self, current_file: Option<&Path>) -> Vec<PathBuf> {
        let mut sources = Vec::new();

        let current_file = current_file.map(|file| self.absolute(file));
        let current_file = current_file.as_deref();

        let local_dir = current_file
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.workspace.current_dir());
        let local = local_dir.join(INDEX_FILE_NAME);
        if self.workspace.exists(&local) {
            sources.push(local);
        }

        if let Some(root) = current_file.and_then(|file| self.workspace.project_root_of(file)) {
            let at_root = root.join(INDEX_FILE_NAME);
            if self.workspace.exists(&at_root) {
                sources.push(at_root);
            }
            sources.extend(self.config.project_paths(&root).iter().cloned());
        }

        sources.extend(self.config.global.iter().cloned());

        debug!(
            "resolve: {} index file(s) for {:?}",
            sources.len(),
            current_file.map(Path::display).map(|d| d.to_string())
        );
        sources
    }

    fn absolute(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.workspace.current_dir().join(file)
        }
    }
}
