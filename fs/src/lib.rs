use std::path::{Path, PathBuf};

use cscope_nav_core::{IndexConfig, IndexResolver, Workspace};
use tracing::debug;

pub const DEFAULT_MARKERS: &[&str] = &[".git", "cscope.files"];

/// The real filesystem. Project roots come from the enclosing git work tree,
/// or from the nearest ancestor holding one of `markers`. Relative paths are
/// taken from `base_dir` when set, else from the process working directory.
#[derive(Debug, Clone)]
pub struct DiskWorkspace {
    markers: Vec<String>,
    base_dir: Option<PathBuf>,
}

impl Default for DiskWorkspace {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect())
    }
}

impl DiskWorkspace {
    pub fn new(markers: Vec<String>) -> Self {
        Self {
            markers,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

impl Workspace for DiskWorkspace {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn project_root_of(&self, file: &Path) -> Option<PathBuf> {
        let file = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.current_dir().join(file)
        };
        let start = file.parent()?;
        git_work_tree(start).or_else(|| find_marked_root(start, &self.markers))
    }

    fn current_dir(&self) -> PathBuf {
        if let Some(dir) = &self.base_dir {
            return dir.clone();
        }
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

fn git_work_tree(start: &Path) -> Option<PathBuf> {
    let repo = match gix::discover(start) {
        Ok(repo) => repo,
        Err(err) => {
            debug!("project_root_of: no git repository above {}: {err}", start.display());
            return None;
        }
    };
    repo.work_dir().map(Path::to_path_buf)
}

fn find_marked_root(start: &Path, markers: &[String]) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if markers.iter().any(|marker| current.join(marker).exists()) {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolver over the real filesystem.
pub fn disk_resolver(config: IndexConfig, markers: Option<Vec<String>>) -> IndexResolver<DiskWorkspace> {
    let workspace = markers.map(DiskWorkspace::new).unwrap_or_default();
    IndexResolver::new(workspace, config)
}
