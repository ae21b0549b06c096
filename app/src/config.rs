//! Layered configuration: built-in defaults, the user config file, an
//! explicit `--config` file, environment variables, then CLI flags.

use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cscope_nav_core::IndexConfig;
use cscope_nav_core::lookup::{DEFAULT_PROGRAM, DEFAULT_TIMEOUT};
use cscope_nav_fs::DEFAULT_MARKERS;
use serde::{Deserialize, Serialize};

const CONFIG_RELATIVE_PATH: &str = "csnav/config.toml";

/// One configuration file as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cscope: CscopeSection,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub project: ProjectSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CscopeSection {
    #[serde(default)]
    pub program: Option<PathBuf>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default)]
    pub markers: Option<Vec<String>>,
}

impl ConfigFile {
    fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
        Self::from_str(&data)
            .map_err(|e| format!("failed to parse config file {}: {e}", path.display()).into())
    }

    fn from_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn merge(self, overlay: Self) -> Self {
        Self {
            cscope: CscopeSection {
                program: overlay.cscope.program.or(self.cscope.program),
                timeout_ms: overlay.cscope.timeout_ms.or(self.cscope.timeout_ms),
            },
            index: self.index.merge(overlay.index),
            project: ProjectSection {
                markers: overlay.project.markers.or(self.project.markers),
            },
        }
    }
}

/// Overrides taken from `CSNAV_*` environment variables or command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub program: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            program: env::var_os("CSNAV_CSCOPE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            timeout_ms: env::var("CSNAV_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    fn apply(self, mut config: ConfigFile) -> ConfigFile {
        if let Some(program) = self.program {
            config.cscope.program = Some(program);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.cscope.timeout_ms = Some(timeout_ms);
        }
        config
    }
}

/// Effective settings after every layer is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub program: PathBuf,
    pub timeout: Duration,
    pub index: IndexConfig,
    pub markers: Vec<String>,
}

impl From<ConfigFile> for Settings {
    fn from(config: ConfigFile) -> Self {
        Self {
            program: config
                .cscope
                .program
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM)),
            timeout: config
                .cscope
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
            index: config.index,
            markers: config
                .project
                .markers
                .unwrap_or_else(|| DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect()),
        }
    }
}

impl Settings {
    /// Load every layer; `explicit` must exist when given.
    pub fn load(explicit: Option<&Path>, flags: Overrides) -> Result<Self, Box<dyn Error>> {
        Self::load_with_layers(user_config_path(), explicit, Overrides::from_env(), flags)
    }

    fn load_with_layers(
        user: Option<PathBuf>,
        explicit: Option<&Path>,
        env_overrides: Overrides,
        flags: Overrides,
    ) -> Result<Self, Box<dyn Error>> {
        let mut config = ConfigFile::default();

        if let Some(user_path) = user.filter(|path| path.exists()) {
            config = config.merge(ConfigFile::from_file(&user_path)?);
        }

        if let Some(path) = explicit {
            config = config.merge(ConfigFile::from_file(path)?);
        }

        let config = flags.apply(env_overrides.apply(config));
        Ok(config.into())
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(CONFIG_RELATIVE_PATH))
}
