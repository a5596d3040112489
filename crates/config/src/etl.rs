// Pipeline settings
// Loaded from ~/.config/ordermart/etl.toml unless a path is given

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Server-style target: an instance plus a database name on it.
///
/// Instances are directories and databases are SQLite files inside them, so
/// `instance = "./data"`, `database = "Northwind"` resolves to
/// `./data/Northwind.db`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerTarget {
    pub instance: PathBuf,
    pub database: String,
}

impl ServerTarget {
    pub fn db_path(&self) -> PathBuf {
        self.instance.join(format!("{}.db", self.database))
    }

    /// Human-readable `instance/database` label for logs.
    pub fn label(&self) -> String {
        format!("{}/{}", self.instance.display(), self.database)
    }
}

/// File-backed database reached directly by path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileTarget {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineOptions {
    /// Abort the run when a source query fails, instead of continuing with
    /// the other source. An unreachable source never aborts.
    #[serde(default)]
    pub strict_sources: bool,
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EtlConfig {
    pub source_a: ServerTarget,
    pub source_b: FileTarget,
    pub warehouse: ServerTarget,
    #[serde(default)]
    pub pipeline: PipelineOptions,
}

impl EtlConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ordermart")
            .join("etl.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: EtlConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&input)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base_dir))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, target) in [("source_a", &self.source_a), ("warehouse", &self.warehouse)] {
            if target.database.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name}.database must not be empty")));
            }
            if target.instance.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{name}.instance must not be empty")));
            }
        }
        if self.source_b.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("source_b.path must not be empty".into()));
        }
        if self.warehouse.db_path() == self.source_a.db_path() {
            return Err(ConfigError::Validation(
                "warehouse must not point at the source_a database".into(),
            ));
        }
        Ok(())
    }

    fn relative_to(mut self, base_dir: &Path) -> Self {
        let rebase = |p: &Path| if p.is_relative() { base_dir.join(p) } else { p.to_path_buf() };
        self.source_a.instance = rebase(&self.source_a.instance);
        self.source_b.path = rebase(&self.source_b.path);
        self.warehouse.instance = rebase(&self.warehouse.instance);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
