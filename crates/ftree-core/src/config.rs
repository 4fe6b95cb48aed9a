use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisLimits;
use crate::error::FtaError;

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = "ftree.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtreeConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Abort analyses whose intermediate cut-set lists grow past this.
    #[serde(default)]
    pub max_cut_sets: Option<usize>,
}

impl AnalysisConfig {
    #[must_use]
    pub const fn limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            max_cut_sets: self.max_cut_sets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows of the importance ranking shown in pretty output.
    #[serde(default = "default_importance_rows")]
    pub importance_rows: usize,
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            importance_rows: default_importance_rows(),
            output: None,
        }
    }
}

const fn default_importance_rows() -> usize {
    10
}

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    WorkingDir(PathBuf),
    User(PathBuf),
    Defaults,
}

/// Read and parse one config file.
///
/// # Errors
///
/// Returns [`FtaError::ConfigRead`] or [`FtaError::ConfigParse`].
pub fn load_config_file(path: &Path) -> Result<FtreeConfig, FtaError> {
    let content = std::fs::read_to_string(path).map_err(|source| FtaError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<FtreeConfig>(&content).map_err(|source| FtaError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective config.
///
/// Precedence: `explicit` path, then `ftree.toml` in `working_dir`, then
/// `<user config dir>/ftree/config.toml`, then defaults. Only an explicit
/// path is required to exist.
///
/// # Errors
///
/// Returns an error when the chosen file cannot be read or parsed.
pub fn resolve_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<(FtreeConfig, ConfigSource), FtaError> {
    if let Some(path) = explicit {
        let config = load_config_file(path)?;
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.exists() {
        let config = load_config_file(&local)?;
        return Ok((config, ConfigSource::WorkingDir(local)));
    }

    if let Some(user) = user_config_path().filter(|p| p.exists()) {
        let config = load_config_file(&user)?;
        return Ok((config, ConfigSource::User(user)));
    }

    Ok((FtreeConfig::default(), ConfigSource::Defaults))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ftree/config.toml"))
}
