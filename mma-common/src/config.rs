//! Configuration loading
//!
//! Assumptions resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MMA_RPM`, `MMA_FLAT_FEE`, ...)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The config file itself is located via `--config`, then `MMA_CONFIG`, then
//! the per-user config directory, then `/etc/mma/config.toml` on Linux. A
//! missing file is not an error: the tool warns and runs on defaults.

use crate::assumptions::Assumptions;
use crate::filter::{ContentFilter, Selection};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MMA_CONFIG";

/// Contents of `config.toml`
///
/// ```toml
/// rpm = 4.5
/// flat_fee = 3000
///
/// [filter]
/// drop_channels = ["Some Channel"]
/// excluded_keywords = ["remix"]
///
/// [selection]
/// hide_unidentified = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub rpm: Option<f64>,
    pub flat_fee: Option<f64>,
    pub prod_cost: Option<f64>,
    pub platform_cut_pct: Option<f64>,
    pub ghost_years: Option<f64>,

    /// Replaces the built-in block-lists when present
    pub filter: Option<ContentFilter>,

    pub selection: Option<Selection>,

    /// Default log level for the binaries (`info` when absent)
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the resolved config file, falling back to defaults when absent
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<Self> {
        match config_file_path(cli_path) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Value for an assumption key, if set in the file
    pub fn assumption(&self, key: &str) -> Option<f64> {
        match key {
            "rpm" => self.rpm,
            "flat_fee" => self.flat_fee,
            "prod_cost" => self.prod_cost,
            "platform_cut_pct" => self.platform_cut_pct,
            "ghost_years" => self.ghost_years,
            _ => None,
        }
    }

    /// Content filter from the file or the built-in lists
    pub fn content_filter(&self) -> ContentFilter {
        self.filter.clone().unwrap_or_default()
    }
}

/// Command-line overrides for assumptions (`None` = not given)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssumptionOverrides {
    pub rpm: Option<f64>,
    pub flat_fee: Option<f64>,
    pub prod_cost: Option<f64>,
    pub platform_cut_pct: Option<f64>,
    pub ghost_years: Option<f64>,
}

impl AssumptionOverrides {
    fn get(&self, key: &str) -> Option<f64> {
        match key {
            "rpm" => self.rpm,
            "flat_fee" => self.flat_fee,
            "prod_cost" => self.prod_cost,
            "platform_cut_pct" => self.platform_cut_pct,
            "ghost_years" => self.ghost_years,
            _ => None,
        }
    }
}

/// Resolve assumptions from every source
///
/// Each source value passes through the same metadata validator; the first
/// invalid value aborts with a `Config` error naming its source.
pub fn resolve_assumptions(cli: &AssumptionOverrides, toml: &TomlConfig) -> Result<Assumptions> {
    let mut assumptions = Assumptions::default();

    for meta in Assumptions::metadata() {
        if let Some(v) = toml.assumption(meta.key) {
            assumptions
                .set(meta.key, &v.to_string())
                .map_err(|e| Error::Config(format!("TOML {}", e)))?;
        }

        if let Ok(v) = std::env::var(meta.env_var) {
            assumptions
                .set(meta.key, &v)
                .map_err(|e| Error::Config(format!("{} {}", meta.env_var, e)))?;
        }

        if let Some(v) = cli.get(meta.key) {
            assumptions
                .set(meta.key, &v.to_string())
                .map_err(|e| Error::Config(format!("command line {}", e)))?;
        }
    }

    info!(
        "Assumptions: RPM ${:.2}, flat fee ${:.0}, production cost ${:.0}, platform cut {}%, ghost threshold {} years",
        assumptions.rpm,
        assumptions.flat_fee,
        assumptions.prod_cost,
        assumptions.platform_cut_pct,
        assumptions.ghost_years
    );
    Ok(assumptions)
}

/// Locate the config file
///
/// Returns the first candidate that is explicitly requested or exists on disk.
pub fn config_file_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("mma").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mma/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml() {
        let cfg: TomlConfig = toml::from_str(
            r#"
            rpm = 4.5
            platform_cut_pct = 15
            log_level = "debug"

            [filter]
            drop_channels = ["Spam TV"]
            excluded_keywords = ["remix"]

            [selection]
            exclude_artists = ["Nobody"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.rpm, Some(4.5));
        assert_eq!(cfg.platform_cut_pct, Some(15.0));
        assert_eq!(cfg.flat_fee, None);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));

        let filter = cfg.content_filter();
        assert_eq!(filter.drop_channels, vec!["Spam TV"]);

        let selection = cfg.selection.unwrap();
        assert_eq!(selection.exclude_artists, vec!["Nobody"]);
        assert!(!selection.hide_unidentified);
    }

    #[test]
    fn test_empty_toml_uses_builtin_filter() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.content_filter(), ContentFilter::default());
    }

    #[test]
    fn test_explicit_cli_path_wins() {
        let p = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(config_file_path(Some(&p)), Some(p));
    }
}
