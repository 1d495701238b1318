use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use spanweave_engine::{Canonicalizer, DEFAULT_GAP_THRESHOLD_SECS};
use std::path::{Path, PathBuf};

use crate::types::OutputFormat;

pub const CONFIG_ENV: &str = "SPANWEAVE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Idle seconds that end a time window or segment.
    pub gap_threshold_secs: u64,
    /// Split sessions at idle gaps even without `--segment`.
    pub segment: bool,
    /// Message fields ignored when comparing turns.
    pub ignored_message_fields: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: DEFAULT_GAP_THRESHOLD_SECS as u64,
            segment: false,
            ignored_message_fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Sessions shown per method in plain `reconstruct` output.
    pub trace_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            trace_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load from the first config location that applies:
    /// 1. Explicit path
    /// 2. `SPANWEAVE_CONFIG` environment variable
    /// 3. `<config dir>/spanweave/config.toml`
    ///
    /// A missing file yields defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        Self::default_path()
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("spanweave").join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn gap_threshold(&self) -> Duration {
        gap_duration(self.engine.gap_threshold_secs)
    }

    pub fn canonicalizer(&self) -> Canonicalizer {
        Canonicalizer::ignoring(self.engine.ignored_message_fields.iter().cloned())
    }
}

/// Seconds as a gap threshold. Values past chrono's range saturate, so a huge
/// threshold means "never split".
pub fn gap_duration(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.engine.gap_threshold_secs, 300);
        assert!(!config.engine.segment);
        assert_eq!(config.output.trace_limit, 5);
        assert_eq!(config.output.format, OutputFormat::Plain);
    }

    #[test]
    fn test_gap_duration_saturates() {
        assert_eq!(gap_duration(300), Duration::seconds(300));
        assert_eq!(gap_duration(10_000_000_000_000_000), Duration::MAX);
        assert_eq!(gap_duration(u64::MAX), Duration::MAX);
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.engine.gap_threshold_secs = 120;
        config.engine.ignored_message_fields = vec!["timestamp".to_string()];
        config.output.format = OutputFormat::Json;

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.gap_threshold(), Duration::seconds(120));
        assert_eq!(
            loaded.canonicalizer().ignored_fields().collect::<Vec<_>>(),
            vec!["timestamp"]
        );
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[engine]\nsegment = true\n")?;

        let loaded = Config::load_from(&config_path)?;
        assert!(loaded.engine.segment);
        assert_eq!(loaded.engine.gap_threshold_secs, 300);
        assert_eq!(loaded.output.trace_limit, 5);
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        assert_eq!(Config::load_from(&config_path)?, Config::default());
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[engine]\ngap_threshold_secs = \"soon\"\n")?;

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid config"));
        Ok(())
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(Config::resolve_path(Some(&explicit)), Some(explicit));
    }
}
