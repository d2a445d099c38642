use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "adherence.toml";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_filter: String,
    pub report: ReportSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            report: ReportSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Rows shown in the raw data preview.
    pub preview_rows: usize,
    /// Characters in a full (100%) text bar.
    pub bar_width: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            preview_rows: 20,
            bar_width: 40,
        }
    }
}

/// Explicit path (flag or env) first, then `fallback` if it exists, then defaults.
pub fn load(explicit: Option<&Path>, fallback: &Path) -> anyhow::Result<Config> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None if fallback.exists() => fallback.to_path_buf(),
        None => return Ok(Config::default()),
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_any_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(None, &dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn fallback_file_is_read_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "log_filter = \"debug\"\n").unwrap();

        let config = load(None, &path).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.report, ReportSettings::default());
    }

    #[test]
    fn explicit_file_overrides_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&fallback, "log_filter = \"debug\"\n").unwrap();

        let mut explicit = tempfile::NamedTempFile::new().unwrap();
        writeln!(explicit, "[report]\npreview_rows = 5\nbar_width = 10").unwrap();

        let config = load(Some(explicit.path()), &fallback).unwrap();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(
            config.report,
            ReportSettings {
                preview_rows: 5,
                bar_width: 10
            }
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing), &missing).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\npreview_rows = \"many\"").unwrap();
        assert!(load(Some(file.path()), file.path()).is_err());
    }
}
