//! Optional `ipo_scout.ron` configuration.
//!
//! Every section and field may be left out; missing values take the defaults of
//! the engine settings they map onto.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ipo_engine::{
    CategorySource, CollectorSettings, FetchSettings, DEFAULT_INDEX_FILENAME,
};
use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "ipo_scout.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub index_path: PathBuf,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub fetch: FetchConfig,
    pub collector: CollectorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_FILENAME),
            output_dir: PathBuf::from("."),
            log_destination: LogDestination::default(),
            fetch: FetchConfig::default(),
            collector: CollectorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
            user_agent: settings.user_agent,
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub base_url: String,
    pub categories: Vec<CategoryConfig>,
    pub politeness_delay_ms: u64,
    pub max_links_per_page: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        let settings = CollectorSettings::default();
        Self {
            base_url: settings.base_url,
            categories: settings
                .categories
                .into_iter()
                .map(|c| CategoryConfig {
                    name: c.name,
                    path: c.path,
                })
                .collect(),
            politeness_delay_ms: settings.politeness_delay.as_millis() as u64,
            max_links_per_page: settings.max_links_per_page,
        }
    }
}

impl CollectorConfig {
    pub fn to_settings(&self) -> CollectorSettings {
        CollectorSettings {
            base_url: self.base_url.clone(),
            categories: self
                .categories
                .iter()
                .map(|c| CategorySource::new(c.name.clone(), c.path.clone()))
                .collect(),
            politeness_delay: Duration::from_millis(self.politeness_delay_ms),
            max_links_per_page: self.max_links_per_page,
        }
    }
}

/// Reads the configuration at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(content: &str) -> Result<AppConfig, ron::error::SpannedError> {
    ron::from_str(content)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::{load, parse, AppConfig, ConfigError};
    use crate::logging::LogDestination;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load(&temp.path().join("ipo_scout.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.index_path, PathBuf::from("companies_index.json"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = parse(
            r#"(
                output_dir: "records",
                log_destination: Both,
                collector: (politeness_delay_ms: 0),
            )"#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("records"));
        assert_eq!(config.log_destination, LogDestination::Both);
        let collector = config.collector.to_settings();
        assert_eq!(collector.politeness_delay, Duration::ZERO);
        assert_eq!(collector.base_url, "https://www.ipoplatform.com");
        assert_eq!(collector.categories.len(), 3);
        assert_eq!(config.fetch.to_settings().request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn custom_categories_replace_the_defaults() {
        let config = parse(
            r#"(collector: (categories: [(name: "sme", path: "/list-of-sme-ipos")]))"#,
        )
        .unwrap();
        let names: Vec<String> = config
            .collector
            .to_settings()
            .categories
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["sme".to_string()]);
    }

    #[test]
    fn malformed_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ipo_scout.ron");
        fs::write(&path, "(output_dir: ").unwrap();

        assert!(matches!(load(&path), Err(ConfigError::Parse { .. })));
    }
}
