use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::core::errors::{Error, Result};
use crate::services::search::{SearchRunner, DEFAULT_PROGRAM};
use crate::services::store::DEFAULT_HISTORY_CAPACITY;

const APP_DIR: &str = "rgdesk";
const SETTINGS_FILE: &str = "editor-settings.json";
const HISTORY_FILE: &str = "search-history.json";

/// Settings shared by every subcommand. Each flag can also come from the
/// environment.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Directory holding editor settings and search history.
    #[arg(long, env = "RGDESK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Search tool executable.
    #[arg(long, env = "RGDESK_RG", default_value = DEFAULT_PROGRAM, global = true)]
    pub rg_path: String,

    /// Maximum number of searches kept in history.
    #[arg(long, env = "RGDESK_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_CAPACITY, global = true)]
    pub history_limit: usize,

    /// Kill a search that runs longer than this many seconds.
    #[arg(long, env = "RGDESK_SEARCH_TIMEOUT", global = true)]
    pub search_timeout_secs: Option<u64>,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, env = "RGDESK_LOG", global = true)]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            rg_path: DEFAULT_PROGRAM.to_string(),
            history_limit: DEFAULT_HISTORY_CAPACITY,
            search_timeout_secs: None,
            log_level: None,
        }
    }
}

impl AppConfig {
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = dirs::data_dir() {
            return Ok(dir.join(APP_DIR));
        }
        dirs::home_dir()
            .map(|home| home.join(format!(".{APP_DIR}")))
            .ok_or_else(|| Error::NotFound("could not determine a data directory".to_string()))
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SETTINGS_FILE))
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(HISTORY_FILE))
    }

    pub fn search_timeout(&self) -> Option<Duration> {
        self.search_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn runner(&self) -> SearchRunner {
        SearchRunner::new(self.rg_path.clone()).with_timeout(self.search_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_drives_store_paths() -> Result<()> {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/var/lib/rgdesk")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.settings_path()?,
            PathBuf::from("/var/lib/rgdesk/editor-settings.json")
        );
        assert_eq!(
            config.history_path()?,
            PathBuf::from("/var/lib/rgdesk/search-history.json")
        );
        Ok(())
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let config = AppConfig {
            search_timeout_secs: Some(0),
            ..AppConfig::default()
        };
        assert_eq!(config.search_timeout(), None);

        let config = AppConfig {
            search_timeout_secs: Some(30),
            ..AppConfig::default()
        };
        assert_eq!(config.search_timeout(), Some(Duration::from_secs(30)));
    }
}
