use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use gallery_core::{DEFAULT_CHUNK_SIZE, DEFAULT_RETRY_LIMIT};
use gallery_engine::{write_atomically, TransportSettings, UploadSettings};
use gallery_logging::{gallery_info, gallery_warn, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "./gallery_sync.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Contents of `gallery_sync.ron`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub chunk_size: u64,
    pub retry_limit: u32,
    pub retry_delay_ms: u64,
    pub log: LogTarget,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            base_url: transport.base_url,
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            request_timeout_secs: transport.request_timeout.map(|t| t.as_secs()),
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_delay_ms: 0,
            log: LogTarget::default(),
            log_level: "info".to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file is missing or
    /// cannot be parsed. Runs before logging is set up, so problems go to
    /// stderr as well as the log.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                eprintln!("Warning: could not read {}: {}", path.display(), err);
                gallery_warn!("Failed to read config from {:?}: {}", path, err);
                return Self::default();
            }
        };
        match Self::parse(&content) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Warning: ignoring {}: {}", path.display(), err);
                gallery_warn!("Failed to parse config from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = self.to_ron()?;
        write_atomically(path, &content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        gallery_info!("Saved config to {:?}", path);
        Ok(())
    }

    /// `verbose` forces debug output regardless of the configured level.
    pub fn log_level(&self, verbose: bool) -> LevelFilter {
        if verbose {
            return LevelFilter::Debug;
        }
        self.log_level.parse().unwrap_or_else(|_| {
            eprintln!("Warning: unknown log level {:?}, using info", self.log_level);
            LevelFilter::Info
        })
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..TransportSettings::default()
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            chunk_size: self.chunk_size,
            retry_limit: self.retry_limit,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
