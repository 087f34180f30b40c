use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, LogTarget, DEFAULT_CONFIG_FILE};

/// Drive the gallery backend from a terminal.
#[derive(Parser, Debug)]
#[command(author, version, about = "gallery-sync - talk to a gallery backend and upload images in chunks")]
pub struct Cli {
    /// Configuration file (RON)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that take precedence over the configuration file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Backend base URL, e.g. http://127.0.0.1:5000
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Upload chunk size in bytes
    #[arg(long, global = true)]
    pub chunk_size: Option<u64>,

    /// Extra attempts per failed chunk
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Where log output goes
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogTarget>,
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(retries) = self.retries {
            config.retry_limit = retries;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(log) = self.log {
            config.log = log;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue one named operation and print the data it returns
    Dispatch {
        /// Operation name, e.g. image_data or settings_get_user
        name: String,
        /// JSON payload for POST and DELETE operations
        payload: Option<String>,
    },
    /// Upload files in chunks, then refresh the image list
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Description stored with every file of the batch
        #[arg(short, long)]
        description: Option<String>,
        /// Tag stored with every file; repeat for several
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// List the operations the backend understands
    Operations,
    /// Print the effective configuration
    Config {
        /// Also save it to the configuration file
        #[arg(long)]
        write: bool,
    },
}
