use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::validate_entry_name;
use crate::Error;
use crate::Result;

/// Log sink of the operator binary
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            file_name: default_file_name(),
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("log.log_dir path cannot be empty".into()));
        }
        validate_entry_name(&self.file_name, "log.file_name")
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp/logs")
}
fn default_file_name() -> String {
    "bus-dbg.log".to_string()
}
