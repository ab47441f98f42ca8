//! Talk document storage configuration

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    /// JSON file holding the title -> talk mapping
    #[serde(default = "default_talks_file")]
    pub talks_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            talks_file: default_talks_file(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.talks_file.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "talks_file path cannot be empty".into(),
            )));
        }
        if self.talks_file.is_dir() {
            return Err(Error::Config(ConfigError::Message(format!(
                "talks_file {} is a directory",
                self.talks_file.display()
            ))));
        }
        Ok(())
    }
}

fn default_talks_file() -> PathBuf {
    PathBuf::from("./talks.json")
}
