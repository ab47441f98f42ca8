use std::net::SocketAddr;
use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the API server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_address: SocketAddr,

    /// Directory of front-end assets served at `/`; disabled when unset
    #[serde(default)]
    pub public_dir: Option<PathBuf>,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_addr(),
            public_dir: None,
            log_dir: default_log_dir(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.listen_address.port() == 0 {
            return Err(Error::Config(ConfigError::Message(
                "listen_address must specify a non-zero port".into(),
            )));
        }

        if let Some(dir) = &self.public_dir {
            if !dir.is_dir() {
                return Err(Error::Config(ConfigError::Message(format!(
                    "public_dir {} is not a directory",
                    dir.display()
                ))));
            }
        }

        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "log_dir path cannot be empty".into(),
            )));
        }

        Ok(())
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}
