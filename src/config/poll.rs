use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Long-polling limits for `GET /api/talks`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollConfig {
    /// Upper bound for a client's `Prefer: wait=N`; larger requests are clamped
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_wait_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "max_wait_secs must be greater than 0".into(),
            )));
        }
        Ok(())
    }

    /// Clamps a client-requested wait to the configured maximum.
    pub fn clamp_wait(
        &self,
        requested: Duration,
    ) -> Duration {
        requested.min(Duration::from_secs(self.max_wait_secs))
    }
}

fn default_max_wait_secs() -> u64 {
    90
}
