use std::time::Duration;

use crate::constants::*;
use crate::error::ConfigError;
use crate::models::OwnerId;

/// Where the ledger rows live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Hosted PostgREST service.
    Rest {
        url: String,
        api_key: String,
        access_token: String,
    },
    /// Local libsql database directory.
    Local { data_path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub owner: OwnerId,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match read(ENV_STORE_URL) {
            Some(url) => Backend::Rest {
                url,
                api_key: read(ENV_STORE_API_KEY).ok_or(ConfigError::Missing(ENV_STORE_API_KEY))?,
                access_token: read(ENV_ACCESS_TOKEN)
                    .ok_or(ConfigError::Missing(ENV_ACCESS_TOKEN))?,
            },
            None => Backend::Local {
                data_path: read(ENV_DATABASE_PATH)
                    .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
            },
        };

        let owner = read(ENV_OWNER_ID)
            .map(OwnerId::new)
            .ok_or(ConfigError::Missing(ENV_OWNER_ID))?;

        let request_timeout = match read(ENV_REQUEST_TIMEOUT) {
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid {
                        key: ENV_REQUEST_TIMEOUT,
                        reason: e.to_string(),
                    })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: ENV_REQUEST_TIMEOUT,
                        reason: "must be greater than 0".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            backend,
            owner,
            request_timeout,
        })
    }
}
