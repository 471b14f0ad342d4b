//! Server configuration file.
//!
//! A context name resolves to `/etc/resort/<name>.toml`; anything that
//! looks like a path is used as-is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use frontdesk::checkin::RetryPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub root: RootConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub checkin: CheckInConfig,
}

/// Bootstrap administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    pub email: String,
    /// argon2id PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInConfig {
    #[serde(default = "default_lookup_attempts")]
    pub lookup_attempts: u32,
    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            lookup_attempts: default_lookup_attempts(),
            lookup_delay_ms: default_lookup_delay_ms(),
        }
    }
}

impl CheckInConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.lookup_attempts.max(1),
            delay: Duration::from_millis(self.lookup_delay_ms),
        }
    }
}

fn default_expire_secs() -> u64 {
    86400
}

fn default_lookup_attempts() -> u32 {
    3
}

fn default_lookup_delay_ms() -> u64 {
    1000
}

impl ServerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Ok(toml::from_str(&content)?)
    }

    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/resort").join(format!("{}.toml", name_or_path))
        }
    }
}
