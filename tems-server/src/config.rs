use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct TemsConfig {
    pub tems_name: String,
    pub listen_addr: String,
    pub teps_url: String,
    #[serde(deserialize_with = "human_duration")]
    pub interval: Duration,
    #[serde(default = "default_forward_timeout", deserialize_with = "human_duration")]
    pub forward_timeout: Duration,
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
    #[serde(default)]
    pub basic: BasicConf,
}

/// Identifiants Basic Auth ; les deux vides = accès libre
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BasicConf {
    pub user: String,
    pub pass: String,
}

impl BasicConf {
    pub fn is_open(&self) -> bool {
        self.user.is_empty() && self.pass.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn default_forward_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("web")
}

// "30s", "1m 30s", "500ms"...
fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

impl TemsConfig {
    pub fn from_yaml(txt: &str) -> Result<Self, ConfigError> {
        let cfg: TemsConfig = serde_yaml::from_str(txt)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid { field: "interval", reason: "must be greater than zero".into() });
        }
        if self.forward_timeout.is_zero() {
            return Err(ConfigError::Invalid { field: "forward_timeout", reason: "must be greater than zero".into() });
        }
        if self.listen_addr.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "listen_addr", reason: "must not be empty".into() });
        }
        if self.teps_url.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "teps_url", reason: "must not be empty".into() });
        }
        Ok(())
    }

    /// Adresse passable à `TcpListener::bind` ; ":8080" écoute sur toutes les interfaces
    pub fn bind_addr(&self) -> String {
        let addr = self.listen_addr.trim();
        if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        }
    }
}

pub fn config_path() -> PathBuf {
    std::env::var("TEMS_CONFIG").unwrap_or_else(|_| "config.yaml".into()).into()
}

/// Chargé une seule fois au démarrage ; toute erreur est fatale
pub fn load_config(path: &Path) -> Result<TemsConfig, ConfigError> {
    let txt = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    TemsConfig::from_yaml(&txt)
}
