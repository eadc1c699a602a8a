use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Minimum TLS protocol version accepted for HTTPS transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlsVersion {
    #[serde(rename = "1.0")]
    Tls10,
    #[serde(rename = "1.1")]
    Tls11,
    #[serde(rename = "1.2")]
    Tls12,
    #[serde(rename = "1.3")]
    Tls13,
}

impl FromStr for TlsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(TlsVersion::Tls10),
            "1.1" => Ok(TlsVersion::Tls11),
            "1.2" => Ok(TlsVersion::Tls12),
            "1.3" => Ok(TlsVersion::Tls13),
            other => Err(format!(
                "unknown TLS version {:?} (expected 1.0, 1.1, 1.2 or 1.3)",
                other
            )),
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TlsVersion::Tls10 => "1.0",
            TlsVersion::Tls11 => "1.1",
            TlsVersion::Tls12 => "1.2",
            TlsVersion::Tls13 => "1.3",
        };
        f.write_str(s)
    }
}

/// TLS overrides. Both unset means the platform's default secure policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Lowest accepted protocol version.
    pub min_version: Option<TlsVersion>,
    /// OpenSSL-style cipher list passed through to the TLS backend.
    pub cipher_list: Option<String>,
}

impl TlsConfig {
    pub fn is_default(&self) -> bool {
        self.min_version.is_none() && self.cipher_list.is_none()
    }
}

/// Transfer settings loaded from `~/.config/chunkget/config.toml`.
///
/// Chunk count is not configurable; it follows the size policy in `planner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Receive buffer size in bytes; bounds each read/write increment.
    pub buffer_size: usize,
    /// Progress line refresh interval in milliseconds.
    pub progress_interval_ms: u64,
    /// Connect timeout in seconds (None = transport default).
    pub connect_timeout_secs: Option<u64>,
    /// Reserve the full file size on disk before chunk workers start.
    pub preallocate: bool,
    pub tls: TlsConfig,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32 * 1024,
            progress_interval_ms: 100,
            connect_timeout_secs: None,
            preallocate: true,
            tls: TlsConfig::default(),
        }
    }
}

impl TransferConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path` (or the default XDG location), creating a
/// default file if none exists.
pub fn load_or_init(path: Option<&Path>) -> Result<TransferConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        let default_cfg = TransferConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)
            .with_context(|| format!("failed to write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: TransferConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
