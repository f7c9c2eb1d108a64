//! Service configuration loading and validation
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together through
//! [`ConfigOverrides`] (clap resolves `--flag` before `ENV`). A missing TOML
//! file is not an error: the service starts on compiled defaults. A TOML file
//! that exists but does not parse is fatal.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PSCAN_CONFIG";

/// File name looked up in the per-user and system config directories
pub const CONFIG_FILE_NAME: &str = "pscan-ca.toml";

/// Sample rate every decoded upload is normalized to
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub decoder: DecoderConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// `[cors]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

/// `[decoder]` section
///
/// Consumed once at startup to build the audio ingestor. Nothing here is
/// read lazily per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Allow ffmpeg as a transcoding fallback
    pub ffmpeg_enabled: bool,
    /// Explicit ffmpeg binary; `None` searches `PATH`
    pub ffmpeg_path: Option<PathBuf>,
    /// Refuse to start when ffmpeg cannot be resolved
    pub require_ffmpeg: bool,
    pub decode_timeout_secs: u64,
    pub max_concurrent_decodes: usize,
    /// Directory for scoped upload files; `None` uses the OS temp dir
    pub scratch_dir: Option<PathBuf>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_enabled: true,
            ffmpeg_path: None,
            require_ffmpeg: true,
            decode_timeout_secs: 30,
            max_concurrent_decodes: 4,
            scratch_dir: None,
        }
    }
}

impl DecoderConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(self.decode_timeout_secs)
    }
}

/// `[analysis]` section: short-time framing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub frame_length: usize,
    pub hop_length: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    CompiledDefaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::CompiledDefaults => write!(f, "compiled defaults"),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub ffmpeg_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve the full configuration and validate it
    ///
    /// **Algorithm:**
    /// 1. Locate the TOML file (CLI path, `PSCAN_CONFIG`, user dir, `/etc`)
    /// 2. Parse it, or fall back to compiled defaults when none exists
    /// 3. Apply CLI/ENV overrides
    /// 4. Validate
    ///
    /// Runs before logging is initialized, so the source is returned to the
    /// caller instead of being logged here.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = match locate_config_file(overrides.config_path.as_deref()) {
            Some(path) => (Self::load_file(&path)?, ConfigSource::File(path)),
            None => (Self::default(), ConfigSource::CompiledDefaults),
        };

        config.apply_overrides(overrides);
        config.validate()?;
        Ok((config, source))
    }

    /// Parse a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text; absent sections and keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(origins) = &overrides.allowed_origins {
            self.cors.allowed_origins = origins.clone();
        }
        if let Some(path) = &overrides.ffmpeg_path {
            self.decoder.ffmpeg_path = Some(path.clone());
        }
    }

    /// Reject inconsistent settings before anything is started
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        for origin in &self.cors.allowed_origins {
            if !is_valid_origin(origin) {
                return Err(Error::Config(format!(
                    "cors.allowed_origins: '{}' is not an http(s) origin",
                    origin
                )));
            }
        }

        let decoder = &self.decoder;
        if decoder.require_ffmpeg && !decoder.ffmpeg_enabled {
            return Err(Error::Config(
                "decoder.require_ffmpeg is set but decoder.ffmpeg_enabled is false".to_string(),
            ));
        }
        if decoder.decode_timeout_secs == 0 {
            return Err(Error::Config(
                "decoder.decode_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if decoder.max_concurrent_decodes == 0 {
            return Err(Error::Config(
                "decoder.max_concurrent_decodes must be greater than 0".to_string(),
            ));
        }
        if let Some(dir) = &decoder.scratch_dir {
            if !std::fs::metadata(dir)?.is_dir() {
                return Err(Error::Config(format!(
                    "decoder.scratch_dir is not a directory: {}",
                    dir.display()
                )));
            }
        }

        let analysis = &self.analysis;
        if analysis.frame_length == 0 || analysis.hop_length == 0 {
            return Err(Error::Config(
                "analysis.frame_length and analysis.hop_length must be greater than 0".to_string(),
            ));
        }
        if analysis.hop_length > analysis.frame_length {
            return Err(Error::Config(format!(
                "analysis.hop_length ({}) exceeds analysis.frame_length ({})",
                analysis.hop_length, analysis.frame_length
            )));
        }

        Ok(())
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Locate the configuration file
///
/// Priority: explicit CLI path, `PSCAN_CONFIG`, `<config_dir>/pscan/pscan-ca.toml`,
/// `/etc/pscan/pscan-ca.toml`. Explicit paths are returned even when missing so
/// that the read error names them.
pub fn locate_config_file(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("pscan").join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/pscan").join(CONFIG_FILE_NAME);
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

fn is_valid_origin(origin: &str) -> bool {
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));

    match rest {
        Some(host) => {
            !host.is_empty()
                && !host.contains('/')
                && host.bytes().all(|b| b.is_ascii_graphic())
        }
        None => false,
    }
}
