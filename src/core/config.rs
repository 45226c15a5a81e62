//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.pdfchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PdfChatConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UploadConfig {
    pub max_file_mb: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_URL: &str = "https://notebook-clone-be.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_FILE_MB: u64 = 50;
pub const DEFAULT_LOG_FILE: &str = "pdfchat.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub max_upload_bytes: u64,
    pub log_level: LevelFilter,
    pub log_file: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.pdfchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".pdfchat").join("config.toml"))
}

/// Load config from `~/.pdfchat/config.toml`, generating a commented
/// default there if it doesn't exist yet.
pub fn load_config() -> Result<PdfChatConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(PdfChatConfig::default())
        }
    }
}

/// Load config from an explicit path. Missing file → defaults (and a
/// generated template); malformed file → `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<PdfChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(PdfChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PdfChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = format!(
        r#"# pdfchat configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "{DEFAULT_BACKEND_URL}"   # Or set PDFCHAT_BACKEND_URL
# timeout_secs = {DEFAULT_TIMEOUT_SECS}

# [upload]
# max_file_mb = {DEFAULT_MAX_FILE_MB}

# [logging]
# level = "debug"                    # "error", "warn", "info", "debug", "trace", "off"
# file = "{DEFAULT_LOG_FILE}"
"#
    );

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_backend_url` is the `--backend-url` flag (None = not specified).
pub fn resolve(config: &PdfChatConfig, cli_backend_url: Option<&str>) -> ResolvedConfig {
    let env_backend_url = std::env::var("PDFCHAT_BACKEND_URL").ok();
    resolve_with_env(config, cli_backend_url, env_backend_url)
}

fn resolve_with_env(
    config: &PdfChatConfig,
    cli_backend_url: Option<&str>,
    env_backend_url: Option<String>,
) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let backend_url = cli_backend_url
        .map(|s| s.to_string())
        .or(env_backend_url)
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    let log_level = match config.logging.level.as_deref() {
        None => LevelFilter::Debug,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Unknown log level '{}', using debug", raw);
            LevelFilter::Debug
        }),
    };

    ResolvedConfig {
        backend_url,
        request_timeout: Duration::from_secs(
            config.backend.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        max_upload_bytes: config
            .upload
            .max_file_mb
            .unwrap_or(DEFAULT_MAX_FILE_MB)
            .saturating_mul(1024 * 1024),
        log_level,
        log_file: config
            .logging
            .file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    }
}
