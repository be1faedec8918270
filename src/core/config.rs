//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.palaver/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::ThemeKind;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PalaverConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub theme: Option<ThemeKind>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub stream: Option<bool>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_AGENT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
    Be direct, be honest about uncertainty, and prefer clarity over hedging. \
    If you don't know the answer, say you don't know. \
    If you need more information to answer, ask for it.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub theme: ThemeKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub stream: bool,
    pub timeout_secs: u64,
    pub system_prompt: String,
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

/// Returns the path to `~/.palaver/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".palaver").join("config.toml"))
}

/// Load config from `~/.palaver/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PalaverConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PalaverConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PalaverConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PalaverConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: PalaverConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Palaver Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# theme = "dark"                      # "dark" or "light"
# system_prompt = "You are a helpful assistant."

# [endpoint]
# base_url = "http://localhost:8000"  # Or set AGENT_BASE_URL env var
# api_key = "sk-..."                  # Or set AGENT_API_KEY env var
# stream = true                       # false asks for one complete reply
# timeout_secs = 120                  # Whole-exchange limit in non-stream mode
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
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
/// `cli_theme` and `cli_endpoint` are from CLI flags (None = not specified);
/// `cli_no_stream` disables streaming when set.
pub fn resolve(
    config: &PalaverConfig,
    cli_theme: Option<ThemeKind>,
    cli_endpoint: Option<&str>,
    cli_no_stream: bool,
) -> ResolvedConfig {
    // Theme: CLI → env → config → default
    let theme = cli_theme
        .or_else(|| std::env::var("PALAVER_THEME").ok().and_then(|s| parse_theme(&s)))
        .or(config.general.theme)
        .unwrap_or_default();

    // Endpoint base URL: CLI → env → config → default
    let base_url = cli_endpoint
        .map(|s| s.to_string())
        .or_else(|| std::env::var("AGENT_BASE_URL").ok())
        .or_else(|| config.endpoint.base_url.clone())
        .unwrap_or_else(|| DEFAULT_AGENT_BASE_URL.to_string());

    // API key: env → config
    let api_key = std::env::var("AGENT_API_KEY")
        .ok()
        .or_else(|| config.endpoint.api_key.clone());

    // Streaming: CLI flag wins, then config, then on
    let stream = if cli_no_stream {
        false
    } else {
        config.endpoint.stream.unwrap_or(true)
    };

    ResolvedConfig {
        theme,
        base_url,
        api_key,
        stream,
        timeout_secs: config.endpoint.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        system_prompt: config
            .general
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
    }
}

fn parse_theme(s: &str) -> Option<ThemeKind> {
    match s.to_ascii_lowercase().as_str() {
        "dark" => Some(ThemeKind::Dark),
        "light" => Some(ThemeKind::Light),
        other => {
            warn!("Unrecognized PALAVER_THEME value: {other}");
            None
        }
    }
}
