//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.roster/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{Level, debug, log};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "roster.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

pub const ENV_BASE_URL: &str = "ROSTER_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ROSTER_TIMEOUT_SECS";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
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
// Diagnostics
// ============================================================================

/// Messages produced while loading and resolving config.
///
/// Config is read before the logger exists (the log file path is itself a
/// setting), so messages are buffered here and emitted by [`Diagnostics::flush`]
/// once logging is up.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<(Level, String)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.entries.push((Level::Info, message.into()));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.entries.push((Level::Warn, message.into()));
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message.as_str())
    }

    /// Sends every buffered message to the installed logger.
    pub fn flush(self) {
        for (level, message) in self.entries {
            log!(level, "{}", message);
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.roster/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".roster").join("config.toml"))
}

/// Load config from `~/.roster/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RosterConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config(diagnostics: &mut Diagnostics) -> Result<RosterConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            diagnostics.warn("Could not determine home directory, using default config");
            return Ok(RosterConfig::default());
        }
    };
    load_config_from(&path, diagnostics)
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<RosterConfig, ConfigError> {
    if !path.exists() {
        diagnostics.info(format!(
            "No config file found, generating default at {}",
            path.display()
        ));
        if let Err(e) = generate_default_config(path) {
            diagnostics.warn(format!("Failed to write default config: {e}"));
        }
        return Ok(RosterConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RosterConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    diagnostics.info(format!("Loaded config from {}", path.display()));
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# Roster Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_file = "roster.log"
# log_level = "info"                  # "off", "error", "warn", "info", "debug", "trace"

# [api]
# base_url = "http://localhost:8080/api"   # Or set ROSTER_BASE_URL env var
# timeout_secs = 30                        # Or set ROSTER_TIMEOUT_SECS env var
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the `--base-url` flag (None = not specified).
pub fn resolve(
    config: &RosterConfig,
    cli_base_url: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> ResolvedConfig {
    resolve_with(config, cli_base_url, |key| std::env::var(key).ok(), diagnostics)
}

/// [`resolve`] with an explicit environment lookup.
pub fn resolve_with(
    config: &RosterConfig,
    cli_base_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    diagnostics: &mut Diagnostics,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env(ENV_BASE_URL))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Timeout: env → config → default. A bad env value falls through to config.
    let timeout_secs = env(ENV_TIMEOUT_SECS)
        .and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(e) => {
                diagnostics.warn(format!("Ignoring {ENV_TIMEOUT_SECS}={raw:?}: {e}"));
                None
            }
        })
        .or(config.api.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let log_level = match config.general.log_level.as_deref() {
        Some(raw) => LevelFilter::from_str(raw).unwrap_or_else(|_| {
            diagnostics.warn(format!(
                "Unknown log_level {raw:?}, using {DEFAULT_LOG_LEVEL}"
            ));
            DEFAULT_LOG_LEVEL
        }),
        None => DEFAULT_LOG_LEVEL,
    };

    ResolvedConfig {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
        log_file: PathBuf::from(
            config
                .general
                .log_file
                .as_deref()
                .unwrap_or(DEFAULT_LOG_FILE),
        ),
        log_level,
    }
}
