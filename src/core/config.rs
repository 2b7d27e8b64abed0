//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.geowalk/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeowalkConfig {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ShellConfig {
    pub path: Option<String>,
    /// Milliseconds to wait for a shell response line; 0 waits forever.
    pub ack_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MovementConfig {
    pub move_step: Option<f64>,
    pub rotate_step: Option<i32>,
    pub initial_heading: Option<i32>,
    pub update_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LookupConfig {
    pub url: Option<String>,
    pub cache_file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SHELL_PATH: &str =
    "/Applications/Genymotion Shell.app/Contents/MacOS/genyshell";
/// Degrees of arc per keypress, roughly a 1.5 m stride at the equator.
pub const DEFAULT_MOVE_STEP: f64 = 0.000015;
pub const DEFAULT_ROTATE_STEP: i32 = 5;
/// 90 points the walker north.
pub const DEFAULT_INITIAL_HEADING: i32 = 90;
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 100;
pub const DEFAULT_LOOKUP_URL: &str = "https://freegeoip.app/json/";
pub const DEFAULT_CACHE_FILE: &str = "cache.txt";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub shell_path: String,
    /// `None` keeps the historical behavior of waiting forever.
    pub ack_timeout: Option<Duration>,
    pub move_step: f64,
    pub rotate_step: i32,
    pub initial_heading: i32,
    pub update_interval: Duration,
    pub lookup_url: String,
    pub cache_file: PathBuf,
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

/// Returns the path to `~/.geowalk/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".geowalk").join("config.toml"))
}

/// Load config from `~/.geowalk/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `GeowalkConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<GeowalkConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(GeowalkConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(GeowalkConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: GeowalkConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Geowalk Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults -> this file -> env vars -> CLI flags.

# [shell]
# path = "/Applications/Genymotion Shell.app/Contents/MacOS/genyshell"
#                               # Or set GEOWALK_SHELL, or pass --shell
# ack_timeout_ms = 0            # 0 waits forever for shell responses

# [movement]
# move_step = 0.000015          # degrees of arc walked per keypress
# rotate_step = 5               # degrees turned per keypress
# initial_heading = 90          # 90 = north, 0 = east
# update_interval_ms = 100      # how often the device is reconciled

# [lookup]
# url = "https://freegeoip.app/json/"
#                               # Or set GEOWALK_LOOKUP_URL
# cache_file = "cache.txt"      # where the last pushed position lands
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
/// `cli_shell` is the `--shell` flag (None = not specified).
pub fn resolve(config: &GeowalkConfig, cli_shell: Option<&str>) -> ResolvedConfig {
    // Shell binary: CLI → env → config → default
    let shell_path = cli_shell
        .map(|s| s.to_string())
        .or_else(|| std::env::var("GEOWALK_SHELL").ok())
        .or_else(|| config.shell.path.clone())
        .unwrap_or_else(|| DEFAULT_SHELL_PATH.to_string());

    // Lookup URL: env → config → default
    let lookup_url = std::env::var("GEOWALK_LOOKUP_URL")
        .ok()
        .or_else(|| config.lookup.url.clone())
        .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string());

    // Zero means "no timeout", matching how the tool always behaved.
    let ack_timeout = match config.shell.ack_timeout_ms.unwrap_or(0) {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };

    ResolvedConfig {
        shell_path,
        ack_timeout,
        move_step: config.movement.move_step.unwrap_or(DEFAULT_MOVE_STEP),
        rotate_step: config.movement.rotate_step.unwrap_or(DEFAULT_ROTATE_STEP),
        initial_heading: config
            .movement
            .initial_heading
            .unwrap_or(DEFAULT_INITIAL_HEADING),
        update_interval: Duration::from_millis(
            config
                .movement
                .update_interval_ms
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_MS),
        ),
        lookup_url,
        cache_file: PathBuf::from(
            config.lookup.cache_file.as_deref().unwrap_or(DEFAULT_CACHE_FILE),
        ),
    }
}
