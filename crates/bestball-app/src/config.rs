// Configuration loading and parsing (session.toml).

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use bestball_core::valuation::metrics::{
    DEFAULT_FINALS_EMPHASIS, MAX_FINALS_EMPHASIS, MIN_FINALS_EMPHASIS,
};
use bestball_core::valuation::recommend::RecommendationLimits;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// The assembled configuration for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub equity: EquityTargets,
    pub data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Starting position of the finals emphasis slider.
    pub finals_emphasis: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            finals_emphasis: DEFAULT_FINALS_EMPHASIS,
        }
    }
}

/// List lengths for the on-the-clock panel.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    pub value_picks: usize,
    pub stack_picks: usize,
    pub safety_picks: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        let limits = RecommendationLimits::default();
        RecommendationConfig {
            value_picks: limits.value,
            stack_picks: limits.stack,
            safety_picks: limits.safety,
        }
    }
}

impl RecommendationConfig {
    pub fn limits(&self) -> RecommendationLimits {
        RecommendationLimits {
            value: self.value_picks,
            stack: self.stack_picks,
            safety: self.safety_picks,
        }
    }
}

/// Equity levels treated as a full meter.
#[derive(Debug, Clone, Deserialize)]
pub struct EquityTargets {
    pub advance_target: f64,
    pub win_target: f64,
}

impl Default for EquityTargets {
    fn default() -> Self {
        EquityTargets {
            advance_target: 500.0,
            win_target: 300.0,
        }
    }
}

/// Input tables. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    /// Per-team R2/R3/Finals multipliers, joined on `Team`.
    #[serde(default)]
    pub team_multipliers: Option<String>,
    /// Per-team `TeamRank`, joined on `Team`.
    #[serde(default)]
    pub team_ranks: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

const CONFIG_FILE: &str = "session.toml";

/// Load and validate `config/session.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config_in()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError { path, source: e })?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Seed `config/session.toml` from `defaults/` when it does not exist yet.
/// Returns the path written, or `None` when a config was already there.
/// An existing config is never overwritten, even if another process
/// creates it between the check and the copy.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.is_file() {
        return Ok(None);
    }
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/{CONFIG_FILE} or defaults/{CONFIG_FILE} in {}",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut out = match OpenOptions::new().write(true).create_new(true).open(&target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };
    let mut input = File::open(&source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to open {}: {e}", source.display()),
    })?;
    io::copy(&mut input, &mut out).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    })?;

    info!("seeded {} from defaults", target.display());
    Ok(Some(target))
}

/// Copy defaults if needed, then load config relative to `base_dir`.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let emphasis = config.session.finals_emphasis;
    if !(MIN_FINALS_EMPHASIS..=MAX_FINALS_EMPHASIS).contains(&emphasis) {
        return Err(ConfigError::ValidationError {
            field: "session.finals_emphasis".into(),
            message: format!(
                "must be between {MIN_FINALS_EMPHASIS} and {MAX_FINALS_EMPHASIS}, got {emphasis}"
            ),
        });
    }

    let recs = &config.recommendations;
    let pick_fields: &[(&str, usize)] = &[
        ("recommendations.value_picks", recs.value_picks),
        ("recommendations.stack_picks", recs.stack_picks),
        ("recommendations.safety_picks", recs.safety_picks),
    ];
    for (name, val) in pick_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let targets: &[(&str, f64)] = &[
        ("equity.advance_target", config.equity.advance_target),
        ("equity.win_target", config.equity.win_target),
    ];
    for (name, val) in targets {
        if !val.is_finite() || *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    if config.data_paths.players.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data_paths.players".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
