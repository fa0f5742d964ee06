//! Configuration loading for Tally.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.tally/config.toml`)
//! 3. User config (`~/.tally/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The engine runs with the threshold
//! defaults when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::Severity;
use crate::error::{Result, TallyError};

/// Main configuration struct for Tally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Session-count requirements per level gate.
    pub session_thresholds: SessionThresholds,
    /// Session-count boundaries for frequency tiers.
    pub frequency_thresholds: FrequencyThresholds,
    /// Inactivity decay configuration.
    pub decay: DecayConfig,
    /// Review flag bookkeeping configuration.
    pub flags: FlagConfig,
}

/// Session-count requirements per level gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionThresholds {
    /// Minimum sessions required for Level 2.
    pub level2: u32,
    /// Minimum sessions required for Level 3.
    pub level3: u32,
}

impl Default for SessionThresholds {
    fn default() -> Self {
        Self {
            level2: 5,
            level3: 15,
        }
    }
}

/// Session-count boundaries for frequency tiers.
///
/// A count below `regular` is occasional (or single-session at 0-1);
/// `regular..frequent` is regular; `frequent` and above is frequent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrequencyThresholds {
    pub regular: u32,
    pub frequent: u32,
}

impl Default for FrequencyThresholds {
    fn default() -> Self {
        Self {
            regular: 5,
            frequent: 11,
        }
    }
}

/// What a decay threshold does when its inactivity window is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayAction {
    /// Flag for review without touching the level.
    Flag,
    /// Downgrade one level (floor at 0).
    Downgrade,
}

/// One inactivity threshold in the decay ladder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecayThreshold {
    /// Days of inactivity at which this threshold fires.
    pub days: u32,
    pub action: DecayAction,
    pub severity: Severity,
    pub message: String,
}

/// Inactivity decay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecayConfig {
    /// Thresholds evaluated in ascending day order.
    pub thresholds: Vec<DecayThreshold>,
    /// Whether crossed downgrade thresholds compound within one pass.
    /// When false, at most one level is lost per pass.
    pub cumulative: bool,
}

impl DecayConfig {
    /// Thresholds sorted ascending by days, as the engine evaluates them.
    pub fn sorted_thresholds(&self) -> Vec<DecayThreshold> {
        let mut thresholds = self.thresholds.clone();
        thresholds.sort_by_key(|t| t.days);
        thresholds
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                DecayThreshold {
                    days: 30,
                    action: DecayAction::Flag,
                    severity: Severity::Low,
                    message: "30+ days inactive - flagged for review".to_string(),
                },
                DecayThreshold {
                    days: 60,
                    action: DecayAction::Downgrade,
                    severity: Severity::Medium,
                    message: "60+ days inactive - downgraded one level".to_string(),
                },
                DecayThreshold {
                    days: 90,
                    action: DecayAction::Downgrade,
                    severity: Severity::High,
                    message: "90+ days inactive - downgraded one level".to_string(),
                },
            ],
            cumulative: true,
        }
    }
}

/// Review flag bookkeeping configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlagConfig {
    /// Age in days after which an unresolved flag is surfaced as stale.
    pub stale_age_days: u32,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self { stale_age_days: 60 }
    }
}

/// Get the Tally home directory.
///
/// Uses `$TALLY_HOME` if set, otherwise `~/.tally`.
pub fn tally_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("TALLY_HOME") {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".tally"))
}

/// Get the ledger directory where skill documents are stored.
///
/// Uses `$TALLY_LEDGER_DIR` if set, otherwise `<tally_home>/ledger`.
pub fn ledger_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var("TALLY_LEDGER_DIR") {
        return Some(PathBuf::from(dir));
    }
    tally_home().map(|home| home.join("ledger"))
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.tally/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = tally_home()?;
        let config_path = home.join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load project config from `.tally/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = cwd.join(".tally").join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| TallyError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| TallyError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("TALLY_LEVEL2_SESSIONS") {
            match val.parse::<u32>() {
                Ok(n) => self.session_thresholds.level2 = n,
                Err(_) => eprintln!(
                    "Warning: Invalid TALLY_LEVEL2_SESSIONS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.session_thresholds.level2
                ),
            }
        }

        if let Ok(val) = env::var("TALLY_LEVEL3_SESSIONS") {
            match val.parse::<u32>() {
                Ok(n) => self.session_thresholds.level3 = n,
                Err(_) => eprintln!(
                    "Warning: Invalid TALLY_LEVEL3_SESSIONS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.session_thresholds.level3
                ),
            }
        }

        if let Ok(val) = env::var("TALLY_DECAY_CUMULATIVE") {
            self.decay.cumulative = val == "true" || val == "1";
        }

        if let Ok(val) = env::var("TALLY_STALE_FLAG_AGE_DAYS") {
            match val.parse::<u32>() {
                Ok(n) => self.flags.stale_age_days = n,
                Err(_) => eprintln!(
                    "Warning: Invalid TALLY_STALE_FLAG_AGE_DAYS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.flags.stale_age_days
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence: any field that differs from the
    /// defaults is applied to `self`, enabling layering of the precedence
    /// chain. A config cannot explicitly set a value back to the default to
    /// mask a lower layer; this matches the TOML files being sparse.
    pub fn merge(mut self, other: Config) -> Self {
        let defaults = Config::default();

        if other.session_thresholds != defaults.session_thresholds {
            self.session_thresholds = other.session_thresholds;
        }
        if other.frequency_thresholds != defaults.frequency_thresholds {
            self.frequency_thresholds = other.frequency_thresholds;
        }
        if other.decay != defaults.decay {
            self.decay = other.decay;
        }
        if other.flags != defaults.flags {
            self.flags = other.flags;
        }

        self
    }
}
