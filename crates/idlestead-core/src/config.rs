//! Configuration loading and typed config structures for the Idlestead kernel.
//!
//! The canonical configuration lives in `idlestead-config.yaml` at the project
//! root. Every field has a default, so a missing file or a missing section
//! falls back to the stock game settings.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use idlestead_types::GameSpeed;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level kernel configuration.
///
/// Mirrors the structure of `idlestead-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KernelConfig {
    /// Tick cadence, speed, and run bounds.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Base combat stats before gear and multipliers.
    #[serde(default)]
    pub combat: CombatConfig,

    /// Offline progress settings.
    #[serde(default)]
    pub offline: OfflineConfig,

    /// Save and content file locations.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KernelConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for file locations:
    /// - `IDLESTEAD_SAVE_PATH` overrides `persistence.save_path`
    /// - `IDLESTEAD_CONTENT_PATH` overrides `persistence.content_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.persistence.apply_env_overrides();
        Ok(config)
    }
}

/// Tick cadence and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Real-time milliseconds per production tick at 1x speed.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Initial speed multiplier.
    #[serde(default)]
    pub speed: GameSpeed,

    /// Real-time milliseconds between battle progress updates.
    #[serde(default = "default_battle_tick_ms")]
    pub battle_tick_ms: u64,

    /// Seconds between automatic saves (0 = never).
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,

    /// Stop the scheduler after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            speed: GameSpeed::default(),
            battle_tick_ms: default_battle_tick_ms(),
            autosave_secs: default_autosave_secs(),
            max_ticks: 0,
        }
    }
}

/// Base combat stats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombatConfig {
    /// Attack before equipment and multipliers.
    #[serde(default = "default_base_attack")]
    pub base_attack: Decimal,

    /// Health before equipment.
    #[serde(default = "default_base_health")]
    pub base_health: Decimal,

    /// Defense before equipment.
    #[serde(default = "default_base_defense")]
    pub base_defense: Decimal,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_attack: default_base_attack(),
            base_health: default_base_health(),
            base_defense: default_base_defense(),
        }
    }
}

/// Offline progress settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfflineConfig {
    /// Hours of offline production credited when no world-tree node raises
    /// the cap.
    #[serde(default = "default_base_offline_hours")]
    pub base_hours: u64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            base_hours: default_base_offline_hours(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the save file lives.
    #[serde(default = "default_save_path")]
    pub save_path: String,

    /// Optional YAML content tables replacing the built-in set.
    #[serde(default)]
    pub content_path: Option<String>,
}

impl PersistenceConfig {
    /// Apply environment variable overrides to file locations.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("IDLESTEAD_SAVE_PATH") {
            self.save_path = val;
        }
        if let Ok(val) = std::env::var("IDLESTEAD_CONTENT_PATH") {
            self.content_path = Some(val);
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            content_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_tick_ms() -> u64 {
    1000
}

const fn default_battle_tick_ms() -> u64 {
    250
}

const fn default_autosave_secs() -> u64 {
    45
}

const fn default_base_attack() -> Decimal {
    Decimal::TEN
}

const fn default_base_health() -> Decimal {
    Decimal::ONE_HUNDRED
}

const fn default_base_defense() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_base_offline_hours() -> u64 {
    8
}

fn default_save_path() -> String {
    "idlestead-save.json".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_matches_stock_game() {
        let config = KernelConfig::default();
        assert_eq!(config.timing.tick_ms, 1000);
        assert_eq!(config.timing.battle_tick_ms, 250);
        assert_eq!(config.timing.autosave_secs, 45);
        assert_eq!(config.timing.speed, GameSpeed::Normal);
        assert_eq!(config.combat.base_attack, dec!(10));
        assert_eq!(config.combat.base_health, dec!(100));
        assert_eq!(config.combat.base_defense, dec!(5));
        assert_eq!(config.offline.base_hours, 8);
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
timing:
  tick_ms: 500
  speed: "5x"
  max_ticks: 20

combat:
  base_attack: "12.5"

logging:
  level: "debug"
  json: true
"#;
        let config = KernelConfig::parse(yaml).unwrap();
        assert_eq!(config.timing.tick_ms, 500);
        assert_eq!(config.timing.speed, GameSpeed::Fast);
        assert_eq!(config.timing.max_ticks, 20);
        assert_eq!(config.timing.battle_tick_ms, 250);
        assert_eq!(config.combat.base_attack, dec!(12.5));
        assert_eq!(config.combat.base_health, dec!(100));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_empty_yaml_uses_defaults() {
        let config = KernelConfig::parse("{}").unwrap();
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.offline, OfflineConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = KernelConfig::parse("timing: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = KernelConfig::from_file(Path::new("/nonexistent/idlestead-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
