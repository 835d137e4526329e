use crate::state::ClockColor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration loaded from clock.toml.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
#[derive(Default)]
pub struct ClockConfig {
    pub clock: ClockSection,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClockSection {
    /// Sleep between iterations of both worker loops.
    pub refresh_interval_ms: u64,
    pub use_24h: bool,
    pub color: ClockColor,
    /// Extra daylight-saving correction applied on top of the local offset.
    pub dst_offset_hours: i64,
}

/// 1-based terminal coordinates of each screen region.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub clock_row: u16,
    pub clock_col: u16,
    pub stats_row: u16,
    pub stats_col: u16,
    pub prompt_row: u16,
    pub prompt_col: u16,
}

// --- Default implementations ---

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 500,
            use_24h: true,
            color: ClockColor::Default,
            dst_offset_hours: 0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            clock_row: 2,
            clock_col: 1,
            stats_row: 12,
            stats_col: 1,
            prompt_row: 18,
            prompt_col: 1,
        }
    }
}

/// Errors produced while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value is syntactically fine but unusable.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub refresh_interval_ms: Option<u64>,
    pub twelve_hour: bool,
    pub color: Option<ClockColor>,
}

impl ClockConfig {
    /// Load config from `path`. A missing file yields defaults; an unreadable
    /// or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Merge CLI overrides into the loaded config.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(ms) = overrides.refresh_interval_ms {
            self.clock.refresh_interval_ms = ms;
        }
        if overrides.twelve_hour {
            self.clock.use_24h = false;
        }
        if let Some(color) = overrides.color {
            self.clock.color = color;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "clock.refresh_interval_ms must be greater than 0".to_string(),
            ));
        }
        if !(-23..=23).contains(&self.clock.dst_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "clock.dst_offset_hours must be within -23..=23, got {}",
                self.clock.dst_offset_hours
            )));
        }
        let l = &self.layout;
        let coords = [
            ("clock_row", l.clock_row),
            ("clock_col", l.clock_col),
            ("stats_row", l.stats_row),
            ("stats_col", l.stats_col),
            ("prompt_row", l.prompt_row),
            ("prompt_col", l.prompt_col),
        ];
        if let Some((name, _)) = coords.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Invalid(format!(
                "layout.{name} is 1-based and must not be 0"
            )));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.clock.refresh_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_classic_layout() {
        let config = ClockConfig::default();
        assert_eq!(config.clock.refresh_interval_ms, 500);
        assert!(config.clock.use_24h);
        assert_eq!(config.clock.color, ClockColor::Default);
        assert_eq!(config.layout.clock_row, 2);
        assert_eq!(config.layout.stats_row, 12);
        assert_eq!(config.layout.prompt_row, 18);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ClockConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ClockConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clock.toml");
        std::fs::write(
            &path,
            "[clock]\ncolor = \"green\"\nuse_24h = false\n\n[layout]\nstats_row = 14\n",
        )
        .unwrap();

        let config = ClockConfig::load(&path).unwrap();
        assert_eq!(config.clock.color, ClockColor::Green);
        assert!(!config.clock.use_24h);
        assert_eq!(config.clock.refresh_interval_ms, 500);
        assert_eq!(config.layout.stats_row, 14);
        assert_eq!(config.layout.clock_row, 2);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clock.toml");
        std::fs::write(&path, "[clock]\ncolor = \"purple\"\n").unwrap();

        let err = ClockConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = ClockConfig::default();
        config.apply(&Overrides {
            refresh_interval_ms: Some(250),
            twelve_hour: true,
            color: Some(ClockColor::Red),
        });
        assert_eq!(config.refresh_interval(), Duration::from_millis(250));
        assert!(!config.clock.use_24h);
        assert_eq!(config.clock.color, ClockColor::Red);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = ClockConfig::default();
        config.apply(&Overrides::default());
        assert_eq!(config, ClockConfig::default());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = ClockConfig::default();
        config.clock.refresh_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh_interval_ms"));
    }

    #[test]
    fn test_zero_coordinate_rejected() {
        let mut config = ClockConfig::default();
        config.layout.prompt_col = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("layout.prompt_col"));
    }

    #[test]
    fn test_dst_offset_bounds() {
        let mut config = ClockConfig::default();
        config.clock.dst_offset_hours = 1;
        assert!(config.validate().is_ok());
        config.clock.dst_offset_hours = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrips_through_toml_for_dry_run() {
        let config = ClockConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[clock]"));
        assert!(text.contains("color = \"default\""));
    }
}
