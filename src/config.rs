//! Allocator configuration file support.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! a working configuration.
//!
//! ```toml
//! parallel_scoring = true
//!
//! [weights]
//! capacity = 10
//! history_per_occurrence = 2
//! history_cap = 20
//!
//! [history]
//! exclude_current_semester = true
//!
//! [hybrid]
//! default_room_type = "classroom"
//! min_distinct_rooms = 2
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::models::RoomType;
use crate::scoring::ScoringWeights;

/// Allocator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub weights: ScoringWeights,
    pub history: HistorySettings,
    pub hybrid: HybridSettings,
    /// Score allocation units on the rayon pool.
    pub parallel_scoring: bool,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            history: HistorySettings::default(),
            hybrid: HybridSettings::default(),
            parallel_scoring: true,
        }
    }
}

/// Historical data settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Leave the semester being allocated out of history queries.
    #[serde(default = "default_exclude_current")]
    pub exclude_current_semester: bool,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            exclude_current_semester: default_exclude_current(),
        }
    }
}

/// Hybrid discipline detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridSettings {
    /// Room type counted as "regular"; every other type is specialized.
    #[serde(default = "default_room_type")]
    pub default_room_type: String,
    #[serde(default = "default_min_distinct_rooms")]
    pub min_distinct_rooms: usize,
}

impl Default for HybridSettings {
    fn default() -> Self {
        Self {
            default_room_type: default_room_type(),
            min_distinct_rooms: default_min_distinct_rooms(),
        }
    }
}

impl HybridSettings {
    pub fn room_type(&self) -> RoomType {
        RoomType::new(self.default_room_type.as_str())
    }
}

fn default_exclude_current() -> bool {
    true
}

fn default_room_type() -> String {
    "classroom".to_string()
}

fn default_min_distinct_rooms() -> usize {
    2
}

impl AllocatorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// * [`ConfigError::Io`] if the file cannot be read
    /// * [`ConfigError::Parse`] if it is not valid TOML for this schema
    /// * [`ConfigError::Invalid`] if a value is out of range
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AllocatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hybrid.default_room_type.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "hybrid.default_room_type must not be empty".to_string(),
            ));
        }
        if self.hybrid.min_distinct_rooms < 2 {
            return Err(ConfigError::Invalid(format!(
                "hybrid.min_distinct_rooms must be at least 2, got {}",
                self.hybrid.min_distinct_rooms
            )));
        }
        Ok(())
    }
}
