// Global configuration and constants

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::food::Food;
use crate::types::Point;

/// Diameter of a drawn cell; seed cells sit half a radius apart.
pub const CELL_RADIUS: f64 = 8.0;
/// Energy lost per tick by a cell that has not reached food.
pub const ENERGY_DECREASE: i64 = 12;
/// Energy a parent hands down less to each child.
pub const BRANCH_COST: i64 = 10;
/// Food energy divided by this is added to a new colony's exploration.
pub const EXPLORATION_ENERGY_SCALE: f64 = 10000.0;

const DEFAULT_CONFIG_PATHS: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

// A food source as it appears in config files
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodConfig {
    pub x: f64,
    pub y: f64,
    pub energy: i64,
}

impl From<FoodConfig> for Food {
    fn from(f: FoodConfig) -> Self {
        Food::new(Point::new(f.x, f.y), f.energy)
    }
}

// Configuration struct for simulation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Seed colony
    pub starting_location: (f64, f64),
    pub starting_energy: i64,
    pub exploration: f64,

    // Food sources
    pub food: Vec<FoodConfig>,

    // Random stream; None draws from entropy
    pub seed: Option<u64>,

    // Driver
    pub tick_interval_ms: u64,
    pub view_width: u32,
    pub view_height: u32,
    pub stop_when_all_food_colonized: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        // Cities across Canada, in units of CELL_RADIUS
        let cities: [(f64, f64, i64); 22] = [
            (16.0, -8.0, 500),   // Montreal
            (19.0, -5.0, 500),   // Quebec
            (23.0, -5.0, 500),   // Saint John
            (26.0, -6.0, 500),   // Halifax
            (29.0, -2.0, 100),   // Sydney
            (2.0, -10.0, 700),   // Sudbury
            (6.0, -14.0, 700),   // Toronto
            (-7.0, -8.0, 700),   // Thunder Bay
            (-17.0, -6.0, 700),  // Winnipeg
            (-28.0, -3.0, 500),  // Regina
            (-35.0, 1.0, 500),   // Calgary
            (-26.0, 0.0, 500),   // Saskatoon
            (-42.0, 0.0, 500),   // Vancouver
            (-33.0, 3.0, 50),    // Edmonton
            (-38.0, 7.0, 50),    // Prince George
            (-41.0, 11.0, 50),   // Prince Rupert
            (-36.0, 13.0, 50),   // Fort Nelson
            (-37.0, 16.0, 20),   // Watson Lake
            (-39.0, 19.0, 20),   // Whitehorse
            (-38.0, 23.0, 20),   // Dawson
            (-32.0, 13.0, 20),   // Hay River
            (-28.0, 15.0, 20),   // Yellowknife
        ];

        Self {
            starting_location: (10.0 * CELL_RADIUS, -10.0 * CELL_RADIUS),
            starting_energy: 2100,
            exploration: 0.09,
            food: cities
                .iter()
                .map(|&(x, y, energy)| FoodConfig {
                    x: x * CELL_RADIUS,
                    y: y * CELL_RADIUS,
                    energy,
                })
                .collect(),
            seed: None,
            tick_interval_ms: 30,
            view_width: 720,
            view_height: 720,
            stop_when_all_food_colonized: false,
        }
    }
}

impl SimulationConfig {
    /// Load a config file, choosing the parser from the file extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&contents)?,
            "json" => Self::from_json_str(&contents)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        Ok(config)
    }

    /// Search the working directory for a config file, falling back to the
    /// built-in map when none is present or none parses.
    pub fn from_default_paths() -> Self {
        for candidate in DEFAULT_CONFIG_PATHS {
            if !Path::new(candidate).exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(config) => {
                    tracing::info!(path = candidate, "loaded config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = candidate, error = %e, "ignoring unreadable config");
                }
            }
        }
        Self::default()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(ConfigError::Invalid(format!(
                "exploration must be within [0, 1], got {}",
                self.exploration
            )));
        }
        let (sx, sy) = self.starting_location;
        if !sx.is_finite() || !sy.is_finite() {
            return Err(ConfigError::Invalid(
                "starting_location must be finite".to_string(),
            ));
        }
        if let Some(f) = self.food.iter().find(|f| !f.x.is_finite() || !f.y.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "food location ({}, {}) must be finite",
                f.x, f.y
            )));
        }
        Ok(())
    }

    pub fn starting_point(&self) -> Point {
        Point::from(self.starting_location)
    }

    pub fn food_items(&self) -> Vec<Food> {
        self.food.iter().copied().map(Food::from).collect()
    }
}
