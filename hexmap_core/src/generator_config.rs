//! Tunable parameters for map generation.
//!
//! Loaded from `generator_config.json` with support for an environment
//! variable override. Every field has a default, so partial JSON documents
//! are accepted.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hex::HexDirection;

pub const BUILTIN_GENERATOR_CONFIG: &str = include_str!("data/generator_config.json");

/// Environment variable naming a JSON file that replaces the builtin config.
pub const GENERATOR_CONFIG_ENV: &str = "HEXMAP_GENERATOR_CONFIG";

/// Which hemisphere the map spans; drives the latitude term of temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    #[default]
    Both,
    North,
    South,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed for reproducible maps; `None` draws a fresh one per run.
    pub seed: Option<u64>,
    pub jitter_probability: f32,
    pub chunk_size_min: u32,
    pub chunk_size_max: u32,
    pub land_percentage: u32,
    pub water_level: i32,
    pub high_rise_probability: f32,
    pub sink_probability: f32,
    pub elevation_minimum: i32,
    pub elevation_maximum: i32,
    pub map_border_x: u32,
    pub map_border_z: u32,
    pub region_border: u32,
    pub region_count: u32,
    pub erosion_percentage: u32,
    pub starting_moisture: f32,
    pub evaporation_factor: f32,
    pub precipitation_factor: f32,
    pub runoff_factor: f32,
    pub seepage_factor: f32,
    pub wind_direction: HexDirection,
    pub wind_strength: f32,
    pub river_percentage: u32,
    pub extra_lake_probability: f32,
    pub low_temperature: f32,
    pub high_temperature: f32,
    pub hemisphere: Hemisphere,
    pub temperature_jitter: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            jitter_probability: 0.25,
            chunk_size_min: 30,
            chunk_size_max: 100,
            land_percentage: 50,
            water_level: 3,
            high_rise_probability: 0.25,
            sink_probability: 0.2,
            elevation_minimum: -2,
            elevation_maximum: 8,
            map_border_x: 5,
            map_border_z: 5,
            region_border: 5,
            region_count: 1,
            erosion_percentage: 50,
            starting_moisture: 0.1,
            evaporation_factor: 0.5,
            precipitation_factor: 0.25,
            runoff_factor: 0.25,
            seepage_factor: 0.125,
            wind_direction: HexDirection::NorthWest,
            wind_strength: 4.0,
            river_percentage: 10,
            extra_lake_probability: 0.25,
            low_temperature: 0.0,
            high_temperature: 1.0,
            hemisphere: Hemisphere::Both,
            temperature_jitter: 0.1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{low} must not exceed {high}")]
    InvertedRange {
        low: &'static str,
        high: &'static str,
    },
    #[error("failed to parse generator config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read generator config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl GeneratorConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_GENERATOR_CONFIG)
                .expect("builtin generator config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        GeneratorConfig::from_json_str(&contents)
    }

    /// Check every parameter against its supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("jitter_probability", self.jitter_probability.into(), 0.0, 0.5)?;
        check("chunk_size_min", self.chunk_size_min.into(), 20.0, 200.0)?;
        check("chunk_size_max", self.chunk_size_max.into(), 20.0, 200.0)?;
        if self.chunk_size_min > self.chunk_size_max {
            return Err(ConfigError::InvertedRange {
                low: "chunk_size_min",
                high: "chunk_size_max",
            });
        }
        check("land_percentage", self.land_percentage.into(), 5.0, 95.0)?;
        check("water_level", self.water_level.into(), 1.0, 5.0)?;
        check("high_rise_probability", self.high_rise_probability.into(), 0.0, 1.0)?;
        check("sink_probability", self.sink_probability.into(), 0.0, 0.4)?;
        check("elevation_minimum", self.elevation_minimum.into(), -4.0, 0.0)?;
        check("elevation_maximum", self.elevation_maximum.into(), 6.0, 10.0)?;
        check("map_border_x", self.map_border_x.into(), 0.0, 10.0)?;
        check("map_border_z", self.map_border_z.into(), 0.0, 10.0)?;
        check("region_border", self.region_border.into(), 0.0, 10.0)?;
        check("region_count", self.region_count.into(), 1.0, 4.0)?;
        check("erosion_percentage", self.erosion_percentage.into(), 0.0, 100.0)?;
        check("starting_moisture", self.starting_moisture.into(), 0.0, 1.0)?;
        check("evaporation_factor", self.evaporation_factor.into(), 0.0, 1.0)?;
        check("precipitation_factor", self.precipitation_factor.into(), 0.0, 1.0)?;
        check("runoff_factor", self.runoff_factor.into(), 0.0, 1.0)?;
        check("seepage_factor", self.seepage_factor.into(), 0.0, 1.0)?;
        check("wind_strength", self.wind_strength.into(), 1.0, 10.0)?;
        check("river_percentage", self.river_percentage.into(), 0.0, 20.0)?;
        check("extra_lake_probability", self.extra_lake_probability.into(), 0.0, 1.0)?;
        check("low_temperature", self.low_temperature.into(), 0.0, 1.0)?;
        check("high_temperature", self.high_temperature.into(), 0.0, 1.0)?;
        check("temperature_jitter", self.temperature_jitter.into(), 0.0, 1.0)?;
        Ok(())
    }
}

/// Load the generator configuration from `HEXMAP_GENERATOR_CONFIG`, falling
/// back to the builtin document when the variable is unset or the file is
/// unusable. Returns the path the config came from, if any.
pub fn load_generator_config_from_env() -> (Arc<GeneratorConfig>, Option<PathBuf>) {
    if let Some(path) = env::var_os(GENERATOR_CONFIG_ENV).map(PathBuf::from) {
        match GeneratorConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "hexmap::config",
                    path = %path.display(),
                    "generator_config.loaded=file"
                );
                return (Arc::new(config), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "hexmap::config",
                    path = %path.display(),
                    error = %err,
                    "generator_config.load_failed"
                );
            }
        }
    }

    let config = GeneratorConfig::builtin();
    tracing::info!(target: "hexmap::config", "generator_config.loaded=builtin");
    (config, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_defaults() {
        let builtin = GeneratorConfig::builtin();
        assert_eq!(*builtin, GeneratorConfig::default());
        builtin.validate().expect("builtin config is valid");
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config = GeneratorConfig::from_json_str(
            r#"{ "seed": 42, "region_count": 3, "wind_direction": "east", "hemisphere": "north" }"#,
        )
        .expect("parse");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.region_count, 3);
        assert_eq!(config.wind_direction, HexDirection::East);
        assert_eq!(config.hemisphere, Hemisphere::North);
        assert_eq!(config.land_percentage, 50);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = GeneratorConfig {
            region_count: 5,
            ..GeneratorConfig::default()
        };
        match config.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "region_count"),
            other => panic!("unexpected {other:?}"),
        }

        let config = GeneratorConfig {
            chunk_size_min: 120,
            chunk_size_max: 80,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));

        assert!(matches!(
            GeneratorConfig::from_json_str(r#"{ "sink_probability": 0.9 }"#),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            GeneratorConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GeneratorConfig::from_file(Path::new("/nonexistent/generator.json"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/generator.json"));
    }
}
