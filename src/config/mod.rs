// src/config/mod.rs
pub mod catalog;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{EwsError, EwsResult};
use crate::processing::alarm::RegressionModel;
use catalog::{BuildingType, DamageState};

/// Acceleration of gravity used to convert g-unit records to m/s².
pub const G_TO_MS2: f64 = 9.81;

/// Upper bound on samples read per channel.
pub const MAX_SAMPLES: usize = 500_000;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub processor: ProcessorConfig,
    pub building: BuildingConfig,
    pub trigger: TriggerConfig,
    pub monitoring: MonitoringConfig,
    pub regression: RegressionModel,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum InputUnit {
    /// Samples are already in m/s².
    MetersPerSecondSquared,
    /// Samples are in g and are scaled by [`G_TO_MS2`] on load.
    G,
}

impl InputUnit {
    pub fn scale(&self) -> f64 {
        match self {
            InputUnit::MetersPerSecondSquared => 1.0,
            InputUnit::G => G_TO_MS2,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProcessorConfig {
    pub verbose: bool,
    pub fs: u32,
    pub input_unit: InputUnit,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            fs: 128,
            input_unit: InputUnit::G,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BuildingConfig {
    pub building_type: BuildingType,
    pub damage_state: DamageState,
    pub height_m: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            building_type: BuildingType::RcLowRise,
            damage_state: DamageState::Extensive,
            height_m: 10.0,
        }
    }
}

impl BuildingConfig {
    /// Effective height used to normalize drift. Sensors sit on the roof only,
    /// so 2/3 of the height approximates a uniform first-mode shape.
    pub fn normalization_height(&self) -> f64 {
        (2.0 / 3.0) * self.height_m
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TriggerConfig {
    pub sta_s: f64,
    pub lta_s: f64,
    pub threshold: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            sta_s: 0.5,
            lta_s: 6.0,
            threshold: 4.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Post-trigger monitoring window.
    pub window_s: f64,
    /// Write the per-sample monitoring trace next to the results file.
    pub write_trace: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            window_s: 10.0,
            write_trace: true,
        }
    }
}

impl Config {
    /// Checks the values the pipeline relies on. Sample-rate support is
    /// checked separately when the filter bank is configured.
    pub fn validate(&self) -> EwsResult<()> {
        let height = self.building.height_m;
        if !(height > 0.0 && height <= 200.0) {
            return Err(EwsError::InvalidBuildingHeight(height));
        }

        let TriggerConfig {
            sta_s,
            lta_s,
            threshold,
        } = self.trigger;
        if !(sta_s > 0.0 && lta_s > 0.0 && sta_s <= lta_s) {
            return Err(EwsError::InvalidTriggerWindow { sta_s, lta_s });
        }
        // Non-positive thresholds would fire on silence.
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(EwsError::InvalidTriggerThreshold(threshold));
        }

        let spread = self.regression.std_dev_log10;
        if !(spread.is_finite() && spread > 0.0) {
            return Err(EwsError::InvalidRegressionSpread(spread));
        }

        if !(self.monitoring.window_s > 0.0) {
            return Err(EwsError::InvalidWindow(self.monitoring.window_s));
        }

        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> EwsResult<Config> {
    let config_str = fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&config_str)?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> EwsResult<()> {
    let yaml = serde_yaml::to_string(config)?;
    fs::write(path, yaml)?;
    Ok(())
}
