//! Error types shared by the whole crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::catalog::{BuildingType, DamageState};

#[derive(Debug, Error)]
pub enum EwsError {
    #[error("unsupported sample rate: {0} Hz (supported range is 10-1000 Hz)")]
    UnsupportedSampleRate(u32),

    #[error("no alarm threshold for building type {building} and damage state {damage}")]
    ThresholdNotFound {
        building: BuildingType,
        damage: DamageState,
    },

    #[error("invalid building height: {0} m (expected 0 < h <= 200)")]
    InvalidBuildingHeight(f64),

    #[error("invalid trigger windows: STA {sta_s} s, LTA {lta_s} s")]
    InvalidTriggerWindow { sta_s: f64, lta_s: f64 },

    #[error("invalid STA/LTA trigger threshold: {0} (expected a positive ratio)")]
    InvalidTriggerThreshold(f64),

    #[error("invalid regression spread: {0} (expected std_dev_log10 > 0)")]
    InvalidRegressionSpread(f64),

    #[error("invalid monitoring window: {0} s")]
    InvalidWindow(f64),

    #[error("no samples in {0}")]
    EmptyInput(String),

    #[error("{}: sample {index} is not a number: {value:?}", .path.display())]
    Parse {
        path: PathBuf,
        index: usize,
        value: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type EwsResult<T> = Result<T, EwsError>;
