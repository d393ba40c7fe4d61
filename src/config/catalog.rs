// src/config/catalog.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EwsError, EwsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum BuildingType {
    RcLowRise,
    RcMidRise,
    UrmRegLowRise,
    UrmRegMidRise,
    UrmSsLowRise,
    UrmSsMidRise,
}

impl BuildingType {
    pub const ALL: [BuildingType; 6] = [
        BuildingType::RcLowRise,
        BuildingType::RcMidRise,
        BuildingType::UrmRegLowRise,
        BuildingType::UrmRegMidRise,
        BuildingType::UrmSsLowRise,
        BuildingType::UrmSsMidRise,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            BuildingType::RcLowRise => "RC low-rise (reinforced concrete, 1-3 storeys)",
            BuildingType::RcMidRise => "RC mid-rise (reinforced concrete, 4-7 storeys)",
            BuildingType::UrmRegLowRise => "URM regular low-rise (regular masonry, 1-3 storeys)",
            BuildingType::UrmRegMidRise => "URM regular mid-rise (regular masonry, 4-7 storeys)",
            BuildingType::UrmSsLowRise => "URM soft-story low-rise (masonry, 1-3 storeys)",
            BuildingType::UrmSsMidRise => "URM soft-story mid-rise (masonry, 4-7 storeys)",
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildingType::RcLowRise => "rc_low_rise",
            BuildingType::RcMidRise => "rc_mid_rise",
            BuildingType::UrmRegLowRise => "urm_reg_low_rise",
            BuildingType::UrmRegMidRise => "urm_reg_mid_rise",
            BuildingType::UrmSsLowRise => "urm_ss_low_rise",
            BuildingType::UrmSsMidRise => "urm_ss_mid_rise",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum DamageState {
    Moderate,
    Extensive,
    Complete,
}

impl DamageState {
    pub const ALL: [DamageState; 3] = [
        DamageState::Moderate,
        DamageState::Extensive,
        DamageState::Complete,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            DamageState::Moderate => "moderate damage",
            DamageState::Extensive => "extensive damage",
            DamageState::Complete => "complete damage (collapse)",
        }
    }
}

impl fmt::Display for DamageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DamageState::Moderate => "moderate",
            DamageState::Extensive => "extensive",
            DamageState::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Alarm limits for one building type / damage state pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlarmThreshold {
    pub building: BuildingType,
    pub damage: DamageState,
    /// Inter-story drift ratio that defines the damage state.
    pub drift_limit: f64,
    /// Exceedance probability above which the alarm fires, in [0, 1].
    pub probability_threshold: f64,
}

// (building, damage, drift limit, probability threshold in percent)
const DEFAULT_ENTRIES: [(BuildingType, DamageState, f64, f64); 18] = [
    (BuildingType::RcLowRise, DamageState::Moderate, 0.0184, 20.86),
    (BuildingType::RcLowRise, DamageState::Extensive, 0.0301, 15.53),
    (BuildingType::RcLowRise, DamageState::Complete, 0.0451, 16.52),
    (BuildingType::RcMidRise, DamageState::Moderate, 0.0223, 17.20),
    (BuildingType::RcMidRise, DamageState::Extensive, 0.0449, 16.60),
    (BuildingType::RcMidRise, DamageState::Complete, 0.0674, 10.46),
    (BuildingType::UrmRegLowRise, DamageState::Moderate, 0.0028, 13.11),
    (BuildingType::UrmRegLowRise, DamageState::Extensive, 0.0138, 12.63),
    (BuildingType::UrmRegLowRise, DamageState::Complete, 0.0236, 19.70),
    (BuildingType::UrmRegMidRise, DamageState::Moderate, 0.0062, 26.46),
    (BuildingType::UrmRegMidRise, DamageState::Extensive, 0.0219, 17.28),
    (BuildingType::UrmRegMidRise, DamageState::Complete, 0.0350, 13.55),
    (BuildingType::UrmSsLowRise, DamageState::Moderate, 0.0019, 17.75),
    (BuildingType::UrmSsLowRise, DamageState::Extensive, 0.0085, 20.27),
    (BuildingType::UrmSsLowRise, DamageState::Complete, 0.0140, 12.82),
    (BuildingType::UrmSsMidRise, DamageState::Moderate, 0.0042, 36.82),
    (BuildingType::UrmSsMidRise, DamageState::Extensive, 0.0135, 12.36),
    (BuildingType::UrmSsMidRise, DamageState::Complete, 0.0210, 18.30),
];

/// Read-only table of alarm thresholds, built once and passed to the pipeline.
#[derive(Debug, Clone)]
pub struct ThresholdCatalog {
    entries: Vec<AlarmThreshold>,
}

impl ThresholdCatalog {
    /// Builds a catalog from `(building, damage, drift limit, probability %)` rows.
    pub fn from_percent_rows(rows: &[(BuildingType, DamageState, f64, f64)]) -> Self {
        let entries = rows
            .iter()
            .map(|&(building, damage, drift_limit, prob_pct)| AlarmThreshold {
                building,
                damage,
                drift_limit,
                probability_threshold: prob_pct / 100.0,
            })
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, building: BuildingType, damage: DamageState) -> EwsResult<AlarmThreshold> {
        self.entries
            .iter()
            .find(|entry| entry.building == building && entry.damage == damage)
            .copied()
            .ok_or(EwsError::ThresholdNotFound { building, damage })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ThresholdCatalog {
    fn default() -> Self {
        Self::from_percent_rows(&DEFAULT_ENTRIES)
    }
}
