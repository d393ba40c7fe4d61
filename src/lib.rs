//! On-site earthquake early warning for instrumented buildings.
//!
//! Two acceleration records (roof and foundation) are filtered, an STA/LTA
//! detector finds the onset of shaking, and from there the inter-story drift
//! is integrated sample by sample while a log-normal regression estimates the
//! probability of exceeding a damage-state drift limit.

pub mod config;
pub mod error;
pub mod local;
pub mod processing;
pub mod utils;

pub use config::catalog::{AlarmThreshold, BuildingType, DamageState, ThresholdCatalog};
pub use config::Config;
pub use error::{EwsError, EwsResult};
pub use processing::signal_processor::{PipelineState, RunReport, SignalProcessor};
