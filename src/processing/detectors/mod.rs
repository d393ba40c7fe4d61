pub mod sta_lta;

pub use sta_lta::{RatioScan, StaLtaDetector, TriggerOutcome};
