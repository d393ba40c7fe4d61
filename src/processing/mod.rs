pub mod alarm;
pub mod channel;
pub mod detectors;
pub mod filters;
pub mod integration;
pub mod signal_processor;
