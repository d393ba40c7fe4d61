use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::config::catalog::ThresholdCatalog;
use crate::config::{Config, MAX_SAMPLES};
use crate::error::EwsResult;
use crate::processing::signal_processor::{RunReport, SignalProcessor};
use crate::utils::io::{
    default_results_path, default_trace_path, read_acceleration_file, write_results, write_trace,
};
use crate::utils::report::{self, InputStatistics};

/// Input and output files of one analysis run.
#[derive(Debug, Clone)]
pub struct RunFiles {
    pub top: PathBuf,
    pub base: PathBuf,
    /// Defaults to `<top>_results.csv`.
    pub results: Option<PathBuf>,
    /// Defaults to `<top>_debug.csv`.
    pub trace: Option<PathBuf>,
}

impl RunFiles {
    pub fn new(top: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self {
            top: top.into(),
            base: base.into(),
            results: None,
            trace: None,
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.results
            .clone()
            .unwrap_or_else(|| default_results_path(&self.top))
    }

    pub fn trace_path(&self) -> PathBuf {
        self.trace
            .clone()
            .unwrap_or_else(|| default_trace_path(&self.top))
    }
}

/// Reads both recordings, runs the pipeline, prints the console report and
/// writes the results (and, when enabled, the monitoring trace).
pub fn run(config: Config, files: &RunFiles) -> EwsResult<RunReport> {
    let start = Instant::now();
    report::print_header();
    report::print_configuration(&config);

    let unit = config.processor.input_unit;
    let write_trace_enabled = config.monitoring.write_trace;
    let processor = SignalProcessor::new(config, &ThresholdCatalog::default())?;

    let top = read_acceleration_file(&files.top, unit, MAX_SAMPLES)?;
    let base = read_acceleration_file(&files.base, unit, MAX_SAMPLES)?;
    info!(
        top = %files.top.display(),
        base = %files.base.display(),
        top_samples = top.len(),
        base_samples = base.len(),
        "recordings loaded"
    );

    report::print_input_statistics(&InputStatistics::from_samples(
        &top,
        &base,
        processor.filter().dt,
    ));

    let run_report = processor.run(top, base)?;
    report::print_final_report(&run_report);

    let results_path = files.results_path();
    write_results(
        &results_path,
        &run_report.top,
        &run_report.base,
        run_report.normalization_height,
        run_report.dt,
        run_report.alarm_index(),
    )?;
    info!(path = %results_path.display(), "results written");

    if write_trace_enabled && !run_report.trace.is_empty() {
        let trace_path = files.trace_path();
        write_trace(&trace_path, &run_report.trace)?;
        info!(path = %trace_path.display(), rows = run_report.trace.len(), "monitoring trace written");
    }

    info!(elapsed_ms = start.elapsed().as_millis() as u64, state = %run_report.state, "run finished");
    Ok(run_report)
}
