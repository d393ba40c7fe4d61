use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::InputUnit;
use crate::error::{EwsError, EwsResult};
use crate::processing::alarm::MonitoringSample;
use crate::processing::channel::SignalChannel;

/// Reads whitespace-separated acceleration samples, converts them to m/s²
/// and stops after `max_samples`.
pub fn read_acceleration_file<P: AsRef<Path>>(
    path: P,
    unit: InputUnit,
    max_samples: usize,
) -> EwsResult<Vec<f64>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let scale = unit.scale();
    let mut samples = Vec::new();

    'lines: for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            if samples.len() >= max_samples {
                break 'lines;
            }
            let value: f64 = token.parse().map_err(|_| EwsError::Parse {
                path: path.to_path_buf(),
                index: samples.len() + 1,
                value: token.to_string(),
            })?;
            samples.push(value * scale);
        }
    }

    if samples.is_empty() {
        return Err(EwsError::EmptyInput(path.display().to_string()));
    }
    Ok(samples)
}

/// Writes samples given in m/s² one per line, in `unit`.
pub fn write_acceleration_file<P: AsRef<Path>>(
    path: P,
    samples: &[f64],
    unit: InputUnit,
) -> EwsResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let scale = unit.scale();
    for sample in samples {
        writeln!(writer, "{:.8e}", sample / scale)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ResultRow {
    index: usize,
    time_s: f64,
    drift_abs_m: f64,
    drift_norm_mm_per_m: f64,
    disp_top_m: f64,
    disp_base_m: f64,
    alarm: &'static str,
}

/// Full-length results table, one row per sample. The alarm row is marked `R`.
pub fn write_results<P: AsRef<Path>>(
    path: P,
    top: &SignalChannel,
    base: &SignalChannel,
    normalization_height: f64,
    dt: f64,
    alarm_index: Option<usize>,
) -> EwsResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let rows = top.displacement.iter().zip(&base.displacement).enumerate();
    for (i, (&disp_top, &disp_base)) in rows {
        let drift = disp_top - disp_base;
        writer.serialize(ResultRow {
            index: i + 1,
            time_s: i as f64 * dt,
            drift_abs_m: drift,
            drift_norm_mm_per_m: drift / normalization_height * 1000.0,
            disp_top_m: disp_top,
            disp_base_m: disp_base,
            alarm: if alarm_index == Some(i) { "R" } else { "" },
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct TraceRow {
    time_s: f64,
    pgd_base_m: f64,
    drift_abs_m: f64,
    drift_norm_mm_per_m: f64,
    probability_pct: f64,
}

/// Per-sample monitoring trace of the post-trigger window.
pub fn write_trace<P: AsRef<Path>>(path: P, trace: &[MonitoringSample]) -> EwsResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for sample in trace {
        writer.serialize(TraceRow {
            time_s: sample.time_s,
            pgd_base_m: sample.pgd_base_m,
            drift_abs_m: sample.max_drift_abs_m,
            drift_norm_mm_per_m: sample.max_drift_norm * 1000.0,
            probability_pct: sample.probability * 100.0,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// `<top>_results.csv` next to the top-channel input.
pub fn default_results_path(top: &Path) -> PathBuf {
    suffixed(top, "_results.csv")
}

/// `<top>_debug.csv` next to the top-channel input.
pub fn default_trace_path(top: &Path) -> PathBuf {
    suffixed(top, "_debug.csv")
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
