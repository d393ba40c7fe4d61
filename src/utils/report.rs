use chrono::Local;
use colored::Colorize;

use crate::config::{Config, G_TO_MS2};
use crate::processing::alarm::AnalysisResult;
use crate::processing::detectors::TriggerOutcome;
use crate::processing::signal_processor::{PipelineState, RunReport};

/// Fraction of the probability threshold above which a quiet run is still
/// flagged as close to alarming.
pub const NEAR_THRESHOLD_FRACTION: f64 = 0.7;

const RULE: &str = "==========================================================";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputStatistics {
    pub samples: usize,
    pub duration_s: f64,
    /// Peak ground acceleration in m/s².
    pub pga_top: f64,
    pub pga_base: f64,
}

impl InputStatistics {
    /// Statistics over the samples both channels share.
    pub fn from_samples(top: &[f64], base: &[f64], dt: f64) -> Self {
        let n = top.len().min(base.len());
        Self {
            samples: n,
            duration_s: n as f64 * dt,
            pga_top: peak(&top[..n]),
            pga_base: peak(&base[..n]),
        }
    }
}

fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0_f64, |peak, x| peak.max(x.abs()))
}

/// True when no alarm fired but the peak probability came within
/// [`NEAR_THRESHOLD_FRACTION`] of the threshold.
pub fn close_to_threshold(result: &AnalysisResult, probability_threshold: f64) -> bool {
    !result.alarm_triggered
        && result.max_probability > NEAR_THRESHOLD_FRACTION * probability_threshold
}

pub fn print_header() {
    println!("{}", RULE);
    println!("  {}", "ON-SITE EARTHQUAKE EARLY WARNING".bold());
    println!("  {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}", RULE);
}

pub fn print_configuration(config: &Config) {
    let building = &config.building;
    let trigger = &config.trigger;
    println!("\n{}", "CONFIGURATION".bold());
    println!("  Sample rate:     {} Hz", config.processor.fs);
    println!(
        "  Building:        {} ({})",
        building.building_type,
        building.building_type.description()
    );
    println!(
        "  Damage state:    {} ({})",
        building.damage_state,
        building.damage_state.description()
    );
    println!(
        "  Height:          {:.1} m (normalization {:.2} m)",
        building.height_m,
        building.normalization_height()
    );
    println!(
        "  Trigger:         STA {:.1} s, LTA {:.1} s, ratio > {:.1}",
        trigger.sta_s, trigger.lta_s, trigger.threshold
    );
    println!("  Window:          {:.1} s", config.monitoring.window_s);
}

pub fn print_input_statistics(stats: &InputStatistics) {
    println!("\n{}", "INPUT".bold());
    println!(
        "  Samples:  {} (duration {:.1} s)",
        stats.samples, stats.duration_s
    );
    println!(
        "  PGA TOP:  {:.3} g ({:.3} m/s²)",
        stats.pga_top / G_TO_MS2,
        stats.pga_top
    );
    println!(
        "  PGA BASE: {:.3} g ({:.3} m/s²)",
        stats.pga_base / G_TO_MS2,
        stats.pga_base
    );
}

pub fn print_final_report(report: &RunReport) {
    println!("\n{}", "RESULT".bold());

    if let Some(mismatch) = report.mismatch {
        println!(
            "  {} channel lengths differ (TOP={}, BASE={}), processed {}",
            "!".yellow(),
            mismatch.top,
            mismatch.base,
            report.samples
        );
    }

    let result = match (report.trigger, report.analysis) {
        (TriggerOutcome::Triggered { index, ratio }, Some(result)) => {
            println!(
                "  Trigger:               t = {:.2} s (STA/LTA {:.2})",
                index as f64 * report.dt,
                ratio
            );
            result
        }
        _ => {
            println!("  {}", "No seismic event detected".white());
            println!("  (STA/LTA ratio never exceeded the trigger threshold)");
            print_banner(report.state);
            return;
        }
    };

    let threshold = &report.threshold;
    println!("  PGD base:              {:.5} m", result.pgd_base);
    println!("  Max drift:             {:.5} m", result.max_drift_abs);
    println!(
        "  Max normalized drift:  {:.2} mm/m (limit {:.2} mm/m)",
        result.max_drift_norm * 1000.0,
        threshold.drift_limit * 1000.0
    );
    println!(
        "  Max probability:       {:.2}% (threshold {:.2}%)",
        result.max_probability * 100.0,
        threshold.probability_threshold * 100.0
    );

    match result.alarm_index {
        Some(index) => println!(
            "  Alarm:                 {} at t = {:.3} s ({:.3} s after trigger)",
            "YES".red().bold(),
            index as f64 * report.dt,
            (index - report.monitored.start) as f64 * report.dt
        ),
        None => println!("  Alarm:                 {}", "no".green()),
    }

    if close_to_threshold(&result, threshold.probability_threshold) {
        println!(
            "  {} probability close to the alarm threshold",
            "!".yellow().bold()
        );
    }

    print_banner(report.state);
}

fn print_banner(state: PipelineState) {
    println!("\n{}", RULE);
    match state {
        PipelineState::Alarmed => {
            println!("  {}", "FINAL STATE: RED ALARM".red().bold())
        }
        _ => println!("  {}", "FINAL STATE: NO ALARM".green().bold()),
    }
    println!("{}", RULE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_cover_shared_samples() {
        let top = [0.5, -2.0, 1.0, 9.0];
        let base = [0.1, 0.3, -0.2];
        let stats = InputStatistics::from_samples(&top, &base, 0.01);
        assert_eq!(stats.samples, 3);
        assert!((stats.duration_s - 0.03).abs() < 1e-12);
        assert_eq!(stats.pga_top, 2.0);
        assert_eq!(stats.pga_base, 0.3);
    }

    #[test]
    fn near_threshold_only_without_alarm() {
        let mut result = AnalysisResult {
            max_probability: 0.16,
            ..AnalysisResult::default()
        };
        // 0.7 · 0.2086 = 0.146
        assert!(close_to_threshold(&result, 0.2086));
        assert!(!close_to_threshold(&result, 0.25));

        result.alarm_triggered = true;
        assert!(!close_to_threshold(&result, 0.2086));
    }
}
