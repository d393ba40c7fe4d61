use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

use crate::config::catalog::AlarmThreshold;

/// Peak base displacements below this give no exceedance risk.
pub const MIN_PGD: f64 = 1e-9;

/// Log-normal regression of peak drift on peak base displacement:
/// `log10(drift) ~ N(intercept + slope·log10(pgd), std_dev_log10²)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionModel {
    pub intercept: f64,
    pub slope: f64,
    pub std_dev_log10: f64,
}

impl Default for RegressionModel {
    fn default() -> Self {
        Self {
            intercept: -1.01,
            slope: 0.59,
            std_dev_log10: 0.25,
        }
    }
}

impl RegressionModel {
    /// Probability that drift exceeds `drift_limit` given the peak base
    /// displacement observed so far.
    pub fn exceedance_probability(&self, pgd_base: f64, drift_limit: f64) -> f64 {
        if pgd_base < MIN_PGD {
            return 0.0;
        }
        let mean_log10_drift = self.intercept + self.slope * pgd_base.log10();
        let z = (drift_limit.log10() - mean_log10_drift)
            / (self.std_dev_log10 * std::f64::consts::SQRT_2);
        let prob_not_exceeding = 0.5 * (1.0 + erf(z));
        1.0 - prob_not_exceeding
    }
}

/// Running peaks and the alarm decision for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub pgd_base: f64,
    pub max_drift_abs: f64,
    pub max_drift_norm: f64,
    pub max_probability: f64,
    pub alarm_triggered: bool,
    pub alarm_index: Option<usize>,
}

/// Outcome of evaluating one monitored sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub pgd_peak: f64,
    pub drift_peak: f64,
    pub norm_drift_peak: f64,
    pub probability: f64,
    pub alarmed: bool,
}

/// One row of the continuous monitoring trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitoringSample {
    pub index: usize,
    pub time_s: f64,
    pub pgd_base_m: f64,
    pub max_drift_abs_m: f64,
    pub max_drift_norm: f64,
    pub probability: f64,
}

#[derive(Debug, Clone)]
pub struct AlarmEngine {
    model: RegressionModel,
    threshold: AlarmThreshold,
    result: AnalysisResult,
}

impl AlarmEngine {
    pub fn new(model: RegressionModel, threshold: AlarmThreshold) -> Self {
        Self {
            model,
            threshold,
            result: AnalysisResult::default(),
        }
    }

    pub fn threshold(&self) -> &AlarmThreshold {
        &self.threshold
    }

    pub fn is_alarmed(&self) -> bool {
        self.result.alarm_triggered
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn into_result(self) -> AnalysisResult {
        self.result
    }

    /// Updates the peaks with sample `index` and checks the alarm. Once the
    /// alarm has fired the result is frozen and further samples are ignored.
    pub fn evaluate(
        &mut self,
        index: usize,
        base_displacement: f64,
        drift: f64,
        norm_drift: f64,
    ) -> StepResult {
        if self.result.alarm_triggered {
            return self.step_result(self.result.max_probability);
        }

        let result = &mut self.result;
        result.pgd_base = result.pgd_base.max(base_displacement.abs());
        result.max_drift_abs = result.max_drift_abs.max(drift.abs());
        result.max_drift_norm = result.max_drift_norm.max(norm_drift.abs());

        let probability = self
            .model
            .exceedance_probability(result.pgd_base, self.threshold.drift_limit);
        result.max_probability = result.max_probability.max(probability);

        if probability > self.threshold.probability_threshold {
            result.alarm_triggered = true;
            result.alarm_index = Some(index);
        }

        self.step_result(probability)
    }

    fn step_result(&self, probability: f64) -> StepResult {
        StepResult {
            pgd_peak: self.result.pgd_base,
            drift_peak: self.result.max_drift_abs,
            norm_drift_peak: self.result.max_drift_norm,
            probability,
            alarmed: self.result.alarm_triggered,
        }
    }
}
