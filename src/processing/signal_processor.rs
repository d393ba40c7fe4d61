use std::fmt;
use std::ops::Range;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::catalog::{AlarmThreshold, ThresholdCatalog};
use crate::config::{Config, TriggerConfig};
use crate::error::{EwsError, EwsResult};
use crate::processing::alarm::{AlarmEngine, AnalysisResult, MonitoringSample};
use crate::processing::channel::SignalChannel;
use crate::processing::detectors::{StaLtaDetector, TriggerOutcome};
use crate::processing::filters::FilterConfiguration;
use crate::processing::integration::{drift, DriftIntegrator};

// -----------------------------------------------------------------------------
// PIPELINE STATE
// -----------------------------------------------------------------------------

/// Stages of one run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Filtered,
    NotTriggered,
    Triggered,
    Monitoring,
    Alarmed,
    WindowExpired,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::NotTriggered | PipelineState::Alarmed | PipelineState::WindowExpired
        )
    }

    /// Moves to `next`. Only forward transitions are legal.
    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.can_advance_to(next),
            "illegal transition {} -> {}",
            self,
            next
        );
        debug!(from = %self, to = %next, "pipeline state");
        *self = next;
    }

    fn can_advance_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Filtered)
                | (Filtered, NotTriggered)
                | (Filtered, Triggered)
                | (Triggered, Monitoring)
                | (Monitoring, Alarmed)
                | (Monitoring, WindowExpired)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Filtered => "filtered",
            PipelineState::NotTriggered => "not triggered",
            PipelineState::Triggered => "triggered",
            PipelineState::Monitoring => "monitoring",
            PipelineState::Alarmed => "alarmed",
            PipelineState::WindowExpired => "window expired",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// RUN REPORT
// -----------------------------------------------------------------------------

/// Channel lengths before truncation to the shorter one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthMismatch {
    pub top: usize,
    pub base: usize,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: PipelineState,
    pub trigger: TriggerOutcome,
    /// `None` when no trigger was found.
    pub analysis: Option<AnalysisResult>,
    pub trace: Vec<MonitoringSample>,
    /// Samples per channel after truncation.
    pub samples: usize,
    pub mismatch: Option<LengthMismatch>,
    /// Samples that were integrated, starting at the trigger. The trace covers
    /// all of them except the trigger sample itself.
    pub monitored: Range<usize>,
    pub threshold: AlarmThreshold,
    pub fs: u32,
    pub dt: f64,
    pub normalization_height: f64,
    pub top: SignalChannel,
    pub base: SignalChannel,
}

impl RunReport {
    pub fn alarm_index(&self) -> Option<usize> {
        self.analysis.and_then(|result| result.alarm_index)
    }

    pub fn alarm_triggered(&self) -> bool {
        self.state == PipelineState::Alarmed
    }
}

// -----------------------------------------------------------------------------
// SIGNAL PROCESSOR
// -----------------------------------------------------------------------------

/// Runs the whole drift pipeline over one pair of recordings: filter both
/// channels, find the trigger on the top channel, then integrate and evaluate
/// the alarm sample by sample.
pub struct SignalProcessor {
    config: Config,
    filter: FilterConfiguration,
    threshold: AlarmThreshold,
    state: PipelineState,
}

impl SignalProcessor {
    /// Fails before any signal is touched when the configuration, the sample
    /// rate or the catalog lookup is invalid.
    pub fn new(config: Config, catalog: &ThresholdCatalog) -> EwsResult<Self> {
        config.validate()?;
        let filter = FilterConfiguration::new(config.processor.fs)?;

        // The windows must still hold whole samples at this rate.
        let TriggerConfig { sta_s, lta_s, .. } = config.trigger;
        let (sta_len, lta_len) = (filter.samples(sta_s), filter.samples(lta_s));
        if sta_len == 0 || lta_len < sta_len {
            return Err(EwsError::InvalidTriggerWindow { sta_s, lta_s });
        }

        let threshold = catalog.lookup(
            config.building.building_type,
            config.building.damage_state,
        )?;

        debug!(
            fs = filter.fs,
            hp_a = filter.high_pass.a,
            hp_b = filter.high_pass.b,
            kernel_len = filter.kernel_len(),
            "filter bank configured"
        );
        debug!(
            building = %threshold.building,
            damage = %threshold.damage,
            drift_limit = threshold.drift_limit,
            probability_threshold = threshold.probability_threshold,
            "alarm threshold selected"
        );

        Ok(Self {
            config,
            filter,
            threshold,
            state: PipelineState::Idle,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter(&self) -> &FilterConfiguration {
        &self.filter
    }

    pub fn threshold(&self) -> &AlarmThreshold {
        &self.threshold
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Processes one top/base pair (m/s²). Consumes the processor: a run
    /// cannot be restarted.
    pub fn run(mut self, top: Vec<f64>, base: Vec<f64>) -> EwsResult<RunReport> {
        if top.is_empty() {
            return Err(EwsError::EmptyInput("top channel".to_string()));
        }
        if base.is_empty() {
            return Err(EwsError::EmptyInput("base channel".to_string()));
        }

        let mut top = SignalChannel::new(top);
        let mut base = SignalChannel::new(base);
        let mismatch = align_lengths(&mut top, &mut base);
        let n = top.len();

        let filter = &self.filter;
        rayon::join(|| top.filter(filter), || base.filter(filter));
        self.state.advance(PipelineState::Filtered);
        info!(samples = n, fs = filter.fs, "high-pass and smoothing applied");

        let detector = StaLtaDetector::new(&self.config.trigger, filter);
        debug!(
            sta_len = detector.sta_len(),
            lta_len = detector.lta_len(),
            start = detector.start_index(),
            "scanning for trigger"
        );
        let trigger = detector.detect(&top.smoothed);

        let trigger_index = match trigger {
            TriggerOutcome::Triggered { index, ratio } => {
                info!(
                    index,
                    time_s = index as f64 * filter.dt,
                    ratio,
                    "trigger detected"
                );
                self.state.advance(PipelineState::Triggered);
                index
            }
            TriggerOutcome::NotTriggered => {
                info!("STA/LTA ratio never exceeded the threshold");
                self.state.advance(PipelineState::NotTriggered);
                return Ok(self.report(trigger, None, Vec::new(), n..n, mismatch, top, base));
            }
        };

        let (analysis, trace, monitored) = self.monitor(trigger_index, &mut top, &mut base);
        Ok(self.report(
            trigger,
            Some(analysis),
            trace,
            monitored,
            mismatch,
            top,
            base,
        ))
    }

    /// Integrates both channels in lock-step with the alarm engine until the
    /// alarm fires or the window ends.
    fn monitor(
        &mut self,
        trigger_index: usize,
        top: &mut SignalChannel,
        base: &mut SignalChannel,
    ) -> (AnalysisResult, Vec<MonitoringSample>, Range<usize>) {
        let filter = &self.filter;
        let integrator = DriftIntegrator::new(
            filter,
            trigger_index,
            self.config.monitoring.window_s,
            top.len(),
        );
        let window = integrator.range();
        let norm_height = self.config.building.normalization_height();
        let report_every = filter.fs as usize;
        let mut engine = AlarmEngine::new(self.config.regression, self.threshold);
        let mut trace = Vec::with_capacity(window.len());

        debug!(
            start = window.start,
            end = window.end,
            norm_height,
            "post-trigger monitoring"
        );

        integrator.reset(top);
        integrator.reset(base);
        self.state.advance(PipelineState::Monitoring);

        // The trigger sample is the zero reset row; evaluation starts after it.
        let mut last = window.start + 1;
        for i in window.clone().skip(1) {
            integrator.step(top, i);
            integrator.step(base, i);
            last = i + 1;

            let (drift_abs, drift_norm) =
                drift(top.displacement[i], base.displacement[i], norm_height);
            let step = engine.evaluate(i, base.displacement[i], drift_abs, drift_norm);

            trace.push(MonitoringSample {
                index: i,
                time_s: i as f64 * filter.dt,
                pgd_base_m: step.pgd_peak,
                max_drift_abs_m: step.drift_peak,
                max_drift_norm: step.norm_drift_peak,
                probability: step.probability,
            });

            let elapsed = i - window.start;
            if elapsed > 0 && elapsed % report_every == 0 {
                info!(
                    "T+{:.1}s: PGD={:.5} m, drift={:.2} mm/m, P={:.2}%",
                    elapsed as f64 * filter.dt,
                    step.pgd_peak,
                    step.norm_drift_peak * 1000.0,
                    step.probability * 100.0
                );
            }

            if step.alarmed {
                warn!(
                    index = i,
                    after_trigger_s = elapsed as f64 * filter.dt,
                    pgd_base_m = step.pgd_peak,
                    drift_norm_mm_per_m = step.norm_drift_peak * 1000.0,
                    probability_pct = step.probability * 100.0,
                    threshold_pct = self.threshold.probability_threshold * 100.0,
                    "red alarm"
                );
                break;
            }
        }

        if engine.is_alarmed() {
            self.state.advance(PipelineState::Alarmed);
        } else {
            self.state.advance(PipelineState::WindowExpired);
            info!(samples = window.len(), "monitoring window expired without alarm");
        }

        (engine.into_result(), trace, window.start..last)
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        trigger: TriggerOutcome,
        analysis: Option<AnalysisResult>,
        trace: Vec<MonitoringSample>,
        monitored: Range<usize>,
        mismatch: Option<LengthMismatch>,
        top: SignalChannel,
        base: SignalChannel,
    ) -> RunReport {
        RunReport {
            state: self.state,
            trigger,
            analysis,
            trace,
            samples: top.len(),
            mismatch,
            monitored,
            threshold: self.threshold,
            fs: self.filter.fs,
            dt: self.filter.dt,
            normalization_height: self.config.building.normalization_height(),
            top,
            base,
        }
    }
}

/// Truncates both channels to the shorter length.
fn align_lengths(top: &mut SignalChannel, base: &mut SignalChannel) -> Option<LengthMismatch> {
    if top.len() == base.len() {
        return None;
    }
    let mismatch = LengthMismatch {
        top: top.len(),
        base: base.len(),
    };
    let n = top.len().min(base.len());
    warn!(
        top = mismatch.top,
        base = mismatch.base,
        processed = n,
        "channel lengths differ, truncating to the shorter one"
    );
    top.truncate(n);
    base.truncate(n);
    Some(mismatch)
}
