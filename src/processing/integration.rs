use std::ops::Range;

use crate::processing::channel::SignalChannel;
use crate::processing::filters::{FilterConfiguration, HighPass};

/// Trapezoidal rule for one sample interval.
#[inline]
pub fn trapezoid_step(integral_prev: f64, value_prev: f64, value: f64, dt: f64) -> f64 {
    integral_prev + 0.5 * dt * (value_prev + value)
}

/// Velocity and displacement of one channel at one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicState {
    pub velocity_unfiltered: f64,
    pub velocity_filtered: f64,
    pub displacement: f64,
}

impl KinematicState {
    /// Advances by one sample: integrate acceleration to velocity, high-pass the
    /// velocity to strip integration drift, integrate to displacement.
    pub fn advance(&self, acc_prev: f64, acc: f64, dt: f64, high_pass: &HighPass) -> Self {
        let velocity_unfiltered = trapezoid_step(self.velocity_unfiltered, acc_prev, acc, dt);
        let velocity_filtered = high_pass.step(
            self.velocity_unfiltered,
            velocity_unfiltered,
            self.velocity_filtered,
        );
        let displacement = trapezoid_step(
            self.displacement,
            self.velocity_filtered,
            velocity_filtered,
            dt,
        );
        Self {
            velocity_unfiltered,
            velocity_filtered,
            displacement,
        }
    }
}

/// Causal double integration over the post-trigger window. The velocity
/// correction reuses the acceleration high-pass coefficients.
#[derive(Debug, Clone)]
pub struct DriftIntegrator {
    dt: f64,
    high_pass: HighPass,
    start: usize,
    end: usize,
}

impl DriftIntegrator {
    /// Window `[trigger_index, trigger_index + window_s·fs)` clipped to `n`.
    pub fn new(filter: &FilterConfiguration, trigger_index: usize, window_s: f64, n: usize) -> Self {
        let end = trigger_index.saturating_add(filter.samples(window_s)).min(n);
        Self {
            dt: filter.dt,
            high_pass: filter.high_pass,
            start: trigger_index.min(end),
            end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Zeroes velocity and displacement at the trigger sample.
    pub fn reset(&self, channel: &mut SignalChannel) {
        if self.start < self.end {
            self.store(channel, self.start, KinematicState::default());
        }
    }

    /// Integrates sample `i` (`start < i < end`) from sample `i - 1`.
    pub fn step(&self, channel: &mut SignalChannel, i: usize) -> KinematicState {
        let prev = KinematicState {
            velocity_unfiltered: channel.velocity_unfiltered[i - 1],
            velocity_filtered: channel.velocity_filtered[i - 1],
            displacement: channel.displacement[i - 1],
        };
        let next = prev.advance(
            channel.high_passed[i - 1],
            channel.high_passed[i],
            self.dt,
            &self.high_pass,
        );
        self.store(channel, i, next);
        next
    }

    /// Integrates the whole window of one channel in one pass.
    #[cfg(test)]
    fn integrate(&self, channel: &mut SignalChannel) {
        self.reset(channel);
        for i in self.range().skip(1) {
            self.step(channel, i);
        }
    }

    fn store(&self, channel: &mut SignalChannel, i: usize, state: KinematicState) {
        channel.velocity_unfiltered[i] = state.velocity_unfiltered;
        channel.velocity_filtered[i] = state.velocity_filtered;
        channel.displacement[i] = state.displacement;
    }
}

/// Inter-story drift and its normalized ratio at one sample.
#[inline]
pub fn drift(top_displacement: f64, base_displacement: f64, normalization_height: f64) -> (f64, f64) {
    let drift = top_displacement - base_displacement;
    (drift, drift / normalization_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_with_high_passed(high_passed: Vec<f64>) -> SignalChannel {
        let mut channel = SignalChannel::new(vec![0.0; high_passed.len()]);
        channel.high_passed = high_passed;
        channel
    }

    #[test]
    fn window_is_clipped_to_signal() {
        let filter = FilterConfiguration::new(100).unwrap();
        assert_eq!(DriftIntegrator::new(&filter, 500, 10.0, 5000).range(), 500..1500);
        assert_eq!(DriftIntegrator::new(&filter, 500, 10.0, 900).range(), 500..900);
        assert!(DriftIntegrator::new(&filter, 950, 10.0, 900).range().is_empty());
    }

    #[test]
    fn zero_input_stays_at_rest() {
        let filter = FilterConfiguration::new(100).unwrap();
        let mut channel = channel_with_high_passed(vec![0.0; 3000]);
        let integrator = DriftIntegrator::new(&filter, 1000, 10.0, channel.len());
        integrator.integrate(&mut channel);
        for i in integrator.range() {
            assert_eq!(channel.velocity_unfiltered[i], 0.0);
            assert_eq!(channel.velocity_filtered[i], 0.0);
            assert_eq!(channel.displacement[i], 0.0);
        }
    }

    #[test]
    fn trigger_sample_discards_prior_state() {
        let filter = FilterConfiguration::new(100).unwrap();
        let mut channel = channel_with_high_passed(vec![1.0; 400]);
        channel.velocity_unfiltered = vec![3.0; 400];
        channel.velocity_filtered = vec![3.0; 400];
        channel.displacement = vec![3.0; 400];
        let integrator = DriftIntegrator::new(&filter, 100, 1.0, 400);
        integrator.integrate(&mut channel);
        assert_eq!(channel.displacement[100], 0.0);
        assert_eq!(channel.velocity_unfiltered[100], 0.0);
        // Trapezoid of a unit acceleration over one sample.
        assert!((channel.velocity_unfiltered[101] - 0.01).abs() < 1e-15);
        // Samples outside the window are untouched.
        assert_eq!(channel.displacement[99], 3.0);
        assert_eq!(channel.displacement[200], 3.0);
    }

    #[test]
    fn constant_step_settles_instead_of_growing() {
        let fs = 100;
        let filter = FilterConfiguration::new(fs).unwrap();
        let step_at = 500;
        let c = 0.2;
        let raw: Vec<f64> = (0..step_at + 70 * fs as usize)
            .map(|i| if i < step_at { 0.0 } else { c })
            .collect();
        let mut channel = SignalChannel::new(raw);
        channel.high_passed = filter.apply_high_pass(&channel.raw);

        let integrator = DriftIntegrator::new(&filter, step_at - 1, 60.0, channel.len());
        integrator.integrate(&mut channel);

        let end = integrator.range().end - 1;
        let tail = end - 10 * fs as usize;
        let settled = channel.displacement[end];
        // Drift-corrected displacement settles near c·τ² with τ = 1/(2π·0.075).
        let tau = 1.0 / (2.0 * std::f64::consts::PI * 0.075);
        assert!(settled > 0.0 && settled < 1.1 * c * tau * tau);
        assert!((settled - channel.displacement[tail]).abs() < 1e-3 * settled);

        // Naive double integration of the same step grows quadratically.
        let t = (end - (step_at - 1)) as f64 * filter.dt;
        assert!(0.5 * c * t * t > 100.0 * settled);
    }

    #[test]
    fn step_by_step_matches_whole_window() {
        let filter = FilterConfiguration::new(128).unwrap();
        let signal: Vec<f64> = (0..2000).map(|i| (i as f64 * 0.05).sin()).collect();
        let mut stepped = channel_with_high_passed(signal.clone());
        let mut whole = channel_with_high_passed(signal);

        let integrator = DriftIntegrator::new(&filter, 300, 5.0, 2000);
        integrator.integrate(&mut whole);
        integrator.reset(&mut stepped);
        for i in integrator.range().skip(1) {
            let state = integrator.step(&mut stepped, i);
            assert_eq!(state.displacement, whole.displacement[i]);
        }
        assert_eq!(stepped.velocity_filtered, whole.velocity_filtered);
    }

    #[test]
    fn drift_is_normalized_by_height() {
        let (abs, norm) = drift(0.03, 0.01, 20.0);
        assert!((abs - 0.02).abs() < 1e-15);
        assert!((norm - 0.001).abs() < 1e-15);
    }
}
