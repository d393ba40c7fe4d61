use crate::processing::filters::FilterConfiguration;

/// All per-sample traces of one sensor. Every vector has the same length and
/// shares the same sample clock.
#[derive(Debug, Clone, Default)]
pub struct SignalChannel {
    pub raw: Vec<f64>,
    pub high_passed: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub velocity_unfiltered: Vec<f64>,
    pub velocity_filtered: Vec<f64>,
    pub displacement: Vec<f64>,
}

impl SignalChannel {
    /// Wraps raw acceleration (m/s²); derived traces start zeroed.
    pub fn new(raw: Vec<f64>) -> Self {
        let n = raw.len();
        Self {
            raw,
            high_passed: vec![0.0; n],
            smoothed: vec![0.0; n],
            velocity_unfiltered: vec![0.0; n],
            velocity_filtered: vec![0.0; n],
            displacement: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Drops every sample at or after `n`.
    pub fn truncate(&mut self, n: usize) {
        self.raw.truncate(n);
        self.high_passed.truncate(n);
        self.smoothed.truncate(n);
        self.velocity_unfiltered.truncate(n);
        self.velocity_filtered.truncate(n);
        self.displacement.truncate(n);
    }

    /// High-pass then smooth the raw trace.
    pub fn filter(&mut self, filter: &FilterConfiguration) {
        self.high_passed = filter.apply_high_pass(&self.raw);
        self.smoothed = filter.apply_smoothing(&self.high_passed);
    }

    /// Peak ground acceleration of the raw trace.
    pub fn pga(&self) -> f64 {
        self.raw.iter().fold(0.0_f64, |peak, x| peak.max(x.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_traces_match_raw_length() {
        let channel = SignalChannel::new(vec![1.0, -2.0, 0.5]);
        assert_eq!(channel.len(), 3);
        assert_eq!(channel.displacement, vec![0.0; 3]);
        assert_eq!(channel.pga(), 2.0);
    }

    #[test]
    fn truncate_keeps_traces_aligned() {
        let mut channel = SignalChannel::new(vec![0.1; 1000]);
        channel.truncate(950);
        assert_eq!(channel.raw.len(), 950);
        assert_eq!(channel.high_passed.len(), 950);
        assert_eq!(channel.smoothed.len(), 950);
        assert_eq!(channel.velocity_unfiltered.len(), 950);
        assert_eq!(channel.velocity_filtered.len(), 950);
        assert_eq!(channel.displacement.len(), 950);
    }

    #[test]
    fn filter_fills_high_pass_and_smoothing() {
        let filter = FilterConfiguration::new(10).unwrap();
        let mut channel = SignalChannel::new((0..100).map(|i| (i as f64 * 0.9).sin()).collect());
        channel.filter(&filter);
        assert_eq!(channel.high_passed.len(), 100);
        assert_eq!(channel.high_passed[0], 0.0);
        assert!(channel.smoothed[..filter.kernel_len()].iter().all(|&y| y == 0.0));
        assert!(channel.smoothed[filter.kernel_len()..].iter().any(|&y| y != 0.0));
    }
}
