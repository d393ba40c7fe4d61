use serde::Serialize;

use crate::config::TriggerConfig;
use crate::processing::filters::FilterConfiguration;

/// LTA averages below this are treated as silence and yield a ratio of 0.
pub const MIN_LTA_AVERAGE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TriggerOutcome {
    NotTriggered,
    Triggered { index: usize, ratio: f64 },
}

impl TriggerOutcome {
    pub fn index(&self) -> Option<usize> {
        match self {
            TriggerOutcome::Triggered { index, .. } => Some(*index),
            TriggerOutcome::NotTriggered => None,
        }
    }
}

/// Classic STA/LTA onset detector over the smoothed acceleration.
#[derive(Debug, Clone)]
pub struct StaLtaDetector {
    sta_len: usize,
    lta_len: usize,
    threshold: f64,
    /// Samples at the head of the signal without valid smoothed output.
    warmup: usize,
}

impl StaLtaDetector {
    pub fn new(config: &TriggerConfig, filter: &FilterConfiguration) -> Self {
        Self {
            sta_len: filter.samples(config.sta_s),
            lta_len: filter.samples(config.lta_s),
            threshold: config.threshold,
            warmup: filter.kernel_len(),
        }
    }

    pub fn sta_len(&self) -> usize {
        self.sta_len
    }

    pub fn lta_len(&self) -> usize {
        self.lta_len
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// First sample evaluated: the FIR is settled and a full LTA window fits.
    pub fn start_index(&self) -> usize {
        self.warmup + self.lta_len.saturating_sub(1)
    }

    /// Streams `(index, ratio)` from [`start_index`](Self::start_index) to the
    /// end of `signal`.
    pub fn ratios<'a>(&self, signal: &'a [f64]) -> RatioScan<'a> {
        RatioScan::new(signal, self.sta_len, self.lta_len, self.start_index())
    }

    /// Returns the first sample whose ratio is strictly above the threshold.
    pub fn detect(&self, signal: &[f64]) -> TriggerOutcome {
        self.ratios(signal)
            .find(|&(_, ratio)| ratio > self.threshold)
            .map_or(TriggerOutcome::NotTriggered, |(index, ratio)| {
                TriggerOutcome::Triggered { index, ratio }
            })
    }
}

/// Running STA/LTA sums, updated in O(1) per sample.
pub struct RatioScan<'a> {
    signal: &'a [f64],
    sta_len: usize,
    lta_len: usize,
    start: usize,
    next: usize,
    sta_sum: f64,
    lta_sum: f64,
}

impl<'a> RatioScan<'a> {
    fn new(signal: &'a [f64], sta_len: usize, lta_len: usize, start: usize) -> Self {
        let usable = sta_len > 0 && sta_len <= lta_len && start < signal.len();
        let mut scan = Self {
            signal,
            sta_len,
            lta_len,
            start,
            next: if usable { start } else { signal.len() },
            sta_sum: 0.0,
            lta_sum: 0.0,
        };
        if usable {
            scan.lta_sum = signal[start + 1 - lta_len..=start]
                .iter()
                .map(|x| x.abs())
                .sum();
            scan.sta_sum = signal[start + 1 - sta_len..=start]
                .iter()
                .map(|x| x.abs())
                .sum();
        }
        scan
    }

    fn ratio(&self) -> f64 {
        let sta_avg = self.sta_sum / self.sta_len as f64;
        let lta_avg = self.lta_sum / self.lta_len as f64;
        if lta_avg > MIN_LTA_AVERAGE {
            sta_avg / lta_avg
        } else {
            0.0
        }
    }
}

impl Iterator for RatioScan<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.next;
        if i >= self.signal.len() {
            return None;
        }
        if i > self.start {
            let incoming = self.signal[i].abs();
            self.sta_sum += incoming - self.signal[i - self.sta_len].abs();
            self.lta_sum += incoming - self.signal[i - self.lta_len].abs();
        }
        self.next += 1;
        Some((i, self.ratio()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(fs: u32) -> (StaLtaDetector, FilterConfiguration) {
        let filter = FilterConfiguration::new(fs).unwrap();
        (StaLtaDetector::new(&TriggerConfig::default(), &filter), filter)
    }

    fn brute_force_ratio(signal: &[f64], i: usize, sta: usize, lta: usize) -> f64 {
        let sta_avg: f64 = signal[i + 1 - sta..=i].iter().map(|x| x.abs()).sum::<f64>() / sta as f64;
        let lta_avg: f64 = signal[i + 1 - lta..=i].iter().map(|x| x.abs()).sum::<f64>() / lta as f64;
        if lta_avg > MIN_LTA_AVERAGE {
            sta_avg / lta_avg
        } else {
            0.0
        }
    }

    #[test]
    fn window_lengths_follow_sample_rate() {
        let (det, _) = detector(100);
        assert_eq!(det.sta_len(), 50);
        assert_eq!(det.lta_len(), 600);
        assert_eq!(det.threshold(), 4.0);
        assert_eq!(det.start_index(), 200 + 600 - 1);
    }

    #[test]
    fn constant_amplitude_never_triggers() {
        let (det, _) = detector(100);
        for amplitude in [1e-3, 0.5, 1.0, 250.0] {
            // Alternating sign keeps |x| constant.
            let signal: Vec<f64> = (0..3000)
                .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
                .collect();
            let mut count = 0;
            for (_, ratio) in det.ratios(&signal) {
                assert!((ratio - 1.0).abs() < 1e-9, "amplitude {amplitude}: ratio {ratio}");
                count += 1;
            }
            assert_eq!(count, 3000 - det.start_index());
            assert_eq!(det.detect(&signal), TriggerOutcome::NotTriggered);
        }
    }

    #[test]
    fn burst_triggers_at_exact_first_crossing() {
        let (det, _) = detector(100);
        let background = 0.01;
        let mut signal = vec![background; 2000];
        for x in signal[1200..1400].iter_mut() {
            *x = 8.0 * background;
        }

        let (sta, lta) = (det.sta_len(), det.lta_len());
        let expected = (det.start_index()..signal.len())
            .find(|&i| brute_force_ratio(&signal, i, sta, lta) > 4.0)
            .unwrap();
        // 12·(50 + 7m)/(600 + 7m) first exceeds 4 with m = 33 burst samples.
        assert_eq!(expected, 1232);

        match det.detect(&signal) {
            TriggerOutcome::Triggered { index, ratio } => {
                assert_eq!(index, expected);
                assert!(ratio > 4.0);
                let before = brute_force_ratio(&signal, index - 1, sta, lta);
                assert!(before <= 4.0);
            }
            TriggerOutcome::NotTriggered => panic!("burst was not detected"),
        }
    }

    #[test]
    fn streaming_sums_match_brute_force() {
        let (det, _) = detector(128);
        let signal: Vec<f64> = (0..2500)
            .map(|i| ((i as f64) * 0.37).sin() * (1.0 + (i / 400) as f64))
            .collect();
        for (i, ratio) in det.ratios(&signal) {
            let expected = brute_force_ratio(&signal, i, det.sta_len(), det.lta_len());
            assert!((ratio - expected).abs() < 1e-9, "index {i}");
        }
    }

    #[test]
    fn silent_signal_reports_zero_ratio() {
        let (det, _) = detector(100);
        let signal = vec![0.0; 1500];
        assert!(det.ratios(&signal).all(|(_, ratio)| ratio == 0.0));
        assert_eq!(det.detect(&signal), TriggerOutcome::NotTriggered);
    }

    #[test]
    fn signal_shorter_than_warmup_is_not_triggered() {
        let (det, _) = detector(100);
        let signal = vec![1.0; det.start_index()];
        assert_eq!(det.ratios(&signal).count(), 0);
        assert_eq!(det.detect(&signal).index(), None);
    }
}
