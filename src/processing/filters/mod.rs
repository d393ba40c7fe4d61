pub mod gaussian;
pub mod highpass;

pub use gaussian::{apply_fir, gaussian_kernel};
pub use highpass::HighPass;

use crate::error::{EwsError, EwsResult};

pub const MIN_SAMPLE_RATE: u32 = 10;
pub const MAX_SAMPLE_RATE: u32 = 1000;

/// Filter bank for one sample rate: the drift-removal high-pass and the
/// two-second Gaussian smoothing kernel.
#[derive(Debug, Clone)]
pub struct FilterConfiguration {
    pub fs: u32,
    pub dt: f64,
    pub high_pass: HighPass,
    kernel: Vec<f64>,
}

impl FilterConfiguration {
    pub fn new(fs: u32) -> EwsResult<Self> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&fs) {
            return Err(EwsError::UnsupportedSampleRate(fs));
        }

        Ok(Self {
            fs,
            dt: 1.0 / fs as f64,
            high_pass: HighPass::for_rate(fs),
            kernel: gaussian_kernel(2 * fs as usize),
        })
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    pub fn kernel_len(&self) -> usize {
        self.kernel.len()
    }

    /// Converts a duration to a whole number of samples (truncating).
    pub fn samples(&self, seconds: f64) -> usize {
        (seconds * self.fs as f64) as usize
    }

    pub fn apply_high_pass(&self, input: &[f64]) -> Vec<f64> {
        self.high_pass.apply(input)
    }

    pub fn apply_smoothing(&self, input: &[f64]) -> Vec<f64> {
        apply_fir(input, &self.kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_rates_outside_range() {
        for fs in [0, 9, 1001, 48_000] {
            assert!(matches!(
                FilterConfiguration::new(fs),
                Err(EwsError::UnsupportedSampleRate(rate)) if rate == fs
            ));
        }
    }

    #[test]
    fn accepts_range_bounds() {
        let low = FilterConfiguration::new(10).unwrap();
        assert_eq!(low.kernel_len(), 20);
        let high = FilterConfiguration::new(1000).unwrap();
        assert_eq!(high.kernel_len(), 2000);
        assert!((high.dt - 0.001).abs() < 1e-15);
    }

    #[test]
    fn coefficients_are_never_zero_when_configured() {
        for fs in [10, 100, 128, 200, 250, 1000] {
            let filter = FilterConfiguration::new(fs).unwrap();
            assert!(filter.high_pass.a > 0.0);
            assert!(filter.high_pass.b > 0.0);
        }
    }

    #[test]
    fn window_lengths_truncate() {
        let filter = FilterConfiguration::new(128).unwrap();
        assert_eq!(filter.samples(0.5), 64);
        assert_eq!(filter.samples(6.0), 768);
        assert_eq!(filter.samples(0.01), 1);
    }
}
