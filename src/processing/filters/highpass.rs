use serde::{Deserialize, Serialize};

/// Cutoff of the drift-removal high-pass for rates without a calibrated pair.
pub const HIGH_PASS_CUTOFF_HZ: f64 = 0.075;

// Pre-measured (fs, hp_b, hp_a) pairs.
const CALIBRATED: [(u32, f64, f64); 3] = [
    (100, 0.99764934, 0.99529868),
    (128, 0.9981626, 0.99632521),
    (200, 0.99882329, 0.99764658),
];

/// First-order IIR high-pass:
/// `y[i] = b·x[i] − b·x[i−1] + a·y[i−1]`, with `y[0] = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighPass {
    /// Feedback coefficient (`hp_a`).
    pub a: f64,
    /// Feedforward coefficient (`hp_b`).
    pub b: f64,
}

impl HighPass {
    /// Calibrated coefficients when `fs` matches one exactly, otherwise the
    /// bilinear single-pole design at [`HIGH_PASS_CUTOFF_HZ`].
    pub fn for_rate(fs: u32) -> Self {
        CALIBRATED
            .iter()
            .find(|(rate, _, _)| *rate == fs)
            .map(|&(_, b, a)| HighPass { a, b })
            .unwrap_or_else(|| Self::single_pole(HIGH_PASS_CUTOFF_HZ, fs as f64))
    }

    pub fn single_pole(fc: f64, fs: f64) -> Self {
        let dt = 1.0 / fs;
        let rc = 1.0 / (2.0 * std::f64::consts::PI * fc);
        let alpha = rc / (rc + dt);
        HighPass {
            a: alpha,
            b: (1.0 + alpha) / 2.0,
        }
    }

    /// One step of the recurrence. The previous input and output are passed in
    /// explicitly so the step has no hidden state.
    #[inline]
    pub fn step(&self, x_prev: f64, x: f64, y_prev: f64) -> f64 {
        x * self.b - x_prev * self.b + self.a * y_prev
    }

    /// Filters a whole signal, left to right.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(input.len());
        if input.is_empty() {
            return output;
        }
        output.push(0.0);
        let mut y_prev = 0.0;
        for pair in input.windows(2) {
            y_prev = self.step(pair[0], pair[1], y_prev);
            output.push(y_prev);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn calibrated_rates_take_precedence() {
        let hp = HighPass::for_rate(100);
        assert_eq!(hp.a, 0.99529868);
        assert_eq!(hp.b, 0.99764934);

        let derived = HighPass::single_pole(HIGH_PASS_CUTOFF_HZ, 100.0);
        assert_ne!(derived, hp);
    }

    #[test]
    fn derived_coefficients_follow_bilinear_design() {
        let hp = HighPass::for_rate(250);
        let rc = 1.0 / (2.0 * std::f64::consts::PI * 0.075);
        let alpha = rc / (rc + 1.0 / 250.0);
        assert!((hp.a - alpha).abs() < 1e-15);
        assert!((hp.b - (1.0 + alpha) / 2.0).abs() < 1e-15);
        assert!(hp.a > 0.0 && hp.a < 1.0);
        assert!(hp.b > 0.0 && hp.b < 1.0);
    }

    #[test]
    fn first_output_is_zero() {
        let hp = HighPass::for_rate(128);
        let out = hp.apply(&[3.0, 1.0, -2.0]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], 0.0);
        assert!(hp.apply(&[]).is_empty());
    }

    #[test]
    fn recurrence_is_bounded_termwise() {
        let mut rng = StdRng::seed_from_u64(7);
        let input: Vec<f64> = (0..5000).map(|_| rng.gen_range(-3.0..3.0)).collect();
        for fs in [10, 100, 128, 333, 1000] {
            let hp = HighPass::for_rate(fs);
            let out = hp.apply(&input);
            for i in 1..input.len() {
                let bound = hp.b * (input[i].abs() + input[i - 1].abs()) + hp.a * out[i - 1].abs();
                assert!(out[i].abs() <= bound + 1e-12, "fs {fs}, index {i}");
            }
        }
    }

    #[test]
    fn removes_constant_offset() {
        let hp = HighPass::for_rate(100);
        let out = hp.apply(&vec![5.0; 20_000]);
        assert!(out.iter().all(|y| y.abs() < 1e-12));
    }

    #[test]
    fn step_matches_apply() {
        let hp = HighPass::for_rate(200);
        let input = [0.0, 1.0, 0.5, -0.25, 2.0];
        let out = hp.apply(&input);
        let mut y = 0.0;
        for i in 1..input.len() {
            y = hp.step(input[i - 1], input[i], y);
            assert_eq!(y, out[i]);
        }
    }
}
