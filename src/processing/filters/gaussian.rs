use rayon::prelude::*;

/// Width of the Gaussian relative to the kernel length.
pub const KERNEL_WIDTH_FRACTION: f64 = 0.05;

/// Builds the causal Gaussian smoothing kernel of length `len`:
/// `w[k] = exp(-((len-1-k) / (0.05·len))²)`, normalized to sum to 1.
pub fn gaussian_kernel(len: usize) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    let width = KERNEL_WIDTH_FRACTION * len as f64;

    let mut kernel: Vec<f64> = (0..len)
        .into_par_iter()
        .map(|k| {
            let u = (len - 1 - k) as f64 / width;
            (-(u * u)).exp()
        })
        .collect();

    // Total must be fully reduced before any weight is divided.
    let total: f64 = kernel.par_iter().sum();
    kernel.par_iter_mut().for_each(|w| *w /= total);
    kernel
}

/// Causal FIR convolution. Outputs before `kernel.len()` have no full history
/// and are left at zero.
pub fn apply_fir(input: &[f64], kernel: &[f64]) -> Vec<f64> {
    let kernel_len = kernel.len();
    let mut output = vec![0.0; input.len()];
    if kernel_len == 0 || input.len() <= kernel_len {
        return output;
    }

    output[kernel_len..]
        .par_iter_mut()
        .enumerate()
        .for_each(|(offset, out)| {
            let i = kernel_len + offset;
            *out = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| input[i - k] * w)
                .sum();
        });
    output
}
