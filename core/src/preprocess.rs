//! Decode-side signal conditioning
//!
//! Applied once to the whole buffer before windowing, always in this order:
//! adaptive threshold, noise gate, peak normalization, DTMF band-pass,
//! pre-emphasis. The gate statistics are taken from the raw buffer, so
//! reordering the stages changes what gets gated.

/// Multiplier on the standard deviation for the adaptive threshold
pub const PREPROCESS_THRESHOLD_FACTOR: f32 = 1.1;

/// Peaks below this are left unnormalized
pub const NORMALIZE_EPSILON: f32 = 1e-4;

/// Pre-emphasis coefficient: y[n] = x[n] - alpha * x[n-1]
pub const PRE_EMPHASIS_ALPHA: f32 = 0.95;

// Fourth-order IIR band-pass for 697-1477 Hz at 44.1kHz
const BANDPASS_B: [f64; 5] = [0.0032981, 0.0, -0.00659619, 0.0, 0.0032981];
const BANDPASS_A: [f64; 5] = [1.0, -3.79262674, 5.43304806, -3.48434686, 0.84429627];

/// Root mean square over the whole buffer
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// `mean + factor * stddev` of the buffer
pub fn adaptive_threshold(samples: &[f32], factor: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let n = samples.len() as f64;
    let (sum, sum_squares) = samples.iter().fold((0.0f64, 0.0f64), |(sum, sq), &s| {
        let s = s as f64;
        (sum + s, sq + s * s)
    });

    let mean = sum / n;
    let variance = (sum_squares / n - mean * mean).max(0.0);
    (mean + factor as f64 * variance.sqrt()) as f32
}

/// Zero every sample whose magnitude is under `rms(buffer) * threshold`.
///
/// Returns the gate level that was applied.
pub fn noise_gate(samples: &mut [f32], threshold: f32) -> f32 {
    let gate = rms(samples) * threshold;

    for sample in samples.iter_mut() {
        if sample.abs() < gate {
            *sample = 0.0;
        }
    }

    gate
}

/// Scale so the largest magnitude is 1.0; near-silent buffers are left as-is
pub fn normalize(samples: &mut [f32]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > NORMALIZE_EPSILON {
        for sample in samples.iter_mut() {
            *sample /= peak;
        }
    }
}

/// Band-limit to the DTMF range (direct form I, f64 state)
pub fn bandpass(samples: &mut [f32]) {
    let b = &BANDPASS_B;
    let a = &BANDPASS_A;
    let mut x = [0.0f64; 4];
    let mut y = [0.0f64; 4];

    for sample in samples.iter_mut() {
        let input = *sample as f64;
        let output = b[0] * input + b[1] * x[0] + b[2] * x[1] + b[3] * x[2] + b[4] * x[3]
            - a[1] * y[0]
            - a[2] * y[1]
            - a[3] * y[2]
            - a[4] * y[3];

        x = [input, x[0], x[1], x[2]];
        y = [output, y[0], y[1], y[2]];
        *sample = output as f32;
    }
}

/// First-order high-pass emphasis
pub fn pre_emphasis(samples: &mut [f32], alpha: f32) {
    let mut previous = 0.0f32;
    for sample in samples.iter_mut() {
        let current = *sample;
        *sample = current - alpha * previous;
        previous = current;
    }
}

/// Run the full conditioning chain in place
pub fn preprocess(samples: &mut [f32], threshold_factor: f32) {
    if samples.is_empty() {
        return;
    }

    let threshold = adaptive_threshold(samples, threshold_factor);
    let gate = noise_gate(samples, threshold);
    log::debug!(
        "Noise gate at {:.5} (adaptive threshold {:.5}, factor {})",
        gate,
        threshold,
        threshold_factor
    );

    normalize(samples);
    bandpass(samples);
    pre_emphasis(samples, PRE_EMPHASIS_ALPHA);
}
