//! Runtime tuning for the decoder and the tone detectors
//!
//! Window counts are in units of analysis windows (one per stride).

use crate::error::{DtmfError, Result};
use crate::preprocess::PREPROCESS_THRESHOLD_FACTOR;
use crate::WINDOW_SAMPLES;

/// Windowing and segmentation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Analysis window length in samples
    pub window: usize,
    /// Hop between consecutive windows in samples
    pub stride: usize,
    /// Consecutive tone windows needed to count one press
    pub confirm_windows: usize,
    /// Consecutive silent windows that end a symbol
    pub pause_windows: usize,
    /// A different key is ignored until this many silent windows have passed
    pub guard_windows: usize,
    /// Windows treated as silence right after a symbol is emitted
    pub cooldown_windows: usize,
    /// Adaptive noise-gate factor for preprocessing
    pub threshold_factor: f32,
}

impl DecoderConfig {
    /// Half-overlapping windows (the default)
    pub fn overlapping() -> Self {
        Self {
            window: WINDOW_SAMPLES,
            stride: WINDOW_SAMPLES / 2,
            confirm_windows: 3,
            pause_windows: 4,
            guard_windows: 2,
            cooldown_windows: 2,
            threshold_factor: PREPROCESS_THRESHOLD_FACTOR,
        }
    }

    /// Back-to-back windows.
    ///
    /// Only reliable when the signal starts on a window boundary, as it
    /// does straight out of the encoder.
    pub fn non_overlapping() -> Self {
        Self {
            window: WINDOW_SAMPLES,
            stride: WINDOW_SAMPLES,
            confirm_windows: 2,
            pause_windows: 3,
            guard_windows: 2,
            cooldown_windows: 0,
            threshold_factor: PREPROCESS_THRESHOLD_FACTOR,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(DtmfError::InvalidConfig("window must be at least one sample".into()));
        }
        if self.stride == 0 || self.stride > self.window {
            return Err(DtmfError::InvalidConfig(format!(
                "stride must be between 1 and the window length ({}), got {}",
                self.window, self.stride
            )));
        }
        if self.confirm_windows == 0 {
            return Err(DtmfError::InvalidConfig("confirm_windows must be at least 1".into()));
        }
        if self.pause_windows == 0 {
            return Err(DtmfError::InvalidConfig("pause_windows must be at least 1".into()));
        }
        if !self.threshold_factor.is_finite() || self.threshold_factor < 0.0 {
            return Err(DtmfError::InvalidConfig(format!(
                "threshold_factor must be finite and non-negative, got {}",
                self.threshold_factor
            )));
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::overlapping()
    }
}

/// Acceptance thresholds for the Goertzel detector
#[derive(Debug, Clone, PartialEq)]
pub struct GoertzelConfig {
    /// Minimum combined (low + high) magnitude
    pub min_magnitude: f32,
    /// Also require both tones to be present and comparable
    pub check_balance: bool,
    /// Minimum magnitude of the weaker tone when `check_balance` is set
    pub min_tone_magnitude: f32,
    /// Weaker/stronger ratio must exceed this when `check_balance` is set
    pub min_balance: f32,
}

impl GoertzelConfig {
    pub fn strict() -> Self {
        Self {
            check_balance: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_magnitude", self.min_magnitude),
            ("min_tone_magnitude", self.min_tone_magnitude),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DtmfError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..1.0).contains(&self.min_balance) {
            return Err(DtmfError::InvalidConfig(format!(
                "min_balance must be in [0, 1), got {}",
                self.min_balance
            )));
        }
        Ok(())
    }
}

impl Default for GoertzelConfig {
    fn default() -> Self {
        Self {
            min_magnitude: 20.0,
            check_balance: false,
            min_tone_magnitude: 8.0,
            min_balance: 0.2,
        }
    }
}

/// Parameters of the FFT detector
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralConfig {
    /// Transform length; shorter windows are zero-padded, longer ones truncated
    pub fft_size: usize,
    /// Bins summed on each side of a tone's center bin
    pub neighbor_bins: usize,
    /// Minimum combined (low + high) magnitude
    pub min_magnitude: f32,
}

impl SpectralConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fft_size < 64 {
            return Err(DtmfError::InvalidConfig(format!(
                "fft_size must be at least 64, got {}",
                self.fft_size
            )));
        }
        if self.neighbor_bins > 8 {
            return Err(DtmfError::InvalidConfig(format!(
                "neighbor_bins must be at most 8, got {}",
                self.neighbor_bins
            )));
        }
        if !self.min_magnitude.is_finite() || self.min_magnitude < 0.0 {
            return Err(DtmfError::InvalidConfig(format!(
                "min_magnitude must be finite and non-negative, got {}",
                self.min_magnitude
            )));
        }
        Ok(())
    }
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            neighbor_bins: 1,
            min_magnitude: 50.0,
        }
    }
}
