use crate::config::DecoderConfig;
use crate::detector::ToneDetector;
use crate::dtmf::Key;
use crate::error::{DtmfError, Result};
use crate::goertzel::GoertzelDetector;
use crate::preprocess::preprocess;
use crate::segmenter::Segmenter;
use crate::spectral::SpectralDetector;

/// Multi-tap DTMF decoder
///
/// Conditions the whole buffer, classifies fixed-length windows with the
/// detector `D`, then counts presses and pauses over the per-window
/// detections to recover the text.
pub struct Decoder<D: ToneDetector> {
    detector: D,
    config: DecoderConfig,
}

impl Decoder<GoertzelDetector> {
    /// Goertzel detector with half-overlapping windows
    pub fn goertzel() -> Self {
        Self {
            detector: GoertzelDetector::new(),
            config: DecoderConfig::default(),
        }
    }

    /// Goertzel detector that also checks the two tones are balanced
    pub fn goertzel_strict() -> Self {
        Self {
            detector: GoertzelDetector::strict(),
            config: DecoderConfig::default(),
        }
    }
}

impl Decoder<SpectralDetector> {
    /// FFT detector with half-overlapping windows
    pub fn spectral() -> Self {
        Self {
            detector: SpectralDetector::new(),
            config: DecoderConfig::default(),
        }
    }
}

impl<D: ToneDetector> Decoder<D> {
    pub fn with_detector(detector: D, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { detector, config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Number of full windows that fit in `len` samples
    pub fn window_count(&self, len: usize) -> usize {
        if len < self.config.window {
            return 0;
        }
        (len - self.config.window) / self.config.stride + 1
    }

    /// Per-window detections for `samples`, after preprocessing.
    ///
    /// Window `i` covers `[i * stride, i * stride + window)`; a trailing
    /// partial window is not analysed.
    pub fn classify(&self, samples: &[f32]) -> Result<Vec<Option<Key>>> {
        if samples.len() < self.config.window {
            return Err(DtmfError::InsufficientData {
                samples: samples.len(),
                required: self.config.window,
            });
        }

        let mut conditioned = samples.to_vec();
        preprocess(&mut conditioned, self.config.threshold_factor);

        let count = self.window_count(conditioned.len());
        log::debug!(
            "Classifying {} windows of {} samples (stride {})",
            count,
            self.config.window,
            self.config.stride
        );

        self.classify_windows(&conditioned, count)
    }

    /// Decode samples at `SAMPLE_RATE` back into text
    pub fn decode(&self, samples: &[f32]) -> Result<String> {
        let detections = self.classify(samples)?;

        let mut segmenter = Segmenter::new(&self.config);
        for (i, &detection) in detections.iter().enumerate() {
            if let Some(symbol) = segmenter.push(detection) {
                log::trace!("Window {}: emitted {:?}", i, symbol);
            }
        }
        let text = segmenter.finish();

        log::info!(
            "Decoded {} characters from {} samples ({} windows)",
            text.chars().count(),
            samples.len(),
            detections.len()
        );
        Ok(text)
    }

    fn detect_window(&self, conditioned: &[f32], index: usize) -> Result<Option<Key>> {
        let start = index * self.config.stride;
        let detection = self.detector.detect(&conditioned[start..start + self.config.window])?;
        log::trace!("Window {} @ {}: {:?}", index, start, detection);
        Ok(detection)
    }

    #[cfg(not(feature = "parallel"))]
    fn classify_windows(&self, conditioned: &[f32], count: usize) -> Result<Vec<Option<Key>>> {
        (0..count).map(|i| self.detect_window(conditioned, i)).collect()
    }

    #[cfg(feature = "parallel")]
    fn classify_windows(&self, conditioned: &[f32], count: usize) -> Result<Vec<Option<Key>>> {
        use rayon::prelude::*;

        (0..count)
            .into_par_iter()
            .map(|i| self.detect_window(conditioned, i))
            .collect()
    }
}

impl Default for Decoder<GoertzelDetector> {
    fn default() -> Self {
        Self::goertzel()
    }
}
