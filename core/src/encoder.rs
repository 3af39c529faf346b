use crate::dtmf::{burst_len, SymbolMapping, ToneTable};
use crate::error::{DtmfError, Result};
use crate::{REPEAT_GAP_MS, SYMBOL_PAUSE_MS, SYMBOL_PAUSE_SAMPLES, TONE_DURATION_MS};

/// Text to multi-tap DTMF encoder
///
/// Each symbol becomes its key's tone burst (the key pressed `presses`
/// times), and symbols are separated by a fixed silent pause. Bursts are
/// copied from the precomputed `ToneTable`.
pub struct Encoder<'t> {
    table: &'t ToneTable,
}

impl Encoder<'static> {
    /// Encoder backed by the process-wide tone table
    pub fn new() -> Self {
        Self::with_table(ToneTable::global())
    }
}

impl<'t> Encoder<'t> {
    pub fn with_table(table: &'t ToneTable) -> Self {
        Self { table }
    }

    /// Validate `text` and convert it to the table's canonical (uppercase) form.
    ///
    /// Fails on the first character that has no mapping, reporting its
    /// character position.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let mut normalized = String::with_capacity(text.len());

        for (position, character) in text.chars().enumerate() {
            let upper = character.to_ascii_uppercase();
            if self.table.mapping_for(upper).is_none() {
                return Err(DtmfError::UnsupportedCharacter { character, position });
            }
            normalized.push(upper);
        }

        if normalized.is_empty() {
            return Err(DtmfError::EmptyMessage);
        }

        log::debug!("Normalized message to: {:?}", normalized);
        Ok(normalized)
    }

    /// Total signal duration of `text` in milliseconds
    pub fn duration_ms(&self, text: &str) -> Result<usize> {
        let mappings = self.map_symbols(text)?;

        let bursts: usize = mappings
            .iter()
            .map(|m| {
                let presses = m.presses as usize;
                presses * TONE_DURATION_MS + (presses - 1) * REPEAT_GAP_MS
            })
            .sum();

        Ok(bursts + (mappings.len() - 1) * SYMBOL_PAUSE_MS)
    }

    /// Exact number of samples `encode` produces for `text`
    pub fn signal_len(&self, text: &str) -> Result<usize> {
        let mappings = self.map_symbols(text)?;
        Ok(Self::total_samples(&mappings))
    }

    /// Encode text into audio samples at `SAMPLE_RATE`
    /// Returns: burst + pause + burst + ... + burst (no trailing pause)
    pub fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mappings = self.map_symbols(text)?;
        let total = Self::total_samples(&mappings);

        log::debug!("Encoding {} symbols into {} samples", mappings.len(), total);

        let mut samples: Vec<f32> = Vec::new();
        samples
            .try_reserve_exact(total)
            .map_err(|_| DtmfError::Allocation { samples: total })?;

        for (i, mapping) in mappings.iter().enumerate() {
            let burst = self.table.burst(mapping).ok_or(DtmfError::UnsupportedCharacter {
                character: mapping.symbol,
                position: i,
            })?;
            log::trace!(
                "{:?} -> {} x {} ({} samples)",
                mapping.symbol,
                mapping.key,
                mapping.presses,
                burst.len()
            );
            samples.extend_from_slice(burst);

            // Pause between symbols, not after the last one
            if i + 1 < mappings.len() {
                samples.resize(samples.len() + SYMBOL_PAUSE_SAMPLES, 0.0);
            }
        }

        debug_assert_eq!(samples.len(), total, "Encoded length differs from computed duration");
        Ok(samples)
    }

    fn map_symbols(&self, text: &str) -> Result<Vec<&'static SymbolMapping>> {
        let normalized = self.normalize(text)?;
        normalized
            .chars()
            .enumerate()
            .map(|(position, character)| {
                self.table
                    .mapping_for(character)
                    .ok_or(DtmfError::UnsupportedCharacter { character, position })
            })
            .collect()
    }

    fn total_samples(mappings: &[&SymbolMapping]) -> usize {
        let bursts: usize = mappings.iter().map(|m| burst_len(m.presses as usize)).sum();
        bursts + mappings.len().saturating_sub(1) * SYMBOL_PAUSE_SAMPLES
    }
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}
