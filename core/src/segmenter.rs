//! Press-counting state machine
//!
//! Consumes one detection per analysis window, in order. A run of at least
//! `confirm_windows` windows of the same key counts as one press once the
//! tone stops; `pause_windows` silent windows end the symbol and emit the
//! letter for (key, presses).

use crate::config::DecoderConfig;
use crate::dtmf::{Key, ToneTable};
use crate::UNKNOWN_SYMBOL;

pub struct Segmenter<'t> {
    table: &'t ToneTable,
    confirm: usize,
    pause: usize,
    guard: usize,
    cooldown: usize,

    last_key: Option<Key>,
    run: usize,
    presses: usize,
    silent: usize,
    cooldown_left: usize,
    output: String,
}

impl Segmenter<'static> {
    pub fn new(config: &DecoderConfig) -> Self {
        Self::with_table(config, ToneTable::global())
    }
}

impl<'t> Segmenter<'t> {
    pub fn with_table(config: &DecoderConfig, table: &'t ToneTable) -> Self {
        Self {
            table,
            confirm: config.confirm_windows,
            pause: config.pause_windows,
            guard: config.guard_windows,
            cooldown: config.cooldown_windows,
            last_key: None,
            run: 0,
            presses: 0,
            silent: 0,
            cooldown_left: 0,
            output: String::new(),
        }
    }

    /// Feed the next window's detection. Returns the letter if one was emitted.
    pub fn push(&mut self, detection: Option<Key>) -> Option<char> {
        let detection = if self.cooldown_left > 0 {
            self.cooldown_left -= 1;
            None
        } else {
            detection
        };

        match detection {
            Some(key) => self.on_tone(key),
            None => self.on_silence(),
        }
    }

    /// Flush any pending symbol and return the decoded text
    pub fn finish(mut self) -> String {
        if let Some(key) = self.last_key {
            let presses = self.presses + usize::from(self.run >= self.confirm);
            if presses > 0 {
                self.emit(key, presses);
            }
        }
        self.output
    }

    /// Text emitted so far
    pub fn output(&self) -> &str {
        &self.output
    }

    fn on_tone(&mut self, detected: Key) -> Option<char> {
        let mut emitted = None;

        // Within the guard interval a different key is taken as the current one
        let key = match self.last_key {
            Some(last) if detected != last && self.silent < self.guard => last,
            _ => detected,
        };

        if self.last_key == Some(key) {
            self.run += 1;
        } else {
            if let Some(last) = self.last_key {
                if self.presses > 0 {
                    emitted = Some(self.emit(last, self.presses));
                }
            }
            self.last_key = Some(key);
            self.run = 1;
            self.presses = 0;
        }

        self.silent = 0;
        emitted
    }

    fn on_silence(&mut self) -> Option<char> {
        self.silent += 1;
        if self.run >= self.confirm {
            self.presses += 1;
        }
        self.run = 0;

        if self.silent < self.pause {
            return None;
        }

        let key = self.last_key.take()?;
        let emitted = if self.presses > 0 {
            let symbol = self.emit(key, self.presses);
            self.cooldown_left = self.cooldown;
            Some(symbol)
        } else {
            None
        };

        self.presses = 0;
        self.run = 0;
        self.silent = 0;
        emitted
    }

    fn emit(&mut self, key: Key, presses: usize) -> char {
        let symbol = self.table.symbol_for(key, presses).unwrap_or(UNKNOWN_SYMBOL);
        log::debug!("{} x {} -> {:?}", key, presses, symbol);
        self.output.push(symbol);
        symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(number: u8) -> Option<Key> {
        Key::new(number)
    }

    /// `presses` runs of `on` windows of `number`, separated by `gap` silent windows
    fn burst(number: u8, presses: usize, on: usize, gap: usize) -> Vec<Option<Key>> {
        let mut stream = Vec::new();
        for press in 0..presses {
            stream.extend(std::iter::repeat(key(number)).take(on));
            if press + 1 < presses {
                stream.extend(std::iter::repeat(None).take(gap));
            }
        }
        stream
    }

    fn silence(windows: usize) -> Vec<Option<Key>> {
        vec![None; windows]
    }

    fn run(config: &DecoderConfig, stream: &[Option<Key>]) -> String {
        let mut segmenter = Segmenter::new(config);
        for &detection in stream {
            segmenter.push(detection);
        }
        segmenter.finish()
    }

    #[test]
    fn test_single_letter() {
        let config = DecoderConfig::default();
        // 'H' is key 4 pressed three times
        let stream = burst(4, 3, 7, 2);
        assert_eq!(run(&config, &stream), "H");
    }

    #[test]
    fn test_two_letters_with_pause() {
        let config = DecoderConfig::default();
        let mut stream = burst(4, 3, 7, 2);
        stream.extend(silence(8));
        stream.extend(burst(4, 4, 7, 2));
        assert_eq!(run(&config, &stream), "HI");
    }

    #[test]
    fn test_push_reports_emission() {
        let config = DecoderConfig::default();
        let mut segmenter = Segmenter::new(&config);
        for detection in burst(2, 2, 7, 2) {
            assert_eq!(segmenter.push(detection), None);
        }

        let emitted: Vec<char> = silence(4).into_iter().filter_map(|d| segmenter.push(d)).collect();
        assert_eq!(emitted, vec!['A']);
        assert_eq!(segmenter.output(), "A");
        assert_eq!(segmenter.finish(), "A");
    }

    #[test]
    fn test_short_runs_are_not_presses() {
        let config = DecoderConfig::default();
        // Runs of two windows never reach confirmation
        let stream = burst(5, 3, 2, 2);
        assert_eq!(run(&config, &stream), "");
    }

    #[test]
    fn test_guard_keeps_current_key() {
        let config = DecoderConfig::default();
        let mut stream = burst(7, 2, 7, 2);
        // Spurious key 8 right after the second press ends
        stream.insert(7 + 2 + 7, key(8));
        stream.extend(silence(4));
        assert_eq!(run(&config, &stream), "P");
    }

    #[test]
    fn test_key_change_flushes_pending_letter() {
        let config = DecoderConfig::default();
        // Key 2 once, then key 3 once after only two silent windows
        let mut stream = burst(2, 1, 7, 0);
        stream.extend(silence(2));
        stream.extend(burst(3, 1, 7, 0));
        assert_eq!(run(&config, &stream), "23");
    }

    #[test]
    fn test_cooldown_suppresses_windows_after_emit() {
        let config = DecoderConfig::default();
        let mut stream = burst(1, 1, 7, 0);
        stream.extend(silence(4));
        // Swallowed by the two cooldown windows
        stream.extend(std::iter::repeat(key(6)).take(2));
        stream.extend(silence(6));
        assert_eq!(run(&config, &stream), "1");
    }

    #[test]
    fn test_finish_counts_trailing_run() {
        let config = DecoderConfig::default();
        // Stream ends while the third press is still sounding
        let stream = burst(9, 3, 7, 2);
        assert_eq!(run(&config, &stream), "X");

        // A trailing run too short to confirm is dropped
        let mut stream = burst(9, 2, 7, 2);
        stream.extend(silence(2));
        stream.extend(burst(9, 1, 2, 0));
        assert_eq!(run(&config, &stream), "W");
    }

    #[test]
    fn test_unmapped_presses() {
        let config = DecoderConfig::default();
        // Key 1 only has a single-press symbol
        let stream = burst(1, 2, 7, 2);
        assert_eq!(run(&config, &stream), UNKNOWN_SYMBOL.to_string());
    }

    #[test]
    fn test_silence_only() {
        let config = DecoderConfig::default();
        assert_eq!(run(&config, &silence(50)), "");
        assert_eq!(run(&config, &[]), "");
    }

    #[test]
    fn test_non_overlapping_counts() {
        let config = DecoderConfig::non_overlapping();
        // Four windows per tone, one per gap, four per pause
        let mut stream = burst(6, 3, 4, 1);
        stream.extend(silence(4));
        stream.extend(burst(11, 2, 4, 1));
        assert_eq!(run(&config, &stream), "N ");
    }
}
