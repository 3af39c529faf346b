// ============================================================================
// ROUND-TRIP TESTS
// ============================================================================
// Every test encodes text, optionally degrades the signal, and decodes it.
// The full-alphabet cases run a few thousand detector windows; in debug mode
// they take a few seconds each. For faster runs:
//   cargo test -p taptone-core --test roundtrip_test --release
// ============================================================================

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use taptone_core::{
    Decoder, DecoderConfig, DtmfError, Encoder, GoertzelDetector, Key, SpectralDetector, ToneTable,
    REPEAT_GAP_SAMPLES, SYMBOL_PAUSE_SAMPLES, UNKNOWN_SYMBOL, WINDOW_SAMPLES,
};

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ 0123456789.,!?#*";

fn encode(text: &str) -> Vec<f32> {
    Encoder::new().encode(text).expect("Failed to encode")
}

fn add_noise(samples: &mut [f32], std_dev: f32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, std_dev).expect("Invalid noise parameters");
    for sample in samples.iter_mut() {
        *sample += normal.sample(&mut rng);
    }
}

type DecodeFn = Box<dyn Fn(&[f32]) -> Result<String, DtmfError>>;

fn decoders() -> Vec<(&'static str, DecodeFn)> {
    vec![
        ("goertzel", Box::new(|s: &[f32]| Decoder::goertzel().decode(s)) as DecodeFn),
        ("goertzel-strict", Box::new(|s: &[f32]| Decoder::goertzel_strict().decode(s)) as DecodeFn),
        ("spectral", Box::new(|s: &[f32]| Decoder::spectral().decode(s)) as DecodeFn),
    ]
}

#[test]
fn test_hi_scenario() {
    let samples = encode("HI");
    // 1850 ms at 44.1 kHz
    assert_eq!(samples.len(), 81585);

    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, "HI");
}

#[test]
fn test_full_alphabet_round_trip() {
    let samples = encode(ALPHABET);
    for (name, decode) in decoders() {
        let decoded = decode(&samples).expect("Failed to decode");
        assert_eq!(decoded, ALPHABET, "{} detector failed the alphabet", name);
    }
}

#[test]
fn test_every_symbol_alone() {
    // Each symbol is a different press count; one symbol per signal checks
    // that exactly `presses` presses are counted
    let decoders = decoders();
    for mapping in ToneTable::global().mappings() {
        let text = mapping.symbol.to_string();
        let samples = encode(&text);
        for (name, decode) in &decoders {
            let decoded = decode(&samples).expect("Failed to decode");
            assert_eq!(
                decoded, text,
                "{} detector: {} x {} round trip",
                name, mapping.key, mapping.presses
            );
        }
    }
}

#[test]
fn test_lowercase_decodes_uppercase() {
    let decoded = Decoder::goertzel().decode(&encode("hello world")).expect("Failed to decode");
    assert_eq!(decoded, "HELLO WORLD");
}

#[test]
fn test_unsupported_character_rejected() {
    let result = Encoder::new().encode("café");
    assert!(matches!(
        result,
        Err(DtmfError::UnsupportedCharacter { character: 'é', position: 3 })
    ));
}

#[test]
fn test_round_trip_with_noise() {
    let text = "HELLO WORLD";
    for (name, decode) in decoders() {
        let mut samples = encode(text);
        add_noise(&mut samples, 0.02, 11);
        let decoded = decode(&samples).expect("Failed to decode");
        assert_eq!(decoded, text, "{} detector failed with noise", name);
    }
}

#[test]
fn test_alphabet_with_noise() {
    let mut samples = encode(ALPHABET);
    add_noise(&mut samples, 0.02, 3);
    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, ALPHABET);
}

#[test]
fn test_stronger_noise() {
    let text = "HELLO";
    for std_dev in [0.05, 0.1] {
        let mut samples = encode(text);
        add_noise(&mut samples, std_dev, 7);
        let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
        assert_eq!(decoded, text, "Noise std dev {}", std_dev);
    }
}

#[test]
fn test_attenuated_signal() {
    let samples: Vec<f32> = encode("HELLO").iter().map(|s| s * 0.2).collect();
    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, "HELLO");
}

#[test]
fn test_mild_distortion() {
    let samples: Vec<f32> = encode("HELLO").iter().map(|s| s.signum() * s.abs().powf(0.9)).collect();
    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, "HELLO");
}

#[test]
fn test_leading_offsets() {
    let text = "SZ9,*";
    let decoder = Decoder::goertzel();
    for offset in [0, 551, 1102, 1653, 2100] {
        let mut samples = vec![0.0; offset];
        samples.extend(encode(text));
        let decoded = decoder.decode(&samples).expect("Failed to decode");
        assert_eq!(decoded, text, "Leading offset of {} samples", offset);
    }
}

#[test]
fn test_leading_and_trailing_silence() {
    let mut samples = vec![0.0; 1000];
    samples.extend(encode("HELLO"));
    samples.extend(vec![0.0; 20000]);
    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, "HELLO");
}

#[test]
fn test_non_overlapping_windows_on_aligned_signal() {
    let goertzel = Decoder::with_detector(GoertzelDetector::new(), DecoderConfig::non_overlapping())
        .expect("Failed to create decoder");
    let spectral = Decoder::with_detector(SpectralDetector::new(), DecoderConfig::non_overlapping())
        .expect("Failed to create decoder");

    for text in ["HELLO WORLD", "SZ9,*", "1234567890#"] {
        let samples = encode(text);
        assert_eq!(goertzel.decode(&samples).expect("Failed to decode"), text);
    }
    assert_eq!(spectral.decode(&encode("HI")).expect("Failed to decode"), "HI");
}

#[test]
fn test_truncated_final_tone() {
    // Last press cut to 150 ms, still long enough to confirm
    for text in ["HI", "S", "AZ", "0 "] {
        let mut samples = encode(text);
        samples.truncate(samples.len() - REPEAT_GAP_SAMPLES);
        for (name, decode) in decoders() {
            let decoded = decode(&samples).expect("Failed to decode");
            assert_eq!(decoded, text, "{} detector flushing truncated {:?}", name, text);
        }
    }
}

#[test]
fn test_short_blip_in_pause_is_ignored() {
    let table = ToneTable::global();
    let blip_len = 660;
    let blip = &table.key_tone(Key::new(9).expect("Invalid key"))[..blip_len];

    let mut samples = encode("A");
    samples.extend(vec![0.0; 4000]);
    samples.extend_from_slice(blip);
    samples.extend(vec![0.0; SYMBOL_PAUSE_SAMPLES - 4000 - blip_len]);
    samples.extend(encode("B"));

    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, "AB");
}

#[test]
fn test_unmapped_press_count() {
    // Key 1 pressed twice has no symbol
    let tone = ToneTable::global().key_tone(Key::new(1).expect("Invalid key"));
    let mut samples = tone.to_vec();
    samples.extend(vec![0.0; REPEAT_GAP_SAMPLES]);
    samples.extend_from_slice(tone);

    let decoded = Decoder::goertzel().decode(&samples).expect("Failed to decode");
    assert_eq!(decoded, UNKNOWN_SYMBOL.to_string());
}

#[test]
fn test_pure_noise_decodes_to_nothing() {
    for std_dev in [0.01, 0.1] {
        let mut samples = vec![0.0; 44100];
        add_noise(&mut samples, std_dev, 5);
        for (name, decode) in decoders() {
            let decoded = decode(&samples).expect("Failed to decode");
            assert_eq!(decoded, "", "{} detector on noise std dev {}", name, std_dev);
        }
    }
}

#[test]
fn test_insufficient_data() {
    let decoder = Decoder::spectral();
    assert!(matches!(decoder.decode(&[]), Err(DtmfError::InsufficientData { .. })));
    assert!(matches!(
        decoder.decode(&vec![0.5; WINDOW_SAMPLES / 2]),
        Err(DtmfError::InsufficientData { .. })
    ));
}

#[test]
fn test_tone_table_is_shared() {
    let first = ToneTable::global() as *const ToneTable;
    let second = ToneTable::global() as *const ToneTable;
    assert_eq!(first, second);

    // A locally built table encodes identically
    let local = ToneTable::build();
    let local_samples = Encoder::with_table(&local).encode("HI").expect("Failed to encode");
    assert_eq!(local_samples, encode("HI"));
}
