mod error;
mod wav;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use taptone_core::{
    Decoder, DecoderConfig, Encoder, GoertzelDetector, SpectralDetector, ToneDetector, SAMPLE_RATE,
};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "taptone")]
#[command(about = "Encode text as multi-tap DTMF audio and decode it back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a text file to a WAV audio file
    Encode {
        /// Input text file
        #[arg(value_name = "INPUT.TXT")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Decode a WAV audio file to text
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Also write the decoded text here
        #[arg(value_name = "OUTPUT.TXT")]
        output: Option<PathBuf>,

        /// Tone detector
        #[arg(short, long, value_enum, default_value_t = DetectorKind::Goertzel)]
        detector: DetectorKind,

        /// Analysis window layout
        #[arg(short, long, value_enum, default_value_t = Windowing::Overlapping)]
        windowing: Windowing,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DetectorKind {
    /// Goertzel resonators, combined magnitude threshold
    Goertzel,
    /// Goertzel with a check that both tones are present and balanced
    GoertzelStrict,
    /// Zero-padded FFT
    Spectral,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Windowing {
    /// Half-overlapping windows, tolerant of any start offset
    Overlapping,
    /// Back-to-back windows, for signals that start on a window boundary
    NonOverlapping,
}

impl Windowing {
    fn config(self) -> DecoderConfig {
        match self {
            Windowing::Overlapping => DecoderConfig::overlapping(),
            Windowing::NonOverlapping => DecoderConfig::non_overlapping(),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { input, output } => encode_command(&input, &output),
        Commands::Decode {
            input,
            output,
            detector,
            windowing,
        } => decode_command(&input, output.as_deref(), detector, windowing),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn encode_command(input_path: &Path, output_path: &Path) -> Result<(), CliError> {
    let content = std::fs::read_to_string(input_path).map_err(|e| CliError::io(input_path, e))?;
    let text = strip_line_terminator(&content);
    println!("Read {} characters from {}", text.chars().count(), input_path.display());

    let encoder = Encoder::new();
    let samples = encoder.encode(text)?;
    println!(
        "Encoded to {} audio samples ({} ms)",
        samples.len(),
        encoder.duration_ms(text)?
    );

    wav::write_mono_i16(output_path, &samples, SAMPLE_RATE as u32)?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

fn decode_command(
    input_path: &Path,
    output_path: Option<&Path>,
    detector: DetectorKind,
    windowing: Windowing,
) -> Result<(), CliError> {
    let audio = wav::read_mono(input_path)?;
    if audio.sample_rate != SAMPLE_RATE as u32 {
        log::warn!(
            "Input sample rate is {} Hz, expected {} Hz; decoding without resampling",
            audio.sample_rate,
            SAMPLE_RATE
        );
    }

    let config = windowing.config();
    log::info!("Decoding {} samples with {:?} / {:?}", audio.samples.len(), detector, windowing);

    let text = match detector {
        DetectorKind::Goertzel => run_decoder(GoertzelDetector::new(), config, &audio.samples)?,
        DetectorKind::GoertzelStrict => run_decoder(GoertzelDetector::strict(), config, &audio.samples)?,
        DetectorKind::Spectral => run_decoder(SpectralDetector::new(), config, &audio.samples)?,
    };

    println!("{}", text);

    if let Some(path) = output_path {
        std::fs::write(path, &text).map_err(|e| CliError::io(path, e))?;
        log::info!("Wrote {} characters to {}", text.chars().count(), path.display());
    }

    Ok(())
}

fn run_decoder<D: ToneDetector>(detector: D, config: DecoderConfig, samples: &[f32]) -> Result<String, CliError> {
    let decoder = Decoder::with_detector(detector, config)?;
    Ok(decoder.decode(samples)?)
}

/// Drop a single trailing "\n" or "\r\n"
fn strip_line_terminator(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => text,
    }
}
