use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::CliError;

/// Mono samples and the sample rate declared in the file header
pub struct Audio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Write mono 16-bit PCM, clamping samples to [-1.0, 1.0]
pub fn write_mono_i16(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CliError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| CliError::wav(path, e))?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * 32767.0) as i16)
            .map_err(|e| CliError::wav(path, e))?;
    }
    writer.finalize().map_err(|e| CliError::wav(path, e))?;
    Ok(())
}

/// Read integer or 32-bit float PCM, averaging channels down to mono
pub fn read_mono(path: &Path) -> Result<Audio, CliError> {
    let mut reader = WavReader::open(path).map_err(|e| CliError::wav(path, e))?;
    let spec = reader.spec();
    log::info!(
        "Read WAV: {} Hz, {} channels, {} bits {:?}",
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(|e| CliError::wav(path, e))?,
        (SampleFormat::Int, bits @ (8 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| CliError::wav(path, e))?
        }
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| CliError::wav(path, e))?,
        (format, bits) => {
            return Err(CliError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format!("{:?} {}-bit", format, bits),
            })
        }
    };

    Ok(Audio {
        samples: mix_to_mono(interleaved, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

fn mix_to_mono(interleaved: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    log::warn!("Averaging {} channels down to mono", channels);
    interleaved
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
