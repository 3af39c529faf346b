use std::path::PathBuf;

use taptone_core::DtmfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Codec(#[from] DtmfError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{}: unsupported WAV format ({format})", path.display())]
    UnsupportedFormat { path: PathBuf, format: String },
}

impl CliError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn wav(path: &std::path::Path, source: hound::Error) -> Self {
        Self::Wav {
            path: path.to_path_buf(),
            source,
        }
    }
}
