use thiserror::Error;

#[derive(Debug, Error)]
pub enum DtmfError {
    #[error("Unsupported character {character:?} at position {position}")]
    UnsupportedCharacter { character: char, position: usize },

    #[error("Empty message, nothing to encode")]
    EmptyMessage,

    #[error("Could not allocate a buffer of {samples} samples")]
    Allocation { samples: usize },

    #[error("Insufficient data: {samples} samples, at least {required} required")]
    InsufficientData { samples: usize, required: usize },

    #[error("FFT error: {0}")]
    FftError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DtmfError>;
