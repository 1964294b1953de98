//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, malformed blend maps, density file loading, missing
//! intersection data, IO, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown wave type '{0}'")]
    UnknownWaveType(String),

    #[error("unknown noise generator '{0}'")]
    UnknownNoiseGenerator(String),

    #[error("invalid blend map: {0}")]
    BlendMap(String),

    #[error("pattern expects {expected} blend map entries, found {found}")]
    BlendMapEntryCount { expected: usize, found: usize },

    #[error("missing blend map for {0} pigment")]
    MissingBlendMap(&'static str),

    #[error("invalid density file size: {size_x}x{size_y}x{size_z} voxels do not fit {payload} payload bytes")]
    DensityFileSize {
        size_x: usize,
        size_y: usize,
        size_z: usize,
        payload: usize,
    },

    #[error("uv mapped pigment evaluated without uv coordinates")]
    MissingUv,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
