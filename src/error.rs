use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0} does not exist or is not a file")]
    InvalidInput(PathBuf),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Grid is {width}x{height}, scanner expects {expected}x{expected}")]
    GridSize {
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error("Grid buffer holds {len} values, expected {width}x{height}")]
    GridData { len: usize, width: u32, height: u32 },

    #[error("Failed to write image: {0}")]
    ImageWrite(image::ImageError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
