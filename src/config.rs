//! Scanner and preprocessor settings.
//!
//! Defaults reproduce the fixed geometry the detector was tuned for: a
//! 50x50 grid, eyes between 4 and 16 pixels wide, and a dark threshold
//! of 35000 on a 16-bit scale. Settings can be loaded from a JSON file
//! where every field is optional.

use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Geometry and thresholds used by [`crate::FaceScanner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Width and height the scanned grid must have.
    pub grid_size: u32,

    /// Pixels at or below this intensity are dark.
    pub dark_threshold: u16,

    /// Smallest accepted eye run (inclusive).
    pub min_eye_width: u32,

    /// Largest accepted left eye run (exclusive).
    pub max_eye_width: u32,

    /// First and last scanned row (inclusive).
    pub first_row: u32,
    pub last_row: u32,

    /// First and last scanned column (inclusive).
    pub first_column: u32,
    pub last_column: u32,

    /// Vertical projection factor for the mouth pixel.
    pub mouth_ratio: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            dark_threshold: 35_000,
            min_eye_width: 4,
            max_eye_width: 17,
            first_row: 1,
            last_row: 46,
            first_column: 1,
            last_column: 48,
            mouth_ratio: 0.7,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::InvalidConfig("grid_size must be > 0".into()));
        }
        if self.min_eye_width == 0 || self.min_eye_width >= self.max_eye_width {
            return Err(Error::InvalidConfig(format!(
                "eye width range [{}, {}) is empty",
                self.min_eye_width, self.max_eye_width
            )));
        }
        if self.first_row > self.last_row || self.last_row >= self.grid_size {
            return Err(Error::InvalidConfig(format!(
                "rows {}..={} do not fit a {} pixel grid",
                self.first_row, self.last_row, self.grid_size
            )));
        }
        if self.first_column > self.last_column || self.last_column >= self.grid_size {
            return Err(Error::InvalidConfig(format!(
                "columns {}..={} do not fit a {} pixel grid",
                self.first_column, self.last_column, self.grid_size
            )));
        }
        if !(self.mouth_ratio.is_finite() && self.mouth_ratio > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "mouth_ratio must be positive, got {}",
                self.mouth_ratio
            )));
        }
        Ok(())
    }
}

/// Resampling filter used when shrinking the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Settings for [`crate::Preprocessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Output grid width and height.
    pub grid_size: u32,

    /// Binarization cut as a fraction of full scale. Brighter pixels become white.
    pub threshold_ratio: f32,

    /// Stretch the luma range to full scale before resizing.
    pub normalize: bool,

    pub filter: ResizeFilter,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            threshold_ratio: 0.55,
            normalize: true,
            filter: ResizeFilter::default(),
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::InvalidConfig("grid_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold_ratio) {
            return Err(Error::InvalidConfig(format!(
                "threshold_ratio must be between 0.0 and 1.0, got {}",
                self.threshold_ratio
            )));
        }
        Ok(())
    }
}

/// Combined configuration, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub preprocess: PreprocessConfig,
}

impl Config {
    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        self.preprocess.validate()?;
        if self.scan.grid_size != self.preprocess.grid_size {
            return Err(Error::InvalidConfig(format!(
                "preprocessor produces {0}x{0} grids but scanner expects {1}x{1}",
                self.preprocess.grid_size, self.scan.grid_size
            )));
        }
        Ok(())
    }
}
