//! Image loading and binarization into scanner-ready intensity grids.
//!
//! The pipeline is: decode, convert to 16-bit luma, stretch contrast to the
//! full range, shrink to the grid size, then cut at a fixed fraction of
//! full scale so every pixel is either black or white.
//!
//! The contrast stretch ignores the darkest 2% and brightest 1% of pixels,
//! so a few outliers cannot flatten the rest of the image.

use std::fs;
use std::path::Path;

use image::{imageops, DynamicImage, ImageBuffer, Luma};

use crate::config::PreprocessConfig;
use crate::error::{Error, Result};
use crate::grid::{IntensityGrid, FULL_SCALE};

type Luma16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Load an image file and turn it into an intensity grid.
    ///
    /// The format is detected from the file contents, not its extension.
    /// Returns [`Error::InvalidInput`] when `path` does not exist or cannot
    /// be read and [`Error::InvalidImage`] when it cannot be decoded.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<IntensityGrid> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            tracing::debug!("Cannot read {}: {}", path.display(), e);
            Error::InvalidInput(path.to_path_buf())
        })?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| Error::InvalidImage(format!("{}: {}", path.display(), e)))?;
        self.process(&image)
    }

    /// Decode an in-memory image (any format the `image` crate recognizes).
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<IntensityGrid> {
        let image =
            image::load_from_memory(bytes).map_err(|e| Error::InvalidImage(e.to_string()))?;
        self.process(&image)
    }

    pub fn process(&self, image: &DynamicImage) -> Result<IntensityGrid> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::InvalidImage("image dimensions are zero".into()));
        }

        let mut luma = image.to_luma16();
        if self.config.normalize {
            stretch_contrast(&mut luma);
        }

        let size = self.config.grid_size;
        let luma = if luma.dimensions() == (size, size) {
            luma
        } else {
            imageops::resize(&luma, size, size, self.config.filter.into())
        };

        let cut = self.config.threshold_ratio * f32::from(FULL_SCALE);
        let data = luma
            .into_raw()
            .into_iter()
            .map(|v| if f32::from(v) > cut { FULL_SCALE } else { 0 })
            .collect();
        IntensityGrid::new(data, size, size)
    }
}

/// Share of pixels clipped to black before stretching.
const BLACK_CLIP: f64 = 0.02;

/// Share of pixels clipped to white before stretching.
const WHITE_CLIP: f64 = 0.01;

/// Linearly map the black point to 0 and the white point to full scale.
///
/// The black point is the lowest level with more than 2% of pixels at or
/// below it, the white point the highest level with more than 1% at or
/// above it. Levels outside the two points saturate.
fn stretch_contrast(luma: &mut Luma16Image) {
    let mut histogram = vec![0u32; usize::from(u16::MAX) + 1];
    for p in luma.pixels() {
        histogram[usize::from(p.0[0])] += 1;
    }
    let total = f64::from(luma.width()) * f64::from(luma.height());

    let mut count = 0.0;
    let mut black = 0;
    for (level, &n) in histogram.iter().enumerate() {
        count += f64::from(n);
        if count > total * BLACK_CLIP {
            black = level;
            break;
        }
    }

    let mut count = 0.0;
    let mut white = histogram.len() - 1;
    for (level, &n) in histogram.iter().enumerate().rev() {
        count += f64::from(n);
        if count > total * WHITE_CLIP {
            white = level;
            break;
        }
    }

    if white <= black {
        return;
    }

    let (black, white) = (black as u32, white as u32);
    let range = white - black;
    for p in luma.pixels_mut() {
        let v = u32::from(p.0[0]);
        p.0[0] = if v <= black {
            0
        } else if v >= white {
            FULL_SCALE
        } else {
            ((v - black) * u32::from(FULL_SCALE) / range) as u16
        };
    }
}
