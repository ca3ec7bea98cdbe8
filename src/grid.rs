use crate::error::{Error, Result};

/// Full-scale intensity value (white).
pub const FULL_SCALE: u16 = u16::MAX;

/// Trait for reading per-pixel intensities from a binarized grid.
///
/// Intensities are on a 16-bit scale, 0 (black) to 65535 (white).
pub trait IntensityAccess {
    /// Intensity at column `x`, row `y`. Returns `None` outside the grid.
    fn intensity(&self, x: u32, y: u32) -> Option<u16>;

    /// Grid dimensions.
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A row-major grid of 16-bit intensities implementing [`IntensityAccess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityGrid {
    data: Vec<u16>,
    width: u32,
    height: u32,
}

impl IntensityGrid {
    /// Wrap a row-major buffer. The buffer must hold exactly `width * height` values.
    pub fn new(data: Vec<u16>, width: u32, height: u32) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(Error::GridData {
                len: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> u16,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// A grid with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u16) -> Self {
        Self {
            data: vec![value; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Overwrite one pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: u16) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// Row-major view of the underlying buffer.
    pub fn as_raw(&self) -> &[u16] {
        &self.data
    }
}

impl IntensityAccess for IntensityGrid {
    fn intensity(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
