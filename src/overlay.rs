//! Debug rendering of a scan.
//!
//! [`DebugOverlay`] starts as a black and white copy of the scanned grid
//! and, as a [`ScanObserver`], paints each reported pixel:
//!
//! | event        | color   |
//! |--------------|---------|
//! | dark pixel   | purple  |
//! | light pixel  | `#eee`  |
//! | right eye    | blue    |
//! | mouth        | red     |

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::grid::IntensityAccess;
use crate::scanner::{EventKind, ScanEvent, ScanObserver};

pub const DARK_PIXEL: Rgb<u8> = Rgb([128, 0, 128]);
pub const LIGHT_PIXEL: Rgb<u8> = Rgb([0xee, 0xee, 0xee]);
pub const RIGHT_EYE: Rgb<u8> = Rgb([0, 0, 255]);
pub const MOUTH: Rgb<u8> = Rgb([255, 0, 0]);

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

pub fn event_color(kind: EventKind) -> Rgb<u8> {
    match kind {
        EventKind::DarkPixel => DARK_PIXEL,
        EventKind::LightPixel => LIGHT_PIXEL,
        EventKind::RightEye => RIGHT_EYE,
        EventKind::Mouth => MOUTH,
    }
}

#[derive(Debug, Clone)]
pub struct DebugOverlay {
    image: RgbImage,
}

impl DebugOverlay {
    /// Render `grid` in black and white, splitting at `dark_threshold`.
    pub fn from_grid<I: IntensityAccess + ?Sized>(grid: &I, dark_threshold: u16) -> Self {
        let image = RgbImage::from_fn(grid.width(), grid.height(), |x, y| {
            match grid.intensity(x, y) {
                Some(v) if v <= dark_threshold => BLACK,
                _ => WHITE,
            }
        });
        Self { image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Write the overlay; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path).map_err(Error::ImageWrite)
    }
}

impl ScanObserver for DebugOverlay {
    fn on_event(&mut self, event: ScanEvent) {
        let (w, h) = self.image.dimensions();
        if event.point.x < w && event.point.y < h {
            self.image
                .put_pixel(event.point.x, event.point.y, event_color(event.kind));
        }
    }
}
