//! # dollsearch
//!
//! Heuristic detection of stylized doll faces in small monochrome bitmaps.
//!
//! This crate provides:
//! - **Preprocessing**: decode any image, stretch its contrast, shrink it to
//!   a 50x50 grid and binarize it
//! - **Scanning**: a fixed-geometry rule engine that looks for two eyes, the
//!   gap between them and a mouth in the expected proportions
//! - **Diagnostics**: an observer hook and a debug overlay showing what the
//!   scanner looked at
//!
//! ## Algorithm Overview
//!
//! 1. Visit rows 1..=46, and in each row columns 1..=48, left to right
//! 2. Count a dark run (left eye), then a light run (glabella)
//! 3. When a dark pixel follows a glabella wider than the left eye but
//!    narrower than twice its width, count it towards the right eye
//! 4. Once the right eye is at least 4 pixels and no wider than the left,
//!    project a mouth pixel below the glabella
//! 5. A dark mouth pixel ends the scan with a match
//!
//! ## Quick Start
//!
//! ```rust
//! use dollsearch::{FaceScanner, IntensityGrid};
//!
//! // Left eye at columns 1-4, glabella 5-11, right eye 12-15 on row 10.
//! let mut grid = IntensityGrid::filled(50, 50, u16::MAX);
//! for x in (1..=4).chain(12..=15) {
//!     grid.set(x, 10, 0);
//! }
//! // Mouth: x = 5 + 7 / 2, y = round((10 + 4 + 7 + 4) * 0.7)
//! grid.set(8, 18, 0);
//!
//! let detection = FaceScanner::default().scan(&grid).unwrap();
//! assert!(detection.is_face());
//! ```
//!
//! ## Custom Grid Types
//!
//! Implement [`IntensityAccess`] to scan your own pixel storage:
//!
//! ```rust
//! use dollsearch::IntensityAccess;
//!
//! struct Checkerboard;
//!
//! impl IntensityAccess for Checkerboard {
//!     fn intensity(&self, x: u32, y: u32) -> Option<u16> {
//!         if x >= 50 || y >= 50 {
//!             return None;
//!         }
//!         Some(if (x + y) % 2 == 0 { 0 } else { u16::MAX })
//!     }
//!     fn width(&self) -> u32 { 50 }
//!     fn height(&self) -> u32 { 50 }
//! }
//! ```

mod config;
mod error;
mod grid;
pub mod overlay;
mod preprocess;
pub mod scanner;
mod search;
mod types;

pub use config::{Config, PreprocessConfig, ResizeFilter, ScanConfig};
pub use error::{Error, Result};
pub use grid::{IntensityAccess, IntensityGrid, FULL_SCALE};
pub use overlay::DebugOverlay;
pub use preprocess::Preprocessor;
pub use scanner::{EventKind, FaceScanner, NoopObserver, ScanEvent, ScanObserver, ScanState};
pub use search::{overlay_path_for, DollSearch};
pub use types::{Detection, FaceMatch, Point};
