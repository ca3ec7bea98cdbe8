use serde::{Deserialize, Serialize};

/// A pixel coordinate in grid space (0-based column `x`, row `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Geometry measured along the row where a face was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Dark run taken as the left eye.
    pub left_eye_width: u32,

    /// Light run between the eyes.
    pub glabella_width: u32,

    /// Dark run taken as the right eye.
    pub right_eye_width: u32,

    /// First pixel of the glabella run.
    pub glabella_start: Point,

    /// Projected mouth pixel, confirmed dark.
    pub mouth: Point,

    /// Pixel being visited when the match was accepted.
    pub accepted_at: Point,
}

/// Outcome of a single scan. `face` is `None` when no face was found.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    pub face: Option<FaceMatch>,
}

impl Detection {
    pub const fn none() -> Self {
        Self { face: None }
    }

    pub const fn found(face: FaceMatch) -> Self {
        Self { face: Some(face) }
    }

    pub fn is_face(&self) -> bool {
        self.face.is_some()
    }
}

impl From<Option<FaceMatch>> for Detection {
    fn from(face: Option<FaceMatch>) -> Self {
        Self { face }
    }
}
