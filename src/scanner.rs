//! Row scanner that looks for the eye / glabella / eye / mouth pattern.
//!
//! ## Algorithm
//!
//! Rows are visited top to bottom and each row left to right. Within a row
//! a [`ScanState`] counts:
//!
//! 1. a dark run taken as the left eye (only while no light run is open),
//! 2. a light run taken as the glabella,
//! 3. dark pixels following an accepted glabella, taken as the right eye.
//!
//! On a dark pixel the left eye and glabella are tested together. If they
//! pass, the pixel extends the right eye and the right eye is tested; a
//! passing right eye projects a mouth pixel below the glabella which must
//! also be dark. The first pixel that completes the chain ends the scan.
//! A dark pixel that fails the left eye / glabella test closes the open
//! glabella run without touching either eye count.

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::grid::IntensityAccess;
use crate::types::{Detection, FaceMatch, Point};

/// What happened at a scanned pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A dark pixel was visited.
    DarkPixel,
    /// A light pixel was visited.
    LightPixel,
    /// A dark pixel was counted towards the right eye.
    RightEye,
    /// The projected mouth pixel was dark and the face accepted.
    Mouth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEvent {
    pub point: Point,
    pub kind: EventKind,
}

impl ScanEvent {
    pub const fn new(point: Point, kind: EventKind) -> Self {
        Self { point, kind }
    }
}

/// Receives scan events in visiting order. Observers cannot affect the result.
pub trait ScanObserver {
    fn on_event(&mut self, event: ScanEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_event(&mut self, _event: ScanEvent) {}
}

impl<F: FnMut(ScanEvent)> ScanObserver for F {
    fn on_event(&mut self, event: ScanEvent) {
        self(event)
    }
}

/// Run lengths collected along the current row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub left_eye_width: u32,
    pub glabella_width: u32,
    pub glabella_start: Point,
    pub right_eye_width: u32,
}

impl ScanState {
    /// Count a light pixel towards the glabella run, opening it if needed.
    pub fn extend_glabella(mut self, at: Point) -> Self {
        if self.glabella_width == 0 {
            self.glabella_start = at;
        }
        self.glabella_width += 1;
        self
    }
}

/// Left eye width lies in `[min_eye_width, max_eye_width)`.
pub fn try_accept_left_eye(state: &ScanState, config: &ScanConfig) -> bool {
    state.left_eye_width >= config.min_eye_width && state.left_eye_width < config.max_eye_width
}

/// Glabella is wider than the left eye but narrower than twice its width.
pub fn try_accept_glabella(state: &ScanState) -> bool {
    state.glabella_width > state.left_eye_width
        && state.glabella_width < state.left_eye_width * 2
}

/// Right eye is at least the minimum width and no wider than the left eye.
pub fn try_accept_right_eye(state: &ScanState, config: &ScanConfig) -> bool {
    state.right_eye_width >= config.min_eye_width
        && state.right_eye_width < state.left_eye_width + 1
}

/// Where the mouth should be for the measured geometry.
///
/// Horizontally centered on the glabella; vertically `mouth_ratio` times
/// the glabella row plus all three run widths, rounded half away from zero.
pub fn project_mouth(state: &ScanState, config: &ScanConfig) -> Point {
    let x = state.glabella_start.x + state.glabella_width / 2;
    let span = state.glabella_start.y
        + state.left_eye_width
        + state.glabella_width
        + state.right_eye_width;
    let y = (f64::from(span) * config.mouth_ratio).round() as u32;
    Point::new(x, y)
}

/// The mouth pixel, if it is dark.
///
/// A projection past the grid samples the nearest edge pixel instead, and
/// the returned point is the pixel actually sampled.
pub fn try_accept_mouth<I: IntensityAccess + ?Sized>(
    grid: &I,
    state: &ScanState,
    config: &ScanConfig,
) -> Option<Point> {
    let projected = project_mouth(state, config);
    let mouth = Point::new(
        projected.x.min(grid.width().saturating_sub(1)),
        projected.y.min(grid.height().saturating_sub(1)),
    );
    is_dark(grid, mouth, config).then_some(mouth)
}

#[inline]
fn is_dark<I: IntensityAccess + ?Sized>(grid: &I, at: Point, config: &ScanConfig) -> bool {
    grid.intensity(at.x, at.y)
        .is_some_and(|value| value <= config.dark_threshold)
}

enum Step {
    Continue(ScanState),
    Matched(FaceMatch),
}

/// Doll face detector over fixed-size intensity grids.
///
/// # Usage
///
/// ```
/// use dollsearch::{FaceScanner, IntensityGrid};
///
/// let scanner = FaceScanner::default();
/// let grid = IntensityGrid::filled(50, 50, u16::MAX);
/// let detection = scanner.scan(&grid).unwrap();
/// assert!(!detection.is_face());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FaceScanner {
    config: ScanConfig,
}

impl FaceScanner {
    /// Create a scanner, rejecting inconsistent settings.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan a grid for a doll face.
    ///
    /// Fails only when the grid is not `grid_size` square; a grid without a
    /// face is an `Ok` detection with no match.
    pub fn scan<I: IntensityAccess + ?Sized>(&self, grid: &I) -> Result<Detection> {
        self.scan_with_observer(grid, &mut NoopObserver)
    }

    /// Like [`scan`](Self::scan), reporting every visited pixel to `observer`.
    pub fn scan_with_observer<I, O>(&self, grid: &I, observer: &mut O) -> Result<Detection>
    where
        I: IntensityAccess + ?Sized,
        O: ScanObserver + ?Sized,
    {
        let cfg = &self.config;
        if grid.width() != cfg.grid_size || grid.height() != cfg.grid_size {
            return Err(Error::GridSize {
                width: grid.width(),
                height: grid.height(),
                expected: cfg.grid_size,
            });
        }

        for y in cfg.first_row..=cfg.last_row {
            let mut state = ScanState::default();
            for x in cfg.first_column..=cfg.last_column {
                match self.visit(grid, state, Point::new(x, y), observer) {
                    Step::Continue(next) => state = next,
                    Step::Matched(face) => {
                        tracing::debug!(
                            left_eye = face.left_eye_width,
                            glabella = face.glabella_width,
                            right_eye = face.right_eye_width,
                            mouth_x = face.mouth.x,
                            mouth_y = face.mouth.y,
                            "doll face pattern matched"
                        );
                        return Ok(Detection::found(face));
                    }
                }
            }
        }

        tracing::debug!("no doll face pattern in grid");
        Ok(Detection::none())
    }

    fn visit<I, O>(&self, grid: &I, mut state: ScanState, at: Point, observer: &mut O) -> Step
    where
        I: IntensityAccess + ?Sized,
        O: ScanObserver + ?Sized,
    {
        let cfg = &self.config;

        if !is_dark(grid, at, cfg) {
            observer.on_event(ScanEvent::new(at, EventKind::LightPixel));
            return Step::Continue(state.extend_glabella(at));
        }

        if state.glabella_width < 1 {
            state.left_eye_width += 1;
        }
        observer.on_event(ScanEvent::new(at, EventKind::DarkPixel));

        if !(try_accept_left_eye(&state, cfg) && try_accept_glabella(&state)) {
            state.glabella_width = 0;
            return Step::Continue(state);
        }

        // The right eye count is not reset on rejection: later dark pixels on
        // this row keep adding to it while the glabella test still holds.
        state.right_eye_width += 1;
        observer.on_event(ScanEvent::new(at, EventKind::RightEye));

        if !try_accept_right_eye(&state, cfg) {
            return Step::Continue(state);
        }

        match try_accept_mouth(grid, &state, cfg) {
            Some(mouth) => {
                observer.on_event(ScanEvent::new(mouth, EventKind::Mouth));
                Step::Matched(FaceMatch {
                    left_eye_width: state.left_eye_width,
                    glabella_width: state.glabella_width,
                    right_eye_width: state.right_eye_width,
                    glabella_start: state.glabella_start,
                    mouth,
                    accepted_at: at,
                })
            }
            None => {
                tracing::trace!(x = at.x, y = at.y, "mouth pixel not dark");
                Step::Continue(state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{IntensityGrid, FULL_SCALE};

    const ROW: u32 = 10;

    fn blank() -> IntensityGrid {
        IntensityGrid::filled(50, 50, FULL_SCALE)
    }

    /// Eye, gap, eye starting at column 1 of `ROW`, plus a dark pixel where
    /// the mouth is projected once the right eye reaches the minimum width.
    fn face_grid(left: u32, glabella: u32, right: u32) -> IntensityGrid {
        let mut grid = blank();
        let mut x = 1;
        for _ in 0..left {
            grid.set(x, ROW, 0);
            x += 1;
        }
        let glabella_start = Point::new(x, ROW);
        x += glabella;
        for _ in 0..right {
            grid.set(x, ROW, 0);
            x += 1;
        }

        let state = ScanState {
            left_eye_width: left,
            glabella_width: glabella,
            glabella_start,
            right_eye_width: right.min(4),
        };
        let mouth = project_mouth(&state, &ScanConfig::default());
        grid.set(mouth.x, mouth.y, 0);
        grid
    }

    #[test]
    fn all_light_grid_has_no_face() {
        let detection = FaceScanner::default().scan(&blank()).unwrap();
        assert!(!detection.is_face());
    }

    #[test]
    fn all_dark_grid_has_no_face() {
        let grid = IntensityGrid::filled(50, 50, 0);
        let detection = FaceScanner::default().scan(&grid).unwrap();
        assert!(!detection.is_face());
    }

    #[test]
    fn threshold_is_inclusive() {
        let cfg = ScanConfig::default();
        let grid = IntensityGrid::from_fn(50, 50, |x, _| if x == 0 { 35_000 } else { 35_001 });
        assert!(is_dark(&grid, Point::new(0, 3), &cfg));
        assert!(!is_dark(&grid, Point::new(1, 3), &cfg));
        assert!(!is_dark(&grid, Point::new(60, 3), &cfg));
    }

    #[test]
    fn minimal_face_matches() {
        let detection = FaceScanner::default().scan(&face_grid(4, 7, 4)).unwrap();
        let face = detection.face.expect("face should match");

        assert_eq!(face.left_eye_width, 4);
        assert_eq!(face.glabella_width, 7);
        assert_eq!(face.right_eye_width, 4);
        assert_eq!(face.glabella_start, Point::new(5, ROW));
        // x = 5 + 7 / 2, y = round((10 + 4 + 7 + 4) * 0.7) = round(17.5)
        assert_eq!(face.mouth, Point::new(8, 18));
        assert_eq!(face.accepted_at, Point::new(15, ROW));
    }

    #[test]
    fn missing_mouth_rejects_face() {
        let mut grid = face_grid(4, 7, 4);
        grid.set(8, 18, FULL_SCALE);
        assert!(!FaceScanner::default().scan(&grid).unwrap().is_face());
    }

    #[test]
    fn widths_outside_bounds_reject_face() {
        let scanner = FaceScanner::default();
        // Left eye too narrow
        assert!(!scanner.scan(&face_grid(3, 5, 3)).unwrap().is_face());
        // Glabella not wider than the left eye
        assert!(!scanner.scan(&face_grid(4, 4, 4)).unwrap().is_face());
        // Glabella twice the left eye
        assert!(!scanner.scan(&face_grid(4, 8, 4)).unwrap().is_face());
        // Right eye too narrow
        assert!(!scanner.scan(&face_grid(4, 7, 3)).unwrap().is_face());
        // Left eye at the exclusive maximum
        assert!(!scanner.scan(&face_grid(17, 20, 4)).unwrap().is_face());
    }

    #[test]
    fn widest_left_eye_matches() {
        let face = FaceScanner::default()
            .scan(&face_grid(16, 20, 4))
            .unwrap()
            .face
            .expect("face should match");
        assert_eq!(face.left_eye_width, 16);
        assert_eq!(face.glabella_width, 20);
    }

    #[test]
    fn leading_light_run_swallows_first_eye_pixel() {
        // Columns 1-2 light open a glabella, so the dark pixel at column 3
        // only closes it; the left eye is counted from column 4.
        let mut grid = blank();
        for x in 3..=7 {
            grid.set(x, ROW, 0);
        }
        for x in 15..=18 {
            grid.set(x, ROW, 0);
        }
        // round((10 + 4 + 7 + 4) * 0.7) = 18, x = 8 + 7 / 2
        grid.set(11, 18, 0);

        let face = FaceScanner::default()
            .scan(&grid)
            .unwrap()
            .face
            .expect("face should match");
        assert_eq!(face.left_eye_width, 4);
        assert_eq!(face.glabella_start, Point::new(8, ROW));
        assert_eq!(face.accepted_at, Point::new(18, ROW));
    }

    #[test]
    fn right_eye_count_survives_light_pixels() {
        // Left eye 1-5, glabella 6-11, then dark 12-13, light 14, dark 15-16.
        // The light pixel widens the glabella to 7 while the right eye keeps
        // its count of 2, reaching 4 at column 16.
        let mut grid = blank();
        for x in (1..=5).chain(12..=13).chain(15..=16) {
            grid.set(x, ROW, 0);
        }
        // x = 6 + 7 / 2, y = round((10 + 5 + 7 + 4) * 0.7)
        grid.set(9, 18, 0);

        let face = FaceScanner::default()
            .scan(&grid)
            .unwrap()
            .face
            .expect("face should match");
        assert_eq!(face.left_eye_width, 5);
        assert_eq!(face.glabella_width, 7);
        assert_eq!(face.right_eye_width, 4);
        assert_eq!(face.accepted_at, Point::new(16, ROW));
    }

    #[test]
    fn state_resets_between_rows() {
        // Left eye and glabella on one row, right eye at the start of the next.
        let mut grid = blank();
        for x in 1..=4 {
            grid.set(x, ROW, 0);
        }
        for x in 1..=4 {
            grid.set(x, ROW + 1, 0);
        }
        assert!(!FaceScanner::default().scan(&grid).unwrap().is_face());
    }

    #[test]
    fn mouth_past_grid_samples_edge() {
        let cfg = ScanConfig::default();
        let state = ScanState {
            left_eye_width: 16,
            glabella_width: 20,
            glabella_start: Point::new(17, 40),
            right_eye_width: 4,
        };
        assert_eq!(project_mouth(&state, &cfg), Point::new(27, 56));

        let mut grid = blank();
        assert_eq!(try_accept_mouth(&grid, &state, &cfg), None);

        grid.set(27, 49, 0);
        assert_eq!(
            try_accept_mouth(&grid, &state, &cfg),
            Some(Point::new(27, 49))
        );
    }

    #[test]
    fn predicates() {
        let cfg = ScanConfig::default();
        let mut state = ScanState {
            left_eye_width: 5,
            glabella_width: 9,
            ..ScanState::default()
        };
        assert!(try_accept_left_eye(&state, &cfg));
        assert!(try_accept_glabella(&state));

        state.glabella_width = 10;
        assert!(!try_accept_glabella(&state));

        state.right_eye_width = 5;
        assert!(try_accept_right_eye(&state, &cfg));
        state.right_eye_width = 6;
        assert!(!try_accept_right_eye(&state, &cfg));
    }

    #[test]
    fn wrong_grid_size_is_an_error() {
        let grid = IntensityGrid::filled(49, 49, FULL_SCALE);
        let err = FaceScanner::default().scan(&grid).unwrap_err();
        assert!(matches!(
            err,
            Error::GridSize {
                width: 49,
                height: 49,
                expected: 50
            }
        ));

        let grid = IntensityGrid::filled(50, 40, FULL_SCALE);
        assert!(FaceScanner::default().scan(&grid).is_err());
    }

    #[test]
    fn wrong_grid_size_visits_nothing() {
        let mut events = Vec::new();
        let grid = IntensityGrid::filled(10, 10, 0);
        let _ = FaceScanner::default()
            .scan_with_observer(&grid, &mut |e: ScanEvent| events.push(e));
        assert!(events.is_empty());
    }

    #[test]
    fn scanning_is_idempotent() {
        let scanner = FaceScanner::default();
        let grid = face_grid(5, 7, 5);
        let first = scanner.scan(&grid).unwrap();
        let second = scanner.scan(&grid).unwrap();
        assert!(first.is_face());
        assert_eq!(first, second);
    }

    #[test]
    fn scan_stops_at_first_match() {
        let mut events = Vec::new();
        let detection = FaceScanner::default()
            .scan_with_observer(&face_grid(4, 7, 4), &mut |e: ScanEvent| events.push(e))
            .unwrap();
        let face = detection.face.expect("face should match");

        let (last, visited) = events.split_last().unwrap();
        assert_eq!(*last, ScanEvent::new(face.mouth, EventKind::Mouth));

        let order = |p: Point| (p.y, p.x);
        assert!(visited
            .iter()
            .all(|e| order(e.point) <= order(face.accepted_at)));

        // 9 light rows of 48 columns, 15 pixels of row 10, 4 right eye pixels.
        assert_eq!(visited.len(), 9 * 48 + 15 + 4);
        let right_eye: Vec<_> = visited
            .iter()
            .filter(|e| e.kind == EventKind::RightEye)
            .map(|e| e.point.x)
            .collect();
        assert_eq!(right_eye, vec![12, 13, 14, 15]);
    }

    #[test]
    fn margins_are_not_scanned() {
        let mut events = Vec::new();
        FaceScanner::default()
            .scan_with_observer(&blank(), &mut |e: ScanEvent| events.push(e))
            .unwrap();
        assert_eq!(events.len(), 46 * 48);
        assert!(events
            .iter()
            .all(|e| (1..=48).contains(&e.point.x) && (1..=46).contains(&e.point.y)));
    }

    #[test]
    fn custom_config_changes_geometry() {
        let cfg = ScanConfig {
            min_eye_width: 3,
            ..ScanConfig::default()
        };
        let scanner = FaceScanner::new(cfg.clone()).unwrap();

        // Left 3, glabella 5, right 3: only valid with the lowered minimum.
        let mut grid = blank();
        for x in (1..=3).chain(9..=11) {
            grid.set(x, ROW, 0);
        }
        let state = ScanState {
            left_eye_width: 3,
            glabella_width: 5,
            glabella_start: Point::new(4, ROW),
            right_eye_width: 3,
        };
        let mouth = project_mouth(&state, &cfg);
        grid.set(mouth.x, mouth.y, 0);

        assert!(scanner.scan(&grid).unwrap().is_face());
        assert!(!FaceScanner::default().scan(&grid).unwrap().is_face());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ScanConfig {
            min_eye_width: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(FaceScanner::new(cfg), Err(Error::InvalidConfig(_))));
    }
}
