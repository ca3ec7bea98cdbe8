use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::Config;
use crate::error::Result;
use crate::overlay::DebugOverlay;
use crate::preprocess::Preprocessor;
use crate::scanner::FaceScanner;
use crate::types::Detection;

/// Preprocessor and scanner wired together for whole images.
///
/// ```no_run
/// use dollsearch::DollSearch;
///
/// let search = DollSearch::default();
/// let detection = search.scan_path("face.jpg")?;
/// if detection.is_face() {
///     println!("potential doll face found");
/// }
/// # Ok::<(), dollsearch::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DollSearch {
    preprocessor: Preprocessor,
    scanner: FaceScanner,
}

impl DollSearch {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            preprocessor: Preprocessor::new(config.preprocess)?,
            scanner: FaceScanner::new(config.scan)?,
        })
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn scanner(&self) -> &FaceScanner {
        &self.scanner
    }

    /// Load, binarize and scan an image file.
    pub fn scan_path<P: AsRef<Path>>(&self, path: P) -> Result<Detection> {
        let path = path.as_ref();
        tracing::info!("Scanning {}", path.display());
        let grid = self.preprocessor.load(path)?;
        let detection = self.scanner.scan(&grid)?;
        log_outcome(path, &detection);
        Ok(detection)
    }

    /// Like [`scan_path`](Self::scan_path), also rendering the scan for debugging.
    pub fn scan_path_with_overlay<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(Detection, DebugOverlay)> {
        let path = path.as_ref();
        tracing::info!("Scanning {} with overlay", path.display());
        let grid = self.preprocessor.load(path)?;
        let mut overlay = DebugOverlay::from_grid(&grid, self.scanner.config().dark_threshold);
        let detection = self.scanner.scan_with_observer(&grid, &mut overlay)?;
        log_outcome(path, &detection);
        Ok((detection, overlay))
    }

    /// Binarize and scan an already decoded image.
    pub fn scan_image(&self, image: &DynamicImage) -> Result<Detection> {
        let grid = self.preprocessor.process(image)?;
        self.scanner.scan(&grid)
    }
}

fn log_outcome(path: &Path, detection: &Detection) {
    match &detection.face {
        Some(face) => tracing::info!(
            "{}: potential doll face found (mouth at {}, {})",
            path.display(),
            face.mouth.x,
            face.mouth.y
        ),
        None => tracing::info!("{}: could not find doll face", path.display()),
    }
}

/// Where the debug overlay for `image` goes: `scanned_<name>` beside it,
/// or inside `dir` when given.
pub fn overlay_path_for(image: &Path, dir: Option<&Path>) -> PathBuf {
    let name = image
        .file_name()
        .map(|n| format!("scanned_{}", n.to_string_lossy()))
        .unwrap_or_else(|| "scanned.png".to_string());
    let parent = dir.or_else(|| image.parent()).unwrap_or_else(|| Path::new(""));
    parent.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PreprocessConfig, ScanConfig};
    use crate::error::Error;

    #[test]
    fn overlay_path_sits_beside_image() {
        assert_eq!(
            overlay_path_for(Path::new("test/images/face.jpg"), None),
            PathBuf::from("test/images/scanned_face.jpg")
        );
        assert_eq!(
            overlay_path_for(Path::new("face.jpg"), None),
            PathBuf::from("scanned_face.jpg")
        );
        assert_eq!(
            overlay_path_for(Path::new("test/images/face.jpg"), Some(Path::new("out"))),
            PathBuf::from("out/scanned_face.jpg")
        );
    }

    #[test]
    fn mismatched_grid_sizes_are_rejected() {
        let config = Config {
            scan: ScanConfig::default(),
            preprocess: PreprocessConfig {
                grid_size: 40,
                ..PreprocessConfig::default()
            },
        };
        assert!(matches!(DollSearch::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_never_reaches_scanner() {
        let err = DollSearch::default()
            .scan_path("no/such/dir/face.jpg")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn blank_image_has_no_face() {
        let image = DynamicImage::new_rgb8(120, 120);
        let detection = DollSearch::default().scan_image(&image).unwrap();
        assert!(!detection.is_face());
    }
}
