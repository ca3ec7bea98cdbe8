//! CLI application for doll face detection.
//!
//! Usage:
//!   dollsearch <image>...                   # Human-readable output
//!   dollsearch <image>... --json            # JSON output
//!   dollsearch <image> --overlay            # Also write scanned_<image>

use clap::Parser;
use dollsearch::{overlay_path_for, Config, Detection, DollSearch};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dollsearch")]
#[command(author, version, about = "Stylized doll face detection", long_about = None)]
struct Args {
    /// Input image files
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// JSON config file overriding scan and preprocessing settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a debug overlay of each scan as scanned_<name>
    #[arg(long)]
    overlay: bool,

    /// Directory for debug overlays (default: next to each image)
    #[arg(long, requires = "overlay")]
    overlay_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct ImageOutput {
    image: String,
    face_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detection: Option<Detection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Scan every image. Returns `false` if any image failed.
fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };
    let search = DollSearch::new(config)?;

    let outputs: Vec<ImageOutput> = args
        .images
        .iter()
        .map(|image| scan_one(&search, image, args))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        print!("{}", format_human_readable(&outputs, args.images.len() > 1));
    }

    Ok(outputs.iter().all(|o| o.error.is_none()))
}

fn scan_one(search: &DollSearch, image: &Path, args: &Args) -> ImageOutput {
    let mut output = ImageOutput {
        image: image.display().to_string(),
        face_found: false,
        detection: None,
        overlay: None,
        error: None,
    };

    let result = if args.overlay {
        search
            .scan_path_with_overlay(image)
            .and_then(|(detection, overlay)| {
                let path = overlay_path_for(image, args.overlay_dir.as_deref());
                overlay.save(&path)?;
                tracing::debug!("Overlay written to {}", path.display());
                output.overlay = Some(path.display().to_string());
                Ok(detection)
            })
    } else {
        search.scan_path(image)
    };

    match result {
        Ok(detection) => {
            output.face_found = detection.is_face();
            output.detection = Some(detection);
        }
        Err(e) => {
            eprintln!("Error: {}: {}", image.display(), e);
            output.error = Some(e.to_string());
        }
    }
    output
}

fn format_human_readable(outputs: &[ImageOutput], show_names: bool) -> String {
    let mut s = String::new();

    for output in outputs {
        if output.error.is_some() {
            continue;
        }
        if show_names {
            s.push_str(&format!("{}: ", output.image));
        }
        if output.face_found {
            s.push_str("potential doll face found\n");
        } else {
            s.push_str("could not find doll face\n");
        }

        if let Some(face) = output.detection.and_then(|d| d.face) {
            s.push_str(&format!("  left eye {}\n", face.left_eye_width));
            s.push_str(&format!("  glabella {}\n", face.glabella_width));
            s.push_str(&format!("  right eye {}\n", face.right_eye_width));
            s.push_str(&format!("  mouth {}, {}\n", face.mouth.x, face.mouth.y));
        }
        if let Some(ref path) = output.overlay {
            s.push_str(&format!("  overlay {}\n", path));
        }
    }

    s
}
