//! Terramask CLI - Command-line interface
//!
//! This binary drives one watermask Modify batch from the command line:
//! it loads a segmentation mask image, optionally unions a manually
//! drawn polygon selection into it, and applies the result to the tile
//! tree, printing progress as tiles commit.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use terramask::canvas::Canvas;
use terramask::engine::{
    Engine, EngineConfig, ModifyRequest, ProgressEvent, ProgressSink,
};
use terramask::logging::{default_log_dir, default_log_file, init_logging};
use terramask::projector::CoverMode;

/// Exit code when some tiles failed to update.
const EXIT_TILES_FAILED: i32 = 1;
/// Exit code for invalid input (arguments, mask image, canvas).
const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Debug, Clone, ValueEnum)]
enum CoverArg {
    /// Only canvas-wet pixels overwrite; existing water is preserved
    Fill,
    /// The canvas wins unconditionally wherever it overlaps
    Replace,
}

impl From<&CoverArg> for CoverMode {
    fn from(arg: &CoverArg) -> Self {
        match arg {
            CoverArg::Fill => CoverMode::Fill,
            CoverArg::Replace => CoverMode::Replace,
        }
    }
}

#[derive(Parser)]
#[command(name = "terramask")]
#[command(about = "Apply a water segmentation mask to a terrain tile tree", long_about = None)]
struct Args {
    /// Terrain tree root directory (contains <lod>/<x>/<y>.terrain)
    #[arg(long)]
    root: PathBuf,

    /// Level of detail of the viewport tiles
    #[arg(long)]
    lod: u8,

    /// X coordinate of the viewport's bottom-left tile
    #[arg(long)]
    x: u32,

    /// Y coordinate of the viewport's bottom-left tile
    #[arg(long)]
    y: u32,

    /// Segmentation mask image (luma > 127 counts as water)
    #[arg(long)]
    mask: PathBuf,

    /// Manual selection polygon as "x1,y1 x2,y2 ...", ORed into the mask
    #[arg(long)]
    select: Option<String>,

    /// Canvas origin X displacement in viewport pixels
    #[arg(long, default_value = "0")]
    offset_x: i32,

    /// Canvas origin Y displacement in viewport pixels
    #[arg(long, default_value = "0")]
    offset_y: i32,

    /// Canvas coverage width in pixels (multiple of tile size)
    #[arg(long, default_value = "256")]
    ortho_width: usize,

    /// Mask grid edge length per tile
    #[arg(long, default_value = "256")]
    tile_size: usize,

    /// Conflict policy against previously stored mask values
    #[arg(long, value_enum, default_value = "replace")]
    cover: CoverArg,

    /// Update the viewport tiles only, without descendant propagation
    #[arg(long)]
    no_recursive: bool,

    /// Number of worker threads (0 = available parallelism)
    #[arg(long, default_value = "0")]
    threads: usize,
}

/// Prints commit progress as it arrives.
struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Committed(count) => {
                println!("tiles committed: {}", count);
            }
            ProgressEvent::Completed {
                committed,
                skipped,
                failed,
            } => {
                println!(
                    "done: {} committed, {} skipped, {} failed",
                    committed, skipped, failed
                );
            }
        }
    }
}

/// Parse "x1,y1 x2,y2 ..." into polygon vertices.
fn parse_polygon(raw: &str) -> Result<Vec<(f64, f64)>, String> {
    let mut vertices = Vec::new();
    for pair in raw.split_whitespace() {
        let (x, y) = pair
            .split_once(',')
            .ok_or_else(|| format!("vertex '{}' is not x,y", pair))?;
        let x: f64 = x.parse().map_err(|_| format!("bad X in '{}'", pair))?;
        let y: f64 = y.parse().map_err(|_| format!("bad Y in '{}'", pair))?;
        vertices.push((x, y));
    }
    if vertices.len() < 3 {
        return Err(format!("polygon needs at least 3 vertices, got {}", vertices.len()));
    }
    Ok(vertices)
}

fn main() {
    let args = Args::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            process::exit(EXIT_INVALID_INPUT);
        }
    };

    // Load the segmentation mask and threshold it to water/no-water.
    let mask_image = match image::open(&args.mask) {
        Ok(img) => img.into_luma8(),
        Err(e) => {
            eprintln!("Error loading mask image {}: {}", args.mask.display(), e);
            process::exit(EXIT_INVALID_INPUT);
        }
    };
    let (width, height) = mask_image.dimensions();
    let data: Vec<u8> = mask_image
        .pixels()
        .map(|p| (p.0[0] > 127) as u8)
        .collect();

    let mut canvas = match Canvas::new(width as usize, height as usize, data) {
        Ok(canvas) => canvas,
        Err(e) => {
            eprintln!("Error building canvas: {}", e);
            process::exit(EXIT_INVALID_INPUT);
        }
    };

    if let Some(raw) = &args.select {
        match parse_polygon(raw) {
            Ok(vertices) => canvas.or_polygon(&vertices),
            Err(e) => {
                eprintln!("Error parsing selection polygon: {}", e);
                process::exit(EXIT_INVALID_INPUT);
            }
        }
    }

    let request = ModifyRequest {
        root: args.root.clone(),
        lod: args.lod,
        bottom_left: (args.x, args.y),
        offset: (args.offset_x, args.offset_y),
        ortho_width: args.ortho_width,
        cover: (&args.cover).into(),
        recursive: !args.no_recursive,
    };

    let mut config = EngineConfig::default()
        .with_tile_size(args.tile_size)
        .with_progress_interval(Duration::from_millis(500));
    if args.threads > 0 {
        config = config.with_threads(args.threads);
    }

    println!(
        "Applying {}x{} mask to {} at lod {} tile ({}, {})",
        width,
        height,
        args.root.display(),
        args.lod,
        args.x,
        args.y
    );

    let engine = Engine::new(config).with_progress_sink(Arc::new(StdoutProgressSink));
    let report = match engine.modify(&canvas, &request) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_INVALID_INPUT);
        }
    };

    for failure in &report.failed {
        eprintln!("tile {} failed: {}", failure.tile, failure.reason);
    }
    tracing::info!(
        committed = report.committed.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "batch complete"
    );
    if !report.failed.is_empty() {
        process::exit(EXIT_TILES_FAILED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon_ok() {
        let vertices = parse_polygon("10,20 30.5,40 50,60.25").unwrap();
        assert_eq!(vertices, vec![(10.0, 20.0), (30.5, 40.0), (50.0, 60.25)]);
    }

    #[test]
    fn test_parse_polygon_rejects_malformed_vertex() {
        assert!(parse_polygon("10,20 30 50,60").is_err());
        assert!(parse_polygon("10,20 x,40 50,60").is_err());
    }

    #[test]
    fn test_parse_polygon_rejects_degenerate() {
        assert!(parse_polygon("10,20 30,40").is_err());
    }

    #[test]
    fn test_cover_arg_maps_to_mode() {
        assert_eq!(CoverMode::from(&CoverArg::Fill), CoverMode::Fill);
        assert_eq!(CoverMode::from(&CoverArg::Replace), CoverMode::Replace);
    }
}
