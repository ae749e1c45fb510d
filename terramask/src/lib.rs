//! Terramask - watermask editing for quantized-mesh terrain tile trees
//!
//! This library locates, reads, re-derives, smooths, and rewrites the
//! per-tile water-coverage mask stored as an extension block inside
//! quantized-mesh terrain tiles, then propagates the update downward
//! through all higher-detail descendant tiles of the quadtree.
//!
//! # High-Level API
//!
//! ```ignore
//! use terramask::canvas::Canvas;
//! use terramask::engine::{Engine, EngineConfig, ModifyRequest};
//! use terramask::projector::CoverMode;
//!
//! let canvas = Canvas::new(256, 256, segmentation_bytes)?;
//! let request = ModifyRequest {
//!     root: "/terrain".into(),
//!     lod: 18,
//!     bottom_left: (100, 200),
//!     offset: (0, 0),
//!     ortho_width: 256,
//!     cover: CoverMode::Replace,
//!     recursive: true,
//! };
//!
//! let engine = Engine::new(EngineConfig::default());
//! let report = engine.modify(&canvas, &request)?;
//! println!("{} tiles committed", report.committed.len());
//! ```

pub mod canvas;
pub mod coord;
pub mod engine;
pub mod logging;
pub mod projector;
pub mod propagate;
pub mod smooth;
pub mod terrain;

/// Version of the terramask library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
