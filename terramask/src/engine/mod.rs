//! Update orchestration.
//!
//! One Modify request becomes zero-to-four-plus tile updates: the
//! viewport tiles that exist on disk each run Projector -> Smoother ->
//! Codec, then (unless disabled) the propagator walks their descendant
//! subtrees. Tiles are independent files, so the batch fans out over a
//! small worker pool and needs no locking beyond one atomic commit
//! counter.
//!
//! # Architecture
//!
//! ```text
//! ModifyRequest + Canvas
//!         │
//!         ▼
//! ┌──────────────────────────────────────────────┐
//! │ Engine::modify                               │
//! │  validate → enumerate viewport cells         │
//! │  ┌─────────────┐  work queue  ┌────────────┐ │
//! │  │ reporter    │◄─counter────►│ N workers  │ │
//! │  │ (interval)  │              │ project    │ │
//! │  └─────────────┘              │ smooth     │ │
//! │        │                      │ commit     │ │
//! │   ProgressSink                │ propagate  │ │
//! │                               └────────────┘ │
//! └──────────────────────────────────────────────┘
//!         │
//!         ▼
//!    ModifyReport (committed / skipped / failed)
//! ```

mod config;
mod error;
mod progress;
mod report;
mod request;

pub use config::{EngineConfig, DEFAULT_TILE_SIZE};
pub use error::EngineError;
pub use progress::{NoOpProgressSink, ProgressEvent, ProgressSink, SharedProgressSink};
pub use report::{ModifyReport, TileFailure};
pub use request::ModifyRequest;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::canvas::Canvas;
use crate::coord::TileCoord;
use crate::projector::project_tile;
use crate::propagate::propagate_subtree;
use crate::smooth::smooth;
use crate::terrain::{TerrainError, TileDocument, Watermask};

/// The watermask update engine.
///
/// Owns the batch configuration, the progress sink, and the
/// cancellation token shared with the host. One engine can run many
/// batches; each batch gets a fresh commit counter so overlapping
/// callers can never bleed progress into each other.
pub struct Engine {
    config: EngineConfig,
    sink: SharedProgressSink,
    cancel: CancellationToken,
}

impl Engine {
    /// Create an engine with the given configuration and no progress
    /// reporting.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sink: Arc::new(NoOpProgressSink),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a progress sink.
    pub fn with_progress_sink(mut self, sink: SharedProgressSink) -> Self {
        self.sink = sink;
        self
    }

    /// Token the host can use to cancel between tile boundaries.
    ///
    /// An in-flight tile rewrite always completes; cancellation takes
    /// effect before the next tile (or the next propagation step).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one Modify batch.
    ///
    /// # Errors
    ///
    /// Only request-level validation fails here; per-tile problems are
    /// isolated into the returned [`ModifyReport`].
    pub fn modify(
        &self,
        canvas: &Canvas,
        request: &ModifyRequest,
    ) -> Result<ModifyReport, EngineError> {
        let tile_size = self.config.tile_size;
        if tile_size == 0 || tile_size % 2 != 0 {
            return Err(EngineError::InvalidRequest(format!(
                "tile size {} must be a positive even number",
                tile_size
            )));
        }
        if request.ortho_width == 0 || request.ortho_width % tile_size != 0 {
            return Err(EngineError::InvalidRequest(format!(
                "ortho width {} is not a positive multiple of tile size {}",
                request.ortho_width, tile_size
            )));
        }
        if canvas.width() < request.ortho_width || canvas.height() < request.ortho_width {
            warn!(
                canvas_width = canvas.width(),
                canvas_height = canvas.height(),
                ortho_width = request.ortho_width,
                "canvas smaller than ortho width; edge pixels will repeat"
            );
        }

        let viewport_scale = request.ortho_width / tile_size;
        let mut cells = Vec::new();
        for j in 0..=viewport_scale as u32 {
            for i in 0..=viewport_scale as u32 {
                let tile = TileCoord::new(
                    request.lod,
                    request.bottom_left.0 + i,
                    request.bottom_left.1 + j,
                );
                cells.push((i, j, tile));
            }
        }

        info!(
            lod = request.lod,
            tiles = cells.len(),
            wet_pixels = canvas.wet_count(),
            cover = ?request.cover,
            recursive = request.recursive,
            "starting modify batch"
        );

        let counter = AtomicUsize::new(0);
        let worker_count = self.config.threads.max(1).min(cells.len());

        let (work_tx, work_rx) = mpsc::channel();
        for cell in cells {
            work_tx.send(cell).expect("receiver alive until workers start");
        }
        drop(work_tx);
        let work_rx = Mutex::new(work_rx);

        let mut report = ModifyReport::default();
        thread::scope(|scope| {
            let counter = &counter;
            let work_rx = &work_rx;

            // Reporter: emits the commit counter on a fixed cadence
            // until the batch signals completion by dropping the
            // channel sender.
            let (batch_done_tx, batch_done_rx) = mpsc::channel::<()>();
            let sink = &self.sink;
            let interval = self.config.progress_interval;
            scope.spawn(move || loop {
                match batch_done_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        sink.emit(ProgressEvent::Committed(counter.load(Ordering::SeqCst)));
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

            let (result_tx, result_rx) = mpsc::channel::<ModifyReport>();
            for _ in 0..worker_count {
                let result_tx = result_tx.clone();
                scope.spawn(move || loop {
                    let item = { work_rx.lock().expect("work queue lock").recv() };
                    let Ok((i, j, tile)) = item else { break };
                    let outcome = self.process_tile(canvas, request, (i, j), tile, counter);
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                });
            }
            drop(result_tx);

            for outcome in result_rx.iter() {
                report.merge(outcome);
            }
            drop(batch_done_tx);
        });

        report.cancelled = self.cancel.is_cancelled();

        // At least one progress emission precedes completion, even when
        // the batch beats the first reporter tick.
        self.sink
            .emit(ProgressEvent::Committed(counter.load(Ordering::SeqCst)));
        self.sink.emit(ProgressEvent::Completed {
            committed: report.committed.len(),
            skipped: report.skipped.len(),
            failed: report.failed.len(),
        });

        info!(
            committed = report.committed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "modify batch finished"
        );
        Ok(report)
    }

    /// Update one viewport tile and, when enabled, its subtree.
    fn process_tile(
        &self,
        canvas: &Canvas,
        request: &ModifyRequest,
        cell: (u32, u32),
        tile: TileCoord,
        counter: &AtomicUsize,
    ) -> ModifyReport {
        let mut outcome = ModifyReport::default();
        if self.cancel.is_cancelled() {
            return outcome;
        }

        let path = tile.path(&request.root);
        if !path.exists() {
            debug!(tile = %tile, "tile absent, skipping");
            outcome.skipped.push(tile);
            return outcome;
        }

        match self.update_viewport_tile(canvas, request, cell, &path) {
            Ok(smoothed) => {
                counter.fetch_add(1, Ordering::SeqCst);
                outcome.committed.push(tile);
                if request.recursive {
                    propagate_subtree(
                        &request.root,
                        tile,
                        &smoothed,
                        self.config.tile_size,
                        counter,
                        &self.cancel,
                        &mut outcome.committed,
                        &mut outcome.failed,
                    );
                }
            }
            Err(e) if e.is_not_found() => {
                // Deleted between the existence check and the read.
                outcome.skipped.push(tile);
            }
            Err(e) => {
                warn!(tile = %tile, error = %e, "tile update failed");
                outcome.failed.push(TileFailure {
                    tile,
                    reason: e.to_string(),
                });
            }
        }
        outcome
    }

    /// Projector -> Smoother -> Codec for one tile; returns the
    /// smoothed grid so propagation never depends on the (possibly
    /// compact) on-disk form.
    fn update_viewport_tile(
        &self,
        canvas: &Canvas,
        request: &ModifyRequest,
        cell: (u32, u32),
        path: &Path,
    ) -> Result<Vec<u8>, TerrainError> {
        let tile_size = self.config.tile_size;

        let mut document = read_with_retry(path, tile_size)?;
        let existing = document.mask_grid(tile_size);
        let projected = project_tile(
            canvas,
            &existing,
            cell,
            request.offset,
            request.ortho_width,
            tile_size,
            request.cover,
        );
        let smoothed = smooth(&projected, tile_size);

        document.set_watermask(Watermask::from_grid(smoothed.clone()));
        write_with_retry(&document, path)?;
        Ok(smoothed)
    }
}

/// Read a tile document, retrying once on transient I/O failure.
fn read_with_retry(path: &Path, tile_size: usize) -> Result<TileDocument, TerrainError> {
    match TileDocument::read(path, tile_size) {
        Err(TerrainError::Io(first)) if first.kind() != std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), error = %first, "tile read failed, retrying once");
            TileDocument::read(path, tile_size)
        }
        other => other,
    }
}

/// Write a tile document, retrying once on transient I/O failure.
fn write_with_retry(document: &TileDocument, path: &Path) -> Result<(), TerrainError> {
    match document.write(path) {
        Err(TerrainError::Io(first)) => {
            warn!(path = %path.display(), error = %first, "tile write failed, retrying once");
            document.write(path)
        }
        other => other,
    }
}
