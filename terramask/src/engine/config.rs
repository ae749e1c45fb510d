//! Engine configuration.

use std::time::Duration;

/// Default mask grid edge length; full grids are `256 * 256` bytes.
pub const DEFAULT_TILE_SIZE: usize = 256;

/// Configuration for the update engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of worker threads (default: available parallelism).
    pub threads: usize,
    /// Mask grid edge length in pixels (default: 256).
    pub tile_size: usize,
    /// Cadence of progress emissions while a batch runs (default: 500 ms).
    pub progress_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            tile_size: DEFAULT_TILE_SIZE,
            progress_interval: Duration::from_millis(500),
        }
    }
}

impl EngineConfig {
    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the mask grid edge length.
    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the progress emission cadence.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
