//! Drum machine configuration constants and limits.

use std::time::Duration;

/// Size of the pad grid (GRID_SIZE x GRID_SIZE).
pub const GRID_SIZE: usize = 3;

/// Total number of pads in the grid, one clip slot each.
pub const NUM_PADS: usize = GRID_SIZE.pow(2);

/// How long a pad shows its active state after being triggered.
pub const ACTIVE_WINDOW: Duration = Duration::from_millis(120);

/// Output buffer size requested from the audio device, in frames.
pub const OUTPUT_BUFFER_FRAMES: u32 = 512;

/// Capacity of each ring buffer between the control side and the audio thread.
pub const RING_CAPACITY: usize = 1024;

/// Input chunk size, in frames, fed to the resampler.
pub const RESAMPLE_CHUNK_FRAMES: usize = 1024;

/// Minimum interval between two throttled loader progress events.
pub const PROGRESS_MIN_INTERVAL: Duration = Duration::from_millis(100);
