//! Message definitions for communication between the control side and the audio thread.
//!
//! This module defines the enums that serve as the wire format for messages passed through the
//! ring buffers between the UI thread and the real-time audio thread, plus the events emitted by
//! background clip loaders.

use pyo3::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub(crate) struct SampleBuffer {
    pub channels: usize,
    pub samples: Arc<[f32]>,
}

impl SampleBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels
    }
}

/// Message that is emitted from the audio thread.
#[derive(Debug, Clone, PartialEq)]
#[pyclass]
pub enum AudioMessage {
    /// Response to a Ping message.
    Pong(),

    /// A play request reached the audio thread but the pad has no clip.
    PlayRejected { id: usize },

    /// A clip played through to its last frame.
    ClipEnded { id: usize },
}

#[pymethods]
impl AudioMessage {
    pub fn play_rejected(&self) -> Option<usize> {
        match self {
            AudioMessage::PlayRejected { id } => Some(*id),
            _ => None,
        }
    }

    pub fn clip_ended(&self) -> Option<usize> {
        match self {
            AudioMessage::ClipEnded { id } => Some(*id),
            _ => None,
        }
    }
}

/// Message that is emitted from the control side.
#[derive(Debug, Clone)]
pub enum ControlMessage {
    /// Used for testing message passing functionality.
    Ping(),

    /// Publish a decoded clip into a pad slot.
    ///
    /// # Parameters
    /// * `id` - Pad slot (0..9)
    /// * `sample` - Pre-decoded immutable sample buffer (shared handle)
    LoadClip { id: usize, sample: SampleBuffer },

    /// Move the pad's playback cursor back to the first frame.
    RewindClip { id: usize },

    /// Start playback of the pad's clip from its current cursor.
    PlayClip { id: usize },

    /// Silence every pad.
    StopAll(),

    /// Stop the pad and drop its clip.
    UnloadClip { id: usize },
}

/// Events emitted from background clip loaders.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    /// Loading started for the given pad slot.
    Started { id: usize },

    /// A progress update.
    ///
    /// - `percent` is the best-effort *total* progress across the load pipeline (0.0..=1.0).
    /// - `stage` is a human-readable stage string (e.g. "Loading (decoding)").
    Progress {
        id: usize,
        percent: f32,
        stage: String,
    },

    /// Loading completed and the clip was handed to the audio thread.
    Success { id: usize, duration_sec: f32 },

    /// Loading failed.
    Error { id: usize, error: String },
}
