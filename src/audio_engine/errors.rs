//! Error types for triggering pads and loading clips.

use thiserror::Error;

/// Reasons a trigger is dropped before it reaches the display.
///
/// Neither variant is ever surfaced to the user; event handlers discard them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// The key or element does not name any pad.
    #[error("no pad is bound to {0:?}")]
    UnrecognizedKey(String),

    /// The pad exists but its clip is not loaded (or the engine is not running).
    #[error("clip for pad {0} is not available")]
    ResourceUnavailable(char),
}

/// Errors returned when a rewind or play request cannot be delivered to the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The output stream is not running.
    #[error("audio engine is not running")]
    EngineStopped,

    /// The control ring buffer is full.
    #[error("control queue is full")]
    QueueFull,
}

/// Errors that can occur while loading audio files.
#[derive(Debug, Error)]
pub enum SampleLoadError {
    /// Failed to open the audio file.
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the audio file.
    #[error("failed to decode audio file: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// Failed to create resampler.
    #[error("failed to create resampler: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),

    /// Failed to resample audio.
    #[error("failed to resample audio: {0}")]
    Resample(#[from] rubato::ResampleError),

    /// Audio file has no default track.
    #[error("audio file has no default track")]
    NoDefaultTrack,

    /// Audio file is missing sample rate information.
    #[error("audio file is missing a sample rate")]
    MissingSampleRate,

    /// Audio file is missing channel information.
    #[error("audio file is missing channel information")]
    MissingChannels,

    /// Unsupported channel mapping configuration.
    #[error(
        "unsupported channel mapping: file has {file_channels} channels, output has {output_channels} channels (only mono↔stereo supported)"
    )]
    UnsupportedChannels {
        /// Number of channels in the source file.
        file_channels: usize,
        /// Number of channels expected for output.
        output_channels: usize,
    },
}

/// Errors returned by [`AudioEngine`](crate::audio_engine::AudioEngine) control methods.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run` was called on an engine that is already running.
    #[error("audio engine already running")]
    AlreadyRunning,

    /// The method needs a running output stream.
    #[error("audio engine not initialized")]
    NotRunning,

    /// The output stream could not be created or started.
    #[error("failed to start audio stream: {0}")]
    Stream(String),

    /// The given key does not name a pad.
    #[error("no pad is bound to {0:?}")]
    UnknownPad(String),

    /// A control message could not be delivered.
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// A lock guarding engine state was poisoned.
    #[error("failed to acquire {0} lock")]
    Lock(&'static str),
}
