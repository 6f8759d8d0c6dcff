//! Audio Engine Module
//!
//! This module provides real-time clip playback for the pads.
//! It is organized into sub-modules, each with a specific responsibility:
//!
//! - [`audio_stream`]: CPAL audio stream management and real-time callback
//! - [`channels`]: Channel layout conversion
//! - [`clips`]: The [`ClipBank`] seam and its engine-backed implementation
//! - [`constants`]: Configuration constants and limits
//! - [`errors`]: Error types
//! - [`mixer`]: Real-time mixing engine
//! - [`progress`]: Throttled loader progress reporting
//! - [`sample_loader`]: Audio file loading and decoding
//! - [`voice_slot`]: Per-pad playback cursor
//!
//! The main [`AudioEngine`] struct orchestrates these components.

use crate::audio_engine::audio_stream::{AudioStreamHandle, create_audio_stream, start_stream};
use crate::audio_engine::progress::{LoadProgressStage, ProgressReporter};
use crate::audio_engine::sample_loader::{
    SampleLoadProgress, SampleLoadSubtask, decode_audio_file_to_sample_buffer_with_progress,
};
use crate::messages::{AudioMessage, ControlMessage, LoaderEvent};
use crate::pads;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    mpsc::{Receiver, Sender, TryRecvError},
};
use std::thread;

pub(crate) mod audio_stream;
pub(crate) mod channels;
pub(crate) mod clips;
pub(crate) mod constants;
pub(crate) mod errors;
pub(crate) mod mixer;
pub(crate) mod progress;
pub(crate) mod sample_loader;
pub(crate) mod voice_slot;

pub use clips::{ClipBank, EngineClips};
pub use errors::{EngineError, PlaybackError, SampleLoadError, TriggerError};

/// Owns the output stream, the clip bank and the background loader channel.
pub struct AudioEngine {
    stream_handle: Option<AudioStreamHandle>,
    clips: Arc<EngineClips>,
    loader_tx: Sender<LoaderEvent>,
    loader_rx: Mutex<Receiver<LoaderEvent>>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    pub fn new() -> Self {
        let (loader_tx, loader_rx) = std::sync::mpsc::channel();

        AudioEngine {
            stream_handle: None,
            clips: Arc::new(EngineClips::default()),
            loader_tx,
            loader_rx: Mutex::new(loader_rx),
        }
    }

    /// Shared handle to the clip bank, for the widget's trigger protocol.
    pub fn clips(&self) -> Arc<EngineClips> {
        Arc::clone(&self.clips)
    }

    pub fn is_running(&self) -> bool {
        self.stream_handle.is_some()
    }

    /// Open the default output device and start the audio thread.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.stream_handle.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let (handle, producer) =
            create_audio_stream().map_err(|e| EngineError::Stream(e.to_string()))?;
        start_stream(&handle.stream).map_err(|e| EngineError::Stream(e.to_string()))?;

        self.clips.attach(producer);
        self.stream_handle = Some(handle);
        Ok(())
    }

    /// Shut down the audio engine. Every loaded clip is dropped with the stream.
    pub fn shut_down(&mut self) {
        self.clips.detach();
        if self.stream_handle.take().is_some() {
            log::info!("Drum machine audio stopped");
        }
    }

    /// Decode `path` on a background thread and publish it as the clip of pad `key`.
    ///
    /// Progress and completion are reported through [`AudioEngine::poll_loader_event`].
    pub fn load_clip_async(&self, key: &str, path: PathBuf) -> Result<(), EngineError> {
        let pad = pads::find_by_key(key).ok_or_else(|| EngineError::UnknownPad(key.to_string()))?;
        let id = pad.index();

        let handle = self.stream_handle.as_ref().ok_or(EngineError::NotRunning)?;
        let output_channels = handle.output_channels;
        let output_sample_rate = handle.output_sample_rate;
        let loader_tx = self.loader_tx.clone();
        let clips = Arc::clone(&self.clips);

        thread::spawn(move || {
            let _ = loader_tx.send(LoaderEvent::Started { id });
            log::info!("Loading clip for pad {} from {}", pad.trigger_key, path.display());

            let mut progress = ProgressReporter::new(id, loader_tx.clone());

            let sample = match decode_audio_file_to_sample_buffer_with_progress(
                &path,
                output_channels,
                output_sample_rate,
                |update: SampleLoadProgress| {
                    let stage = match update.subtask {
                        SampleLoadSubtask::Decoding => LoadProgressStage::Decoding,
                        SampleLoadSubtask::Resampling => LoadProgressStage::Resampling,
                        SampleLoadSubtask::ChannelMapping => LoadProgressStage::ChannelMapping,
                    };
                    let force = update.percent <= 0.0 || update.percent >= 1.0;
                    progress.emit(stage, update.percent, update.resampling_required, force);
                },
            ) {
                Ok(sample) => sample,
                Err(SampleLoadError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                    log::warn!("Clip for pad {} not found: {}", pad.trigger_key, path.display());
                    let _ = loader_tx.send(LoaderEvent::Error {
                        id,
                        error: format!("File not found: {}", path.display()),
                    });
                    return;
                }
                Err(err) => {
                    log::warn!("Failed to load clip for pad {}: {err}", pad.trigger_key);
                    let _ = loader_tx.send(LoaderEvent::Error {
                        id,
                        error: err.to_string(),
                    });
                    return;
                }
            };

            let resampling_required = progress.resampling_required.unwrap_or(false);
            progress.emit(LoadProgressStage::Publishing, 0.0, resampling_required, true);

            let duration_sec = sample.frames() as f32 / output_sample_rate as f32;

            if let Err(err) = clips.publish(id, sample) {
                let _ = loader_tx.send(LoaderEvent::Error {
                    id,
                    error: format!("Failed to publish clip: {err}"),
                });
                return;
            }

            progress.emit(LoadProgressStage::Publishing, 1.0, resampling_required, true);
            log::info!("Clip for pad {} ready ({duration_sec:.2}s)", pad.trigger_key);
            let _ = loader_tx.send(LoaderEvent::Success { id, duration_sec });
        });

        Ok(())
    }

    /// Poll for a pending background loader event.
    ///
    /// Returns `None` when no events are available.
    pub fn poll_loader_event(&self) -> Result<Option<LoaderEvent>, EngineError> {
        let loader_rx = self
            .loader_rx
            .lock()
            .map_err(|_| EngineError::Lock("loader receiver"))?;

        match loader_rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(None),
        }
    }

    /// Stop playback on every pad.
    pub fn stop_all(&self) -> Result<(), EngineError> {
        self.running()?;
        Ok(self.clips.send(ControlMessage::StopAll())?)
    }

    /// Stop the pad bound to `key` and drop its clip.
    pub fn unload_clip(&self, key: &str) -> Result<(), EngineError> {
        let pad = pads::find_by_key(key).ok_or_else(|| EngineError::UnknownPad(key.to_string()))?;
        self.running()?;
        Ok(self.clips.unload(pad.index())?)
    }

    /// Send a ping message to the audio thread.
    pub fn ping(&self) -> Result<(), EngineError> {
        self.running()?;
        Ok(self.clips.send(ControlMessage::Ping())?)
    }

    /// Receive a message from the audio thread.
    pub fn receive_msg(&self) -> Result<Option<AudioMessage>, EngineError> {
        let handle = self.running()?;
        let mut consumer = handle
            .consumer
            .lock()
            .map_err(|_| EngineError::Lock("consumer"))?;

        Ok(consumer.pop().ok())
    }

    fn running(&self) -> Result<&AudioStreamHandle, EngineError> {
        self.stream_handle.as_ref().ok_or(EngineError::NotRunning)
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shut_down();
    }
}
