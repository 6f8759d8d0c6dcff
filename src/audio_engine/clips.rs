//! Clip lookup and playback requests on the control side.
//!
//! [`ClipBank`] is the seam between the widget and whatever actually plays audio. The engine
//! implementation, [`EngineClips`], forwards requests over the control ring to the audio thread
//! and remembers which pads have a published clip.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rtrb::Producer;

use crate::audio_engine::constants::NUM_PADS;
use crate::audio_engine::errors::PlaybackError;
use crate::messages::{ControlMessage, SampleBuffer};
use crate::pads;

/// Resolves and drives the audio clip bound to each trigger key.
pub trait ClipBank: Send + Sync {
    /// Returns the clip slot bound to `key` if a clip is ready to play.
    fn locate(&self, key: char) -> Option<usize>;

    /// Moves the clip's playback cursor back to its first frame.
    fn rewind(&self, id: usize) -> Result<(), PlaybackError>;

    /// Requests playback from the current cursor. Delivery does not wait for the audio thread.
    fn play(&self, id: usize) -> Result<(), PlaybackError>;
}

/// [`ClipBank`] backed by the real-time engine.
pub struct EngineClips {
    producer: Mutex<Option<Producer<ControlMessage>>>,
    loaded: [AtomicBool; NUM_PADS],
}

impl Default for EngineClips {
    fn default() -> Self {
        Self {
            producer: Mutex::new(None),
            loaded: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }
}

impl EngineClips {
    /// Connects the bank to a freshly started audio thread.
    pub(crate) fn attach(&self, producer: Producer<ControlMessage>) {
        self.forget_all();
        if let Ok(mut guard) = self.producer.lock() {
            *guard = Some(producer);
        }
    }

    /// Disconnects the bank; every clip becomes unavailable.
    pub(crate) fn detach(&self) {
        self.forget_all();
        if let Ok(mut guard) = self.producer.lock() {
            *guard = None;
        }
    }

    pub fn is_running(&self) -> bool {
        self.producer
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn is_loaded(&self, id: usize) -> bool {
        self.loaded
            .get(id)
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    /// Hands a decoded clip to the audio thread and marks it playable.
    pub(crate) fn publish(&self, id: usize, sample: SampleBuffer) -> Result<(), PlaybackError> {
        self.send(ControlMessage::LoadClip { id, sample })?;
        if let Some(flag) = self.loaded.get(id) {
            flag.store(true, Ordering::Release);
        }
        Ok(())
    }

    pub(crate) fn unload(&self, id: usize) -> Result<(), PlaybackError> {
        if let Some(flag) = self.loaded.get(id) {
            flag.store(false, Ordering::Release);
        }
        self.send(ControlMessage::UnloadClip { id })
    }

    pub(crate) fn send(&self, message: ControlMessage) -> Result<(), PlaybackError> {
        let mut guard = self
            .producer
            .lock()
            .map_err(|_| PlaybackError::EngineStopped)?;
        let producer = guard.as_mut().ok_or(PlaybackError::EngineStopped)?;
        producer.push(message).map_err(|_| PlaybackError::QueueFull)
    }

    fn forget_all(&self) {
        for flag in &self.loaded {
            flag.store(false, Ordering::Release);
        }
    }
}

impl ClipBank for EngineClips {
    fn locate(&self, key: char) -> Option<usize> {
        let id = pads::find_by_char(key)?.index();
        self.is_loaded(id).then_some(id)
    }

    fn rewind(&self, id: usize) -> Result<(), PlaybackError> {
        self.send(ControlMessage::RewindClip { id })
    }

    fn play(&self, id: usize) -> Result<(), PlaybackError> {
        self.send(ControlMessage::PlayClip { id })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rtrb::RingBuffer;

    use super::*;

    fn clip() -> SampleBuffer {
        SampleBuffer {
            channels: 2,
            samples: Arc::from(vec![0.0; 8].into_boxed_slice()),
        }
    }

    #[test]
    fn test_requests_fail_while_detached() {
        let clips = EngineClips::default();

        assert!(!clips.is_running());
        assert_eq!(clips.play(0), Err(PlaybackError::EngineStopped));
        assert_eq!(clips.rewind(0), Err(PlaybackError::EngineStopped));
        assert!(clips.publish(0, clip()).is_err());
        assert!(clips.locate('Q').is_none());
    }

    #[test]
    fn test_publish_makes_clip_locatable() {
        let clips = EngineClips::default();
        let (producer, mut consumer) = RingBuffer::new(8);
        clips.attach(producer);

        clips.publish(6, clip()).unwrap();

        assert_eq!(clips.locate('z'), Some(6));
        assert_eq!(clips.locate('Q'), None);
        assert!(matches!(
            consumer.pop(),
            Ok(ControlMessage::LoadClip { id: 6, .. })
        ));
    }

    #[test]
    fn test_rewind_then_play_are_queued_in_order() {
        let clips = EngineClips::default();
        let (producer, mut consumer) = RingBuffer::new(8);
        clips.attach(producer);

        clips.rewind(3).unwrap();
        clips.play(3).unwrap();

        assert!(matches!(consumer.pop(), Ok(ControlMessage::RewindClip { id: 3 })));
        assert!(matches!(consumer.pop(), Ok(ControlMessage::PlayClip { id: 3 })));
    }

    #[test]
    fn test_full_queue_rejects_play() {
        let clips = EngineClips::default();
        let (producer, _consumer) = RingBuffer::new(1);
        clips.attach(producer);

        clips.play(0).unwrap();

        assert_eq!(clips.play(0), Err(PlaybackError::QueueFull));
    }

    #[test]
    fn test_detach_forgets_clips() {
        let clips = EngineClips::default();
        let (producer, _consumer) = RingBuffer::new(8);
        clips.attach(producer);
        clips.publish(0, clip()).unwrap();

        clips.detach();

        assert!(!clips.is_loaded(0));
        assert!(clips.locate('Q').is_none());
    }

    #[test]
    fn test_unload_marks_clip_unavailable() {
        let clips = EngineClips::default();
        let (producer, mut consumer) = RingBuffer::new(8);
        clips.attach(producer);
        clips.publish(1, clip()).unwrap();
        let _ = consumer.pop();

        clips.unload(1).unwrap();

        assert!(clips.locate('W').is_none());
        assert!(matches!(consumer.pop(), Ok(ControlMessage::UnloadClip { id: 1 })));
    }
}
