//! Per-pad playback state on the audio thread.
//!
//! Each pad owns exactly one [`VoiceSlot`]. It behaves like a media element: the clip has a
//! single playback cursor, rewinding moves the cursor back to the first frame, and playing an
//! ended clip starts it over.

use crate::messages::SampleBuffer;

#[derive(Debug, Default)]
pub struct VoiceSlot {
    pub sample: Option<SampleBuffer>,
    pub frame_pos: usize,
    pub playing: bool,
}

impl VoiceSlot {
    pub fn load(&mut self, sample: SampleBuffer) {
        self.sample = Some(sample);
        self.frame_pos = 0;
        self.playing = false;
    }

    pub fn unload(&mut self) {
        self.sample = None;
        self.frame_pos = 0;
        self.playing = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.sample.is_some()
    }

    pub fn rewind(&mut self) {
        self.frame_pos = 0;
    }

    /// Starts playback from the current cursor.
    ///
    /// Returns `false` when there is no clip to play.
    pub fn play(&mut self) -> bool {
        let Some(sample) = self.sample.as_ref() else {
            return false;
        };

        if self.frame_pos >= sample.frames() {
            self.frame_pos = 0;
        }
        self.playing = true;
        true
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_ended(&self) -> bool {
        self.sample
            .as_ref()
            .is_some_and(|sample| self.frame_pos >= sample.frames())
    }
}
