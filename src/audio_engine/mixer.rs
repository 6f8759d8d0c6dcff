//! Real-time mixer implementation.
//!
//! This module provides the [`RtMixer`] struct which owns one
//! [`VoiceSlot`](crate::audio_engine::voice_slot::VoiceSlot) per pad and renders every playing
//! clip into the interleaved output buffer.
//!
//! The mixer operates on [`SampleBuffer`](crate::messages::SampleBuffer) data produced by
//! [`decode_audio_file_to_sample_buffer`](crate::audio_engine::sample_loader::decode_audio_file_to_sample_buffer)
//! on a loader thread. It never allocates or locks while rendering.

use crate::audio_engine::constants::NUM_PADS;
use crate::audio_engine::voice_slot::VoiceSlot;
use crate::messages::{AudioMessage, SampleBuffer};
use cpal::Sample;

/// Real-time mixer holding the clip bank and one voice per pad.
pub struct RtMixer {
    /// Number of output channels (1 for mono, 2 for stereo).
    channels: usize,

    /// One slot per pad, indexed by grid position.
    voices: [VoiceSlot; NUM_PADS],
}

impl RtMixer {
    /// Creates a new RtMixer with the specified number of channels.
    ///
    /// # Returns
    ///
    /// A new `RtMixer` instance with no clips loaded.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            voices: std::array::from_fn(|_| VoiceSlot::default()),
        }
    }

    /// Loads a clip into the pad slot `id`.
    ///
    /// The clip must have the same number of channels as the mixer. Invalid IDs and
    /// mismatching clips are silently ignored.
    pub fn load_clip(&mut self, id: usize, sample: SampleBuffer) {
        if id >= NUM_PADS || sample.channels != self.channels {
            return;
        }

        self.voices[id].load(sample);
    }

    /// Moves the pad's cursor back to the first frame.
    pub fn rewind_clip(&mut self, id: usize) {
        if let Some(voice) = self.voices.get_mut(id) {
            voice.rewind();
        }
    }

    /// Starts playback of the pad's clip.
    ///
    /// Returns [`AudioMessage::PlayRejected`] when the pad has no clip.
    pub fn play_clip(&mut self, id: usize) -> Option<AudioMessage> {
        let voice = self.voices.get_mut(id)?;
        if voice.play() {
            None
        } else {
            Some(AudioMessage::PlayRejected { id })
        }
    }

    /// Stops all playing clips.
    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Stops the pad and drops its clip.
    pub fn unload_clip(&mut self, id: usize) {
        if let Some(voice) = self.voices.get_mut(id) {
            voice.unload();
        }
    }

    /// Renders audio frames to the output buffer.
    ///
    /// Every playing clip is summed into `output` from its cursor. A clip that reaches its last
    /// frame stops and `on_ended` is called with its pad id.
    pub fn render(&mut self, output: &mut [f32], mut on_ended: impl FnMut(usize)) {
        output.fill(Sample::EQUILIBRIUM);

        if self.channels == 0 {
            return;
        }

        let frames = output.len() / self.channels;
        if frames == 0 {
            return;
        }

        for (id, voice) in self.voices.iter_mut().enumerate() {
            if !voice.playing {
                continue;
            }

            let Some(sample) = voice.sample.as_ref() else {
                voice.stop();
                continue;
            };

            let sample_frames = sample.frames();
            let remaining = sample_frames.saturating_sub(voice.frame_pos);
            let to_copy = remaining.min(frames);

            let start = voice.frame_pos * self.channels;
            let src = &sample.samples[start..start + to_copy * self.channels];
            for (out, &s) in output.iter_mut().zip(src) {
                *out += s;
            }

            voice.frame_pos += to_copy;
            if voice.frame_pos >= sample_frames {
                voice.stop();
                on_ended(id);
            }
        }
    }

    /// Gets the number of channels configured for this mixer.
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_loaded(&self, id: usize) -> bool {
        self.voices.get(id).is_some_and(VoiceSlot::is_loaded)
    }

    pub fn is_playing(&self, id: usize) -> bool {
        self.voices.get(id).is_some_and(|voice| voice.playing)
    }
}
