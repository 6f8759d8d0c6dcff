//! Audio Stream Module
//!
//! This module handles CPAL audio stream management including:
//! - Stream initialization and configuration
//! - Audio callback setup
//! - Real-time message processing

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Stream, StreamConfig};
use env_logger::{Builder, Env};
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::Mutex;

use crate::audio_engine::constants::{OUTPUT_BUFFER_FRAMES, RING_CAPACITY};
use crate::audio_engine::mixer::RtMixer;
use crate::messages::{AudioMessage, ControlMessage};

/// Handle to the running audio stream and the channel back from the audio thread.
pub struct AudioStreamHandle {
    pub stream: Stream,
    pub consumer: Mutex<Consumer<AudioMessage>>,
    pub output_channels: usize,
    pub output_sample_rate: u32,
}

/// Setup and configure the logger for audio operations
pub fn setup_logger() {
    // Default to `info`; override via `RUST_LOG`, e.g. `RUST_LOG=debug` when troubleshooting.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init()
        .unwrap_or(()); // Ignore initialization errors
}

/// Applies one control message to the mixer, replying through `replies` where needed.
pub(crate) fn apply_control_message(
    mixer: &mut RtMixer,
    message: ControlMessage,
    replies: &mut Producer<AudioMessage>,
) {
    match message {
        ControlMessage::Ping() => {
            let _ = replies.push(AudioMessage::Pong());
        }
        ControlMessage::LoadClip { id, sample } => {
            mixer.load_clip(id, sample);
        }
        ControlMessage::RewindClip { id } => {
            mixer.rewind_clip(id);
        }
        ControlMessage::PlayClip { id } => {
            if let Some(reply) = mixer.play_clip(id) {
                let _ = replies.push(reply);
            }
        }
        ControlMessage::StopAll() => {
            mixer.stop_all();
        }
        ControlMessage::UnloadClip { id } => {
            mixer.unload_clip(id);
        }
    }
}

/// Create and configure the audio stream
///
/// This function:
/// 1. Sets up the default audio device
/// 2. Creates ring buffers for message passing
/// 3. Initializes the mixer
/// 4. Builds and returns the audio stream together with the control producer
pub fn create_audio_stream()
-> Result<(AudioStreamHandle, Producer<ControlMessage>), Box<dyn std::error::Error>> {
    setup_logger();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("No audio device found")?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate();
    let channels = config.channels();

    log::info!(
        "Starting drum machine audio... ({} ch@{} Hz)",
        channels,
        sample_rate
    );

    // Control side -> audio thread
    let (producer_in, mut consumer_in) = RingBuffer::new(RING_CAPACITY);

    // Audio thread -> control side
    let (mut producer_out, consumer_out) = RingBuffer::new(RING_CAPACITY);

    let mut mixer = RtMixer::new(channels as usize);

    let stream_config = StreamConfig {
        channels,
        sample_rate,
        buffer_size: BufferSize::Fixed(OUTPUT_BUFFER_FRAMES),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            while let Ok(message) = consumer_in.pop() {
                apply_control_message(&mut mixer, message, &mut producer_out);
            }

            mixer.render(data, |id| {
                let _ = producer_out.push(AudioMessage::ClipEnded { id });
            });
        },
        |err| {
            log::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok((
        AudioStreamHandle {
            stream,
            consumer: Mutex::new(consumer_out),
            output_channels: channels as usize,
            output_sample_rate: sample_rate,
        },
        producer_in,
    ))
}

/// Start playing the audio stream
pub fn start_stream(stream: &Stream) -> Result<(), Box<dyn std::error::Error>> {
    stream.play()?;
    Ok(())
}
