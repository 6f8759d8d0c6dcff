//! Audio file loading and decoding functionality.
//!
//! This module turns an audio file into a [`SampleBuffer`] matching the output stream: decoded
//! with Symphonia, resampled with rubato when the file rate differs from the device rate, and
//! mapped to the output channel count.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio_engine::channels::{deinterleave, interleave, map_channels};
use crate::audio_engine::constants::RESAMPLE_CHUNK_FRAMES;
use crate::audio_engine::errors::SampleLoadError;
use crate::messages::SampleBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLoadSubtask {
    Decoding,
    Resampling,
    ChannelMapping,
}

/// Progress update reported while a file is being turned into a sample buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleLoadProgress {
    pub subtask: SampleLoadSubtask,
    /// Progress within the current subtask (0.0..=1.0).
    pub percent: f32,
    /// Whether this load goes through the resampler at all.
    pub resampling_required: bool,
}

/// Decodes an audio file into a sample buffer with the specified output configuration.
///
/// # Parameters
///
/// - `path`: Path to the audio file to load
/// - `output_channels`: Number of output channels (1 for mono, 2 for stereo)
/// - `output_rate_hz`: Output sample rate in Hz
///
/// # Errors
///
/// - File not found or cannot be opened
/// - Audio format not recognized or corrupted
/// - Resampler could not be built or failed
/// - Unsupported channel count
pub fn decode_audio_file_to_sample_buffer(
    path: &Path,
    output_channels: usize,
    output_rate_hz: u32,
) -> Result<SampleBuffer, SampleLoadError> {
    decode_audio_file_to_sample_buffer_with_progress(path, output_channels, output_rate_hz, |_| {})
}

/// Same as [`decode_audio_file_to_sample_buffer`], reporting progress through `on_progress`.
pub fn decode_audio_file_to_sample_buffer_with_progress<F>(
    path: &Path,
    output_channels: usize,
    output_rate_hz: u32,
    mut on_progress: F,
) -> Result<SampleBuffer, SampleLoadError>
where
    F: FnMut(SampleLoadProgress),
{
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or(SampleLoadError::NoDefaultTrack)?;
    let track_id = track.id;
    let total_frames = track.codec_params.n_frames;
    let file_rate_hz = track
        .codec_params
        .sample_rate
        .ok_or(SampleLoadError::MissingSampleRate)?;
    let file_channels = track
        .codec_params
        .channels
        .ok_or(SampleLoadError::MissingChannels)?
        .count();

    let resampling_required = file_rate_hz != output_rate_hz;
    let report = |subtask, percent| SampleLoadProgress {
        subtask,
        percent,
        resampling_required,
    };

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    on_progress(report(SampleLoadSubtask::Decoding, 0.0));
    let mut decoded: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(SampleLoadError::Decode(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = decoder.decode(&packet)?;
        let spec = *audio_buf.spec();
        let duration = audio_buf.capacity() as u64;

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        decoded.extend_from_slice(sample_buf.samples());

        if let Some(total) = total_frames.filter(|&total| total > 0) {
            let frames = decoded.len() / file_channels.max(1);
            on_progress(report(
                SampleLoadSubtask::Decoding,
                frames as f32 / total as f32,
            ));
        }
    }
    on_progress(report(SampleLoadSubtask::Decoding, 1.0));

    let decoded = if resampling_required {
        on_progress(report(SampleLoadSubtask::Resampling, 0.0));
        let resampled = resample_interleaved(
            &decoded,
            file_channels,
            file_rate_hz,
            output_rate_hz,
            |percent| on_progress(report(SampleLoadSubtask::Resampling, percent)),
        )?;
        on_progress(report(SampleLoadSubtask::Resampling, 1.0));
        resampled
    } else {
        decoded
    };

    on_progress(report(SampleLoadSubtask::ChannelMapping, 0.0));
    let mapped = map_channels(decoded, file_channels, output_channels)?;
    on_progress(report(SampleLoadSubtask::ChannelMapping, 1.0));

    Ok(SampleBuffer {
        channels: output_channels,
        samples: Arc::from(mapped.into_boxed_slice()),
    })
}

/// Resamples interleaved audio from `from_hz` to `to_hz` with a sinc resampler.
///
/// The resampler's output delay is trimmed so that the result starts at the same instant as
/// the input and holds `frames * to_hz / from_hz` frames (rounded).
pub fn resample_interleaved<F>(
    samples: &[f32],
    channels: usize,
    from_hz: u32,
    to_hz: u32,
    mut on_progress: F,
) -> Result<Vec<f32>, SampleLoadError>
where
    F: FnMut(f32),
{
    if from_hz == to_hz || channels == 0 || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_hz) / f64::from(from_hz);
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK_FRAMES, channels)?;

    let planar = deinterleave(samples, channels);
    let total_frames = planar[0].len();
    let expected_frames = (total_frames as f64 * ratio).round() as usize;
    let mut output: Vec<Vec<f32>> =
        vec![Vec::with_capacity(expected_frames + RESAMPLE_CHUNK_FRAMES); channels];

    let mut pos = 0;
    loop {
        let needed = resampler.input_frames_next();
        if pos + needed > total_frames {
            break;
        }
        let chunk: Vec<&[f32]> = planar.iter().map(|ch| &ch[pos..pos + needed]).collect();
        let out = resampler.process(&chunk, None)?;
        append(&mut output, out);
        pos += needed;
        on_progress(pos as f32 / total_frames as f32);
    }

    if pos < total_frames {
        let rest: Vec<&[f32]> = planar.iter().map(|ch| &ch[pos..]).collect();
        let out = resampler.process_partial(Some(rest.as_slice()), None)?;
        append(&mut output, out);
    }

    // Flush the filter tail until the delayed output catches up with the input length.
    let delay = resampler.output_delay();
    while output[0].len() < expected_frames + delay {
        let out = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if out.first().is_none_or(Vec::is_empty) {
            break;
        }
        append(&mut output, out);
    }

    for channel in &mut output {
        channel.drain(..delay.min(channel.len()));
        channel.truncate(expected_frames);
    }

    Ok(interleave(&output))
}

fn append(output: &mut [Vec<f32>], chunk: Vec<Vec<f32>>) {
    for (out, part) in output.iter_mut().zip(chunk) {
        out.extend_from_slice(&part);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    /// Helper function to create a PCM16 WAV file for testing.
    fn write_pcm16_wav(
        path: &Path,
        channels: u16,
        sample_rate_hz: u32,
        samples: &[i16],
    ) -> std::io::Result<()> {
        let bits_per_sample = 16u16;
        let block_align = channels * (bits_per_sample / 8);
        let byte_rate = sample_rate_hz * u32::from(block_align);
        let data_len_bytes = u32::try_from(samples.len() * 2).expect("sample data too large");
        let chunk_size = 36 + data_len_bytes;

        let mut file = File::create(path)?;
        file.write_all(b"RIFF")?;
        file.write_all(&chunk_size.to_le_bytes())?;
        file.write_all(b"WAVE")?;

        file.write_all(b"fmt ")?;
        file.write_all(&16u32.to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?; // PCM
        file.write_all(&channels.to_le_bytes())?;
        file.write_all(&sample_rate_hz.to_le_bytes())?;
        file.write_all(&byte_rate.to_le_bytes())?;
        file.write_all(&block_align.to_le_bytes())?;
        file.write_all(&bits_per_sample.to_le_bytes())?;

        file.write_all(b"data")?;
        file.write_all(&data_len_bytes.to_le_bytes())?;
        for sample in samples {
            file.write_all(&sample.to_le_bytes())?;
        }

        Ok(())
    }

    #[test]
    fn test_decode_wav_to_f32_buffer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kick.wav");

        let samples = [0i16, 16_384i16, -16_384i16, 32_767i16];
        write_pcm16_wav(&path, 1, 44_100, &samples).unwrap();

        let decoded = decode_audio_file_to_sample_buffer(&path, 1, 44_100).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), samples.len());
        assert!(decoded.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_channel_mapping_mono_to_stereo() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clap.wav");

        let samples = [0i16, 16_384i16, -16_384i16];
        write_pcm16_wav(&path, 1, 44_100, &samples).unwrap();

        let decoded = decode_audio_file_to_sample_buffer(&path, 2, 44_100).unwrap();
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.frames(), samples.len());

        for frame in decoded.samples.chunks_exact(2) {
            assert!((frame[0] - frame[1]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decode_resamples_to_output_rate() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hat.wav");

        let samples: Vec<i16> = (0..4_410).map(|i| ((i % 100) * 100) as i16).collect();
        write_pcm16_wav(&path, 1, 44_100, &samples).unwrap();

        let decoded = decode_audio_file_to_sample_buffer(&path, 1, 48_000).unwrap();
        assert_eq!(decoded.frames(), 4_800);
    }

    #[test]
    fn test_decode_reports_progress_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("snare.wav");
        write_pcm16_wav(&path, 1, 44_100, &[0i16; 64]).unwrap();

        let mut updates = Vec::new();
        decode_audio_file_to_sample_buffer_with_progress(&path, 2, 44_100, |update| {
            updates.push(update)
        })
        .unwrap();

        assert!(updates.iter().all(|u| !u.resampling_required));
        assert!(
            updates
                .iter()
                .all(|u| u.subtask != SampleLoadSubtask::Resampling)
        );
        assert_eq!(updates.first().unwrap().subtask, SampleLoadSubtask::Decoding);
        let last = updates.last().unwrap();
        assert_eq!(last.subtask, SampleLoadSubtask::ChannelMapping);
        assert!((last.percent - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_resample_passthrough_at_equal_rates() {
        let input = vec![0.1, 0.2, 0.3];
        let output = resample_interleaved(&input, 1, 48_000, 48_000, |_| {}).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resample_stereo_length() {
        let input = vec![0.25; 2 * 3_000];
        let output = resample_interleaved(&input, 2, 48_000, 24_000, |_| {}).unwrap();
        assert_eq!(output.len(), 2 * 1_500);
    }

    #[test]
    fn test_decode_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nonexistent.wav");

        let result = decode_audio_file_to_sample_buffer(&path, 1, 44_100);
        assert!(matches!(result, Err(SampleLoadError::Io(_))));
    }
}
