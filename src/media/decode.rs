//! # Audio Decoding
//!
//! Декодирование ответов сервиса синтеза в PCM семплы f32.
//!
//! - Сырые PCM данные (signed 16-bit little-endian) декодируются напрямую
//! - Контейнеры (WAV, MP3, AAC) декодируются через Symphonia
//!
//! В отличие от микширования в моно, каналы сохраняются раздельно:
//! какой канал использовать, решает компоновщик.

use log::{debug, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Result, TimelineError};
use crate::tts::AudioBuffer;

/// Декодирует сырые PCM данные s16le с чередованием каналов.
///
/// Неполный последний кадр отбрасывается.
pub fn decode_pcm16le(data: &[u8], sample_rate: u32, channel_count: usize) -> Result<AudioBuffer> {
    if sample_rate == 0 {
        return Err(TimelineError::AudioDecoding("PCM sample rate must be positive".to_string()));
    }
    if channel_count == 0 {
        return Err(TimelineError::AudioDecoding("PCM channel count must be positive".to_string()));
    }

    let frame_bytes = 2 * channel_count;
    let frames = data.len() / frame_bytes;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];

    for frame in data.chunks_exact(frame_bytes) {
        for (channel, sample) in channels.iter_mut().zip(frame.chunks_exact(2)) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            channel.push(value as f32 / 32768.0);
        }
    }

    debug!("Decoded {} PCM frames at {} Hz ({} channels)", frames, sample_rate, channel_count);
    Ok(AudioBuffer::new(sample_rate, channels))
}

/// Декодирует аудио в контейнере (WAV, MP3, AAC) через Symphonia.
///
/// `extension` используется как подсказка формата, если известно.
pub fn decode_audio_bytes(data: &[u8], extension: Option<&str>) -> Result<AudioBuffer> {
    let cursor = std::io::Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let format_opts = FormatOptions {
        enable_gapless: false,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .map_err(|e| TimelineError::AudioDecoding(format!("Unrecognized audio format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TimelineError::AudioDecoding("No audio track found".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TimelineError::AudioDecoding(format!("Failed to create decoder: {}", e)))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels: Vec<Vec<f32>> = Vec::new();

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channel_count = spec.channels.count();
                if sample_rate == 0 {
                    sample_rate = spec.rate;
                }
                if channels.is_empty() {
                    channels = vec![Vec::new(); channel_count];
                }

                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_planar_ref(decoded);

                // Планарная раскладка: сначала все семплы канала 0, затем канала 1 и т.д.
                let samples = sample_buf.samples();
                let frames = samples.len() / channel_count.max(1);
                for (index, channel) in channels.iter_mut().enumerate() {
                    if let Some(plane) = samples.get(index * frames..(index + 1) * frames) {
                        channel.extend_from_slice(plane);
                    }
                }
            }
            Err(e) => {
                warn!("Skipping undecodable audio packet: {}", e);
                continue;
            }
        }
    }

    if sample_rate == 0 || channels.is_empty() {
        return Err(TimelineError::AudioDecoding("Audio stream contains no samples".to_string()));
    }

    let buffer = AudioBuffer::new(sample_rate, channels);
    debug!(
        "Decoded {} frames at {} Hz ({} channels)",
        buffer.frames(),
        buffer.sample_rate,
        buffer.channel_count()
    );
    Ok(buffer)
}
