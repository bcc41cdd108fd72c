//! Кодирование итоговой дорожки в WAV (моно, 16 бит PCM)

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;

use crate::compositor::MasterBuffer;
use crate::error::Result;

fn wav_spec(buffer: &MasterBuffer) -> WavSpec {
    WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn write_samples<W: Write + Seek>(writer: W, buffer: &MasterBuffer) -> Result<()> {
    let mut writer = WavWriter::new(writer, wav_spec(buffer))?;
    for &sample in buffer.samples() {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

/// Сохраняет буфер в WAV файл
pub fn encode_wav<P: AsRef<Path>>(buffer: &MasterBuffer, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    let file = std::io::BufWriter::new(std::fs::File::create(output_path)?);
    write_samples(file, buffer)?;

    info!(
        "Saved WAV file: {} ({} samples, {} Hz)",
        output_path.display(),
        buffer.len(),
        buffer.sample_rate()
    );
    Ok(())
}

/// Кодирует буфер в WAV в памяти
pub fn wav_bytes(buffer: &MasterBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, buffer)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_file_round_trip() {
        let mut master = MasterBuffer::silent(8000, 16000);
        master.mix_at(0, &[1.0, -1.0, 0.5]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav(&master, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 8000);

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], i16::MAX);
        assert_eq!(samples[1], -i16::MAX);
        assert_eq!(samples[2], i16::MAX / 2);
        assert_eq!(samples[3], 0);
    }

    #[test]
    fn test_wav_bytes_has_riff_header() {
        let master = MasterBuffer::silent(100, 24000);
        let bytes = wav_bytes(&master).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 200);
    }
}
