//! Модуль для работы с TTS
//!
//! Здесь определен интерфейс сервиса синтеза речи и декодированный аудиобуфер,
//! который он возвращает. Конкретная реализация для Gemini находится в `gemini`.

pub mod gemini;

use async_trait::async_trait;

use crate::config::VoiceName;
use crate::error::{Result, TimelineError};
use crate::subtitle::Segment;

pub use gemini::GeminiSynthesizer;

/// Декодированный аудиобуфер: PCM семплы по каналам
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Частота дискретизации в Гц
    pub sample_rate: u32,
    /// Семплы f32 для каждого канала, все каналы одной длины
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self { sample_rate, channels }
    }

    /// Моно буфер из одного набора семплов
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(sample_rate, vec![samples])
    }

    /// Моно буфер постоянной амплитуды заданной длительности
    pub fn constant(value: f32, seconds: f64, sample_rate: u32) -> Self {
        let frames = (seconds * sample_rate as f64).round() as usize;
        Self::mono(vec![value; frames], sample_rate)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Количество семплов на канал
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Длительность в секундах по количеству семплов
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Первый канал; остальные при микшировании не используются
    pub fn first_channel(&self) -> &[f32] {
        self.channels.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Результат успешного синтеза одного сегмента
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub segment: Segment,
    pub buffer: AudioBuffer,
}

impl SynthesisResult {
    /// Момент окончания речи на общей шкале: начало сегмента + реальная длительность речи
    pub fn end_time(&self) -> f64 {
        self.segment.start_time + self.buffer.duration_seconds()
    }
}

/// Сервис синтеза речи.
///
/// Реализация должна допускать одновременные вызовы в пределах лимита планировщика.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Синтезировать речь для текста выбранным голосом
    async fn synthesize(&self, text: &str, voice: VoiceName) -> Result<AudioBuffer>;
}

/// Озвучить один фрагмент текста.
///
/// Пустой текст отклоняется до обращения к сервису.
pub async fn generate_speech(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    voice: VoiceName,
) -> Result<AudioBuffer> {
    if text.trim().is_empty() {
        return Err(TimelineError::EmptyText);
    }
    synthesizer.synthesize(text, voice).await
}
