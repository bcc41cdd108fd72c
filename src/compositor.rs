//! # Timeline Compositor
//!
//! Размещает синтезированную речь каждого сегмента на общей временной шкале
//! и микширует все фрагменты в один моно буфер.
//!
//! Длительность дорожки считается по реальной длине речи, а не по таймингам
//! субтитров: `max(start_time + duration) + trailing_pad`. Перекрывающиеся
//! фрагменты складываются, результат ограничивается диапазоном [-1.0, 1.0].

use log::{debug, info, warn};

use crate::error::{Result, TimelineError};
use crate::tts::SynthesisResult;

/// Итоговый моно буфер всей дорожки.
///
/// Длина фиксируется при создании и больше не меняется.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl MasterBuffer {
    /// Буфер из тишины длиной `len` семплов
    pub fn silent(len: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; len],
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Всегда 1: выход компоновщика моно
    pub fn channels(&self) -> u16 {
        1
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Добавить фрагмент начиная с позиции `offset` с ограничением амплитуды.
    ///
    /// Семплы за пределами буфера отбрасываются.
    pub fn mix_at(&mut self, offset: usize, source: &[f32]) {
        if offset >= self.samples.len() {
            return;
        }
        let available = self.samples.len() - offset;
        let source = &source[..source.len().min(available)];

        for (target, &sample) in self.samples[offset..].iter_mut().zip(source) {
            *target = (*target + sample).clamp(-1.0, 1.0);
        }
    }
}

/// Общая длительность дорожки в секундах: самый поздний конец речи плюс пауза.
pub fn total_duration(results: &[SynthesisResult], trailing_pad_secs: f64) -> f64 {
    let latest_end = results
        .iter()
        .map(SynthesisResult::end_time)
        .fold(0.0_f64, f64::max);
    latest_end + trailing_pad_secs
}

/// Компоновщик временной шкалы
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    trailing_pad_secs: f64,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TRAILING_PAD_SECS)
    }
}

impl Compositor {
    pub fn new(trailing_pad_secs: f64) -> Self {
        Self { trailing_pad_secs }
    }

    /// Смикшировать результаты синтеза в один буфер с частотой `sample_rate`.
    ///
    /// Из многоканальных буферов берется только канал 0.
    pub fn compose(&self, results: &[SynthesisResult], sample_rate: u32) -> Result<MasterBuffer> {
        if results.is_empty() {
            return Err(TimelineError::NoResultsToCompose);
        }
        if sample_rate == 0 {
            return Err(TimelineError::Configuration("sample rate must be positive".to_string()));
        }

        let rate = sample_rate as f64;
        let offset_of = |result: &SynthesisResult| (result.segment.start_time.max(0.0) * rate).floor() as usize;

        // Без ресемплинга фрагмент с другой частотой занимает `frames` семплов шкалы,
        // поэтому длина не может быть меньше самого дальнего конца в семплах.
        let mixed_end = results
            .iter()
            .map(|result| offset_of(result) + result.buffer.frames())
            .max()
            .unwrap_or(0);
        let pad_samples = (self.trailing_pad_secs * rate).ceil() as usize;

        let duration = total_duration(results, self.trailing_pad_secs);
        let length = ((duration * rate).ceil() as usize).max(mixed_end + pad_samples);
        info!(
            "Composing {} segments: {:.3}s total, {} samples at {} Hz",
            results.len(),
            duration,
            length,
            sample_rate
        );

        let mut master = MasterBuffer::silent(length, sample_rate);

        for result in results {
            if result.buffer.sample_rate != sample_rate {
                warn!(
                    "Segment {} has sample rate {} Hz, timeline is {} Hz; mixing without resampling",
                    result.segment.id, result.buffer.sample_rate, sample_rate
                );
            }
            if result.buffer.channel_count() > 1 {
                debug!(
                    "Segment {} has {} channels, using channel 0",
                    result.segment.id,
                    result.buffer.channel_count()
                );
            }

            master.mix_at(offset_of(result), result.buffer.first_channel());
        }

        Ok(master)
    }
}

/// Смикшировать результаты с паузой по умолчанию (0.5 с)
pub fn compose(results: &[SynthesisResult], sample_rate: u32) -> Result<MasterBuffer> {
    Compositor::default().compose(results, sample_rate)
}
