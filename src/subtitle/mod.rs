//! Модуль для работы с субтитрами
//!
//! Содержит тип сегмента и парсер SRT.

pub mod parser;

pub use parser::{is_srt_format, parse_srt_file, parse_srt_segments, parse_srt_text, time_to_seconds};

/// Сегмент субтитров, который нужно озвучить
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Идентификатор сегмента (номер блока SRT или сгенерированный)
    pub id: String,
    /// Время начала в секундах
    pub start_time: f64,
    /// Время окончания в секундах
    pub end_time: f64,
    /// Текст для озвучивания
    pub text: String,
}

impl Segment {
    /// Создать новый сегмент
    pub fn new(id: impl Into<String>, start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Длительность по таймингу субтитра (не по синтезированной речи)
    pub fn nominal_duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}
