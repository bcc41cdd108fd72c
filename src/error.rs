//! Модуль обработки ошибок библиотеки tts-timeline
//!
//! Фатальные ошибки (`EmptyInput`, `AllSynthesisFailed`, `NoResultsToCompose`)
//! прерывают всю операцию. Ошибки отдельных вызовов синтеза (`Synthesis`,
//! `Timeout`) планировщик только логирует и продолжает работу.

use thiserror::Error;

/// Ошибки библиотеки tts-timeline
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Не передано ни одного сегмента
    #[error("No segments supplied for synthesis")]
    EmptyInput,

    /// Ни один вызов синтеза не завершился успешно
    #[error("Speech synthesis failed for all {total} segments")]
    AllSynthesisFailed { total: usize },

    /// Компоновщик вызван с пустым набором результатов
    #[error("No synthesis results to compose")]
    NoResultsToCompose,

    /// Ошибка отдельного вызова синтеза
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Вызов синтеза не уложился в таймаут
    #[error("Speech synthesis timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Операция отменена между пакетами
    #[error("Operation cancelled")]
    Cancelled,

    /// Пустой текст для озвучивания
    #[error("Text to synthesize is empty")]
    EmptyText,

    /// Ошибка парсинга субтитров
    #[error("Subtitle parsing error: {0}")]
    SubtitleParsing(String),

    /// Ошибка декодирования аудио
    #[error("Audio decoding error: {0}")]
    AudioDecoding(String),

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ошибка WAV-кодирования
    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    /// Ошибка декодирования base64
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl TimelineError {
    /// Является ли ошибка фатальной для всей операции
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::AllSynthesisFailed { .. } | Self::NoResultsToCompose | Self::Cancelled
        )
    }
}

/// Тип Result для библиотеки tts-timeline
pub type Result<T> = std::result::Result<T, TimelineError>;
