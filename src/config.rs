//! Модуль конфигурации библиотеки tts-timeline
//!
//! Этот модуль содержит структуры и перечисления для настройки синтеза и компоновки.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Количество одновременных запросов синтеза по умолчанию
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;

/// Пауза в конце дорожки по умолчанию, в секундах
pub const DEFAULT_TRAILING_PAD_SECS: f64 = 0.5;

/// Модель TTS по умолчанию
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Базовый адрес API по умолчанию
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Пол голоса
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoiceGender {
    Male,
    Female,
}

/// Предустановленный голос синтеза
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum VoiceName {
    /// Мужской голос, ровный и устойчивый
    Puck,
    /// Мужской голос, глубокий
    Charon,
    /// Женский голос, мягкий
    #[default]
    Kore,
    /// Мужской голос, сильный
    Fenrir,
    /// Женский голос, чистый
    Zephyr,
}

impl VoiceName {
    /// Все доступные голоса
    pub fn all() -> &'static [VoiceName] {
        &[Self::Puck, Self::Charon, Self::Kore, Self::Fenrir, Self::Zephyr]
    }

    /// Получить строковое представление голоса
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Kore => "Kore",
            Self::Fenrir => "Fenrir",
            Self::Zephyr => "Zephyr",
        }
    }

    pub fn gender(&self) -> VoiceGender {
        match self {
            Self::Kore | Self::Zephyr => VoiceGender::Female,
            Self::Puck | Self::Charon | Self::Fenrir => VoiceGender::Male,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Puck => "Steady, low male voice",
            Self::Charon => "Deep male voice",
            Self::Kore => "Soft female voice",
            Self::Fenrir => "Strong male voice",
            Self::Zephyr => "Clear female voice",
        }
    }
}

impl fmt::Display for VoiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceName {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|voice| voice.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimelineError::Configuration(format!("Unknown voice: {}", s)))
    }
}

/// Конфигурация библиотеки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    /// API ключ сервиса синтеза
    pub api_key: String,
    /// Базовый адрес API
    pub api_base_url: String,
    /// Модель TTS
    pub model: String,
    /// Голос TTS
    pub voice: VoiceName,
    /// Максимальное количество одновременных запросов синтеза (размер пакета)
    pub concurrency_limit: usize,
    /// Таймаут одного запроса синтеза, в секундах
    pub request_timeout_secs: u64,
    /// Пауза, добавляемая после самого позднего сегмента, в секундах
    pub trailing_pad_secs: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            voice: VoiceName::default(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            request_timeout_secs: 60,
            trailing_pad_secs: DEFAULT_TRAILING_PAD_SECS,
        }
    }
}

impl TimelineConfig {
    /// Загрузить конфигурацию из JSON файла.
    ///
    /// Отсутствующие поля получают значения по умолчанию.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TimelineConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Применить переопределения из переменных окружения
    ///
    /// - GEMINI_API_KEY → api_key
    /// - TTS_TIMELINE_VOICE → voice
    /// - TTS_TIMELINE_CONCURRENCY → concurrency_limit
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = key;
            }
        }

        if let Ok(voice) = std::env::var("TTS_TIMELINE_VOICE") {
            match voice.parse() {
                Ok(voice) => self.voice = voice,
                Err(e) => log::warn!("Ignoring TTS_TIMELINE_VOICE: {}", e),
            }
        }

        if let Ok(limit) = std::env::var("TTS_TIMELINE_CONCURRENCY") {
            match limit.trim().parse::<usize>() {
                Ok(limit) => self.concurrency_limit = limit,
                Err(e) => log::warn!("Ignoring TTS_TIMELINE_CONCURRENCY={}: {}", limit, e),
            }
        }

        self
    }

    /// Проверить значения конфигурации
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(TimelineError::Configuration(
                "concurrency_limit must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(TimelineError::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !self.trailing_pad_secs.is_finite() || self.trailing_pad_secs < 0.0 {
            return Err(TimelineError::Configuration(format!(
                "trailing_pad_secs must be a non-negative number, got {}",
                self.trailing_pad_secs
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
