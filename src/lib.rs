//! Основной файл библиотеки tts-timeline
//!
//! Озвучивает сегменты субтитров через сервис синтеза речи с ограниченным
//! параллелизмом и сводит полученные фрагменты в одну моно дорожку, где
//! каждый фрагмент начинается в момент начала своего сегмента.

pub mod compositor;
pub mod config;
pub mod error;
pub mod logger;
pub mod media;
pub mod pipeline;
pub mod progress;
pub mod scheduler;
pub mod subtitle;
pub mod tts;

#[cfg(test)]
mod tests;

pub use compositor::{compose, Compositor, MasterBuffer};
pub use config::{TimelineConfig, VoiceName};
pub use error::{Result, TimelineError};
pub use pipeline::{Composition, TtsTimeline};
pub use progress::{ProgressInfo, ProgressObserver};
pub use scheduler::{BatchOutcome, BatchScheduler};
pub use subtitle::Segment;
pub use tts::{generate_speech, AudioBuffer, GeminiSynthesizer, SpeechSynthesizer, SynthesisResult};
