//! Фасад: субтитры → синтез → компоновка → WAV

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::compositor::{Compositor, MasterBuffer};
use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::media;
use crate::progress::ProgressObserver;
use crate::scheduler::BatchScheduler;
use crate::subtitle::{self, Segment};
use crate::tts::SpeechSynthesizer;

/// Результат рендера дорожки
#[derive(Debug, Clone)]
pub struct Composition {
    /// Итоговый моно буфер
    pub buffer: MasterBuffer,
    /// Сегменты, для которых синтез не удался
    pub dropped: Vec<String>,
    /// Количество успешно озвученных сегментов
    pub synthesized: usize,
}

/// Основная структура для работы с библиотекой
pub struct TtsTimeline {
    config: TimelineConfig,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    observer: Option<Arc<dyn ProgressObserver>>,
    cancel: Option<CancellationToken>,
}

impl TtsTimeline {
    pub fn new(config: TimelineConfig, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            config,
            synthesizer,
            observer: None,
            cancel: None,
        }
    }

    /// Добавить наблюдателя прогресса
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Использовать токен отмены; проверяется перед каждым пакетом
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Озвучить сегменты и свести их в одну дорожку
    pub async fn render(&self, segments: &[Segment]) -> Result<Composition> {
        let scheduler = BatchScheduler::from_config(Arc::clone(&self.synthesizer), &self.config)?;
        let outcome = scheduler
            .synthesize_all(
                segments,
                self.config.voice,
                self.observer.as_deref(),
                self.cancel.as_ref(),
            )
            .await?;

        let sample_rate = outcome
            .results
            .first()
            .map(|result| result.buffer.sample_rate)
            .ok_or(TimelineError::NoResultsToCompose)?;

        let buffer = Compositor::new(self.config.trailing_pad_secs).compose(&outcome.results, sample_rate)?;

        if !outcome.dropped.is_empty() {
            warn!(
                "Track is missing {} of {} segments",
                outcome.dropped.len(),
                outcome.total
            );
        }

        Ok(Composition {
            buffer,
            synthesized: outcome.results.len(),
            dropped: outcome.dropped,
        })
    }

    /// Разобрать SRT и отрендерить дорожку
    pub async fn render_srt(&self, content: &str) -> Result<Composition> {
        let segments = subtitle::parse_srt_segments(content);
        if segments.is_empty() {
            return Err(TimelineError::EmptyInput);
        }
        info!("Parsed {} subtitle segments", segments.len());
        self.render(&segments).await
    }

    /// Отрендерить SRT и записать результат в WAV файл
    pub async fn render_srt_to_wav<P: AsRef<Path>>(&self, content: &str, output_path: P) -> Result<Composition> {
        let composition = self.render_srt(content).await?;
        media::encode_wav(&composition.buffer, output_path.as_ref())?;
        info!(
            "Wrote {:.2}s track to {}",
            composition.buffer.duration_seconds(),
            output_path.as_ref().display()
        );
        Ok(composition)
    }
}
