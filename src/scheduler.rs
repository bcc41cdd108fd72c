//! # Bounded Batch Scheduler
//!
//! Запускает синтез для всех сегментов пакетами не больше `concurrency_limit`.
//! Все вызовы пакета выполняются параллельно, следующий пакет стартует только
//! после завершения всего предыдущего, поэтому одновременно в работе не больше
//! `concurrency_limit` запросов.
//!
//! Ошибка отдельного вызова (включая таймаут) логируется, сегмент пропускается,
//! остальные вызовы пакета продолжают работу. Фатальны только пустой вход и
//! ситуация, когда не удалось озвучить ни один сегмент.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{TimelineConfig, VoiceName, DEFAULT_CONCURRENCY_LIMIT};
use crate::error::{Result, TimelineError};
use crate::progress::{ProgressInfo, ProgressObserver};
use crate::subtitle::Segment;
use crate::tts::{SpeechSynthesizer, SynthesisResult};

/// Результат пакетного синтеза
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Успешные результаты в исходном порядке сегментов
    pub results: Vec<SynthesisResult>,
    /// Идентификаторы сегментов, синтез которых не удался
    pub dropped: Vec<String>,
    /// Общее количество сегментов
    pub total: usize,
}

/// Планировщик пакетного синтеза с ограничением параллелизма
#[derive(Clone)]
pub struct BatchScheduler {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    concurrency_limit: usize,
    request_timeout: Duration,
}

impl BatchScheduler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Создать планировщик с параметрами из конфигурации
    pub fn from_config(synthesizer: Arc<dyn SpeechSynthesizer>, config: &TimelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            synthesizer,
            concurrency_limit: config.concurrency_limit,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Синтезировать речь для всех сегментов.
    ///
    /// Наблюдатель получает `(обработано, всего)` ровно один раз после каждого пакета.
    /// Токен отмены проверяется перед запуском очередного пакета; уже запущенный
    /// пакет всегда доводится до конца.
    pub async fn synthesize_all(
        &self,
        segments: &[Segment],
        voice: VoiceName,
        observer: Option<&dyn ProgressObserver>,
        cancel: Option<&CancellationToken>,
    ) -> Result<BatchOutcome> {
        if segments.is_empty() {
            return Err(TimelineError::EmptyInput);
        }
        if self.concurrency_limit == 0 {
            return Err(TimelineError::Configuration(
                "concurrency_limit must be greater than zero".to_string(),
            ));
        }

        let total = segments.len();
        let mut results = Vec::with_capacity(total);
        let mut dropped = Vec::new();
        let mut processed = 0;

        info!(
            "Synthesizing {} segments with voice {} ({} concurrent requests)",
            total, voice, self.concurrency_limit
        );

        for (chunk_index, chunk) in segments.chunks(self.concurrency_limit).enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                warn!("Synthesis cancelled after {}/{} segments", processed, total);
                return Err(TimelineError::Cancelled);
            }

            debug!("Dispatching chunk {} ({} segments)", chunk_index + 1, chunk.len());
            let settled = self.run_chunk(chunk, voice).await;

            for (segment, outcome) in chunk.iter().zip(settled) {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        warn!("Failed to synthesize segment {}: {}", segment.id, e);
                        dropped.push(segment.id.clone());
                    }
                }
            }

            processed += chunk.len();
            if let Some(observer) = observer {
                observer.on_progress(ProgressInfo::new(processed, total));
            }
        }

        if results.is_empty() {
            return Err(TimelineError::AllSynthesisFailed { total });
        }

        if !dropped.is_empty() {
            warn!("Dropped {} of {} segments: {:?}", dropped.len(), total, dropped);
        }
        info!("Synthesized {}/{} segments", results.len(), total);

        Ok(BatchOutcome {
            results,
            dropped,
            total,
        })
    }

    /// Запускает все вызовы пакета параллельно и ждет завершения каждого.
    ///
    /// Результаты возвращаются в порядке сегментов пакета. Если вызывающий
    /// отбрасывает future, `JoinSet` прерывает еще не завершенные вызовы.
    async fn run_chunk(&self, chunk: &[Segment], voice: VoiceName) -> Vec<Result<SynthesisResult>> {
        let mut tasks = JoinSet::new();
        for (index, segment) in chunk.iter().cloned().enumerate() {
            let synthesizer = Arc::clone(&self.synthesizer);
            let timeout = self.request_timeout;

            tasks.spawn(async move {
                let outcome = match tokio::time::timeout(timeout, synthesizer.synthesize(&segment.text, voice)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(TimelineError::Timeout(timeout)),
                };
                (index, outcome.map(|buffer| SynthesisResult { segment, buffer }))
            });
        }

        let mut settled: Vec<Option<Result<SynthesisResult>>> = (0..chunk.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => settled[index] = Some(outcome),
                Err(e) => warn!("Synthesis task failed: {}", e),
            }
        }

        settled
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| Err(TimelineError::Synthesis("synthesis task failed".to_string())))
            })
            .collect()
    }
}
