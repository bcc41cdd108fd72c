//! Модуль для отслеживания прогресса синтеза
//!
//! Планировщик сообщает `(completed, total)` после каждого завершенного пакета.
//! Наблюдатель может быть замыканием, каналом Tokio или записью в лог.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Информация о прогрессе синтеза
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressInfo {
    /// Сколько сегментов обработано (успешно или нет)
    pub completed: usize,
    /// Общее количество сегментов
    pub total: usize,
}

impl ProgressInfo {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed: completed.min(total),
            total,
        }
    }

    /// Доля выполнения (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f32 / self.total as f32
    }

    /// Процент выполнения (0.0 - 100.0)
    pub fn percent(&self) -> f32 {
        self.fraction() * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Трейт для наблюдателя, получающего уведомления о прогрессе
pub trait ProgressObserver: Send + Sync {
    /// Метод, вызываемый после каждого завершенного пакета
    fn on_progress(&self, progress: ProgressInfo);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, progress: ProgressInfo) {
        self(progress.completed, progress.total)
    }
}

/// Наблюдатель, пишущий прогресс в лог
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgressObserver;

impl ProgressObserver for LogProgressObserver {
    fn on_progress(&self, progress: ProgressInfo) {
        log::info!(
            "Speech generation: {}/{} segments ({:.0}%)",
            progress.completed,
            progress.total,
            progress.percent()
        );
    }
}

/// Наблюдатель, пересылающий прогресс в канал Tokio
#[derive(Debug, Clone)]
pub struct ChannelProgressObserver {
    tx: mpsc::UnboundedSender<ProgressInfo>,
}

impl ChannelProgressObserver {
    /// Создать наблюдателя и получателя обновлений
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressInfo>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressObserver for ChannelProgressObserver {
    fn on_progress(&self, progress: ProgressInfo) {
        if let Err(e) = self.tx.send(progress) {
            log::debug!("Progress receiver dropped: {}", e);
        }
    }
}

/// Наблюдатель, сохраняющий историю прогресса в памяти
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressObserver {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl MemoryProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Получить историю обновлений прогресса
    pub fn history(&self) -> Vec<ProgressInfo> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressObserver for MemoryProgressObserver {
    fn on_progress(&self, progress: ProgressInfo) {
        match self.history.lock() {
            Ok(mut history) => history.push(progress),
            Err(poisoned) => poisoned.into_inner().push(progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_info_clamps() {
        let info = ProgressInfo::new(6, 5);
        assert_eq!(info.completed, 5);
        assert!(info.is_complete());
        assert_eq!(info.percent(), 100.0);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(ProgressInfo::new(3, 6).fraction(), 0.5);
        assert_eq!(ProgressInfo::new(0, 0).fraction(), 1.0);
    }

    #[test]
    fn test_closure_observer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let observer = move |completed: usize, total: usize| {
            assert!(completed <= total);
            counter.fetch_add(1, Ordering::SeqCst);
        };
        observer.on_progress(ProgressInfo::new(1, 2));
        observer.on_progress(ProgressInfo::new(2, 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_channel_observer() {
        let (observer, mut rx) = ChannelProgressObserver::new();
        observer.on_progress(ProgressInfo::new(3, 5));
        assert_eq!(rx.recv().await, Some(ProgressInfo::new(3, 5)));

        drop(rx);
        // Получатель закрыт, отправка не должна паниковать
        observer.on_progress(ProgressInfo::new(5, 5));
    }

    #[test]
    fn test_memory_observer() {
        let observer = MemoryProgressObserver::new();
        let shared = observer.clone();
        observer.on_progress(ProgressInfo::new(1, 3));
        observer.on_progress(ProgressInfo::new(3, 3));
        assert_eq!(shared.history(), vec![ProgressInfo::new(1, 3), ProgressInfo::new(3, 3)]);
    }

    #[test]
    fn test_log_observer() {
        LogProgressObserver.on_progress(ProgressInfo::new(1, 4));
    }
}
