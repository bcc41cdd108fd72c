use std::sync::Arc;

use crate::compositor::Compositor;
use crate::config::VoiceName;
use crate::error::TimelineError;
use crate::progress::{MemoryProgressObserver, ProgressInfo};
use crate::scheduler::BatchScheduler;
use crate::subtitle::Segment;
use crate::tests::mock::MockSynthesizer;

const RATE: u32 = 16000;

#[tokio::test]
async fn test_track_length_follows_speech_not_subtitles() {
    // Тайминги субтитров короче реальной речи
    let mock = Arc::new(
        MockSynthesizer::new(RATE)
            .duration_for("first", 1.0)
            .duration_for("second", 3.0)
            .duration_for("third", 0.5),
    );
    let segments = vec![
        Segment::new("1", 0.0, 0.5, "first"),
        Segment::new("2", 2.0, 2.5, "second"),
        Segment::new("3", 4.0, 4.2, "third"),
    ];

    let outcome = BatchScheduler::new(mock)
        .synthesize_all(&segments, VoiceName::Kore, None, None)
        .await
        .unwrap();
    let master = Compositor::default().compose(&outcome.results, RATE).unwrap();

    // max(0+1, 2+3, 4+0.5) + 0.5 = 5.5 с
    assert_eq!(master.len(), 88000);
    assert!((master.duration_seconds() - 5.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_overlapping_speech_is_summed_and_clipped() {
    let mock = Arc::new(MockSynthesizer::new(RATE).with_amplitude(0.6).with_duration(1.0));
    let segments = vec![
        Segment::new("a", 0.0, 1.0, "alpha"),
        Segment::new("b", 0.5, 1.5, "beta"),
    ];

    let outcome = BatchScheduler::new(mock)
        .synthesize_all(&segments, VoiceName::Kore, None, None)
        .await
        .unwrap();
    let master = Compositor::default().compose(&outcome.results, RATE).unwrap();
    let samples = master.samples();

    assert_eq!(master.len(), 32000);
    assert!((samples[0] - 0.6).abs() < 1e-6);
    assert!((samples[7999] - 0.6).abs() < 1e-6);
    // Перекрытие 0.5..1.0 с: 0.6 + 0.6 ограничено до 1.0
    assert!(samples[8000..16000].iter().all(|&s| s == 1.0));
    assert!((samples[16000] - 0.6).abs() < 1e-6);
    assert!((samples[23999] - 0.6).abs() < 1e-6);
    assert!(samples[24000..].iter().all(|&s| s == 0.0));
}

#[tokio::test]
async fn test_single_failure_in_batch_of_five() {
    let mock = Arc::new(MockSynthesizer::new(RATE).failing_on("two"));
    let segments: Vec<_> = ["one", "two", "three", "four", "five"]
        .iter()
        .enumerate()
        .map(|(i, text)| Segment::new((i + 1).to_string(), i as f64 * 2.0, i as f64 * 2.0 + 1.0, *text))
        .collect();
    let progress = MemoryProgressObserver::new();

    let outcome = BatchScheduler::new(mock.clone())
        .with_concurrency_limit(3)
        .synthesize_all(&segments, VoiceName::Kore, Some(&progress), None)
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 5);
    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.dropped, vec!["2".to_string()]);
    assert_eq!(
        progress.history(),
        vec![ProgressInfo::new(3, 5), ProgressInfo::new(5, 5)]
    );

    // Пропущенный сегмент оставляет тишину на своем месте
    let master = Compositor::default().compose(&outcome.results, RATE).unwrap();
    assert!(master.samples()[2 * RATE as usize..3 * RATE as usize].iter().all(|&s| s == 0.0));
    assert!((master.samples()[4 * RATE as usize] - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_zero_segments_fail_without_calls() {
    let mock = Arc::new(MockSynthesizer::new(RATE));
    let progress = MemoryProgressObserver::new();

    let result = BatchScheduler::new(mock.clone())
        .synthesize_all(&[], VoiceName::Kore, Some(&progress), None)
        .await;

    assert!(matches!(result, Err(TimelineError::EmptyInput)));
    assert_eq!(mock.call_count(), 0);
    assert!(progress.history().is_empty());
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_total() {
    let mock = Arc::new(MockSynthesizer::new(RATE).with_duration(0.1));
    let segments: Vec<_> = (0..8)
        .map(|i| Segment::new(i.to_string(), i as f64, i as f64 + 0.5, format!("text {}", i)))
        .collect();
    let progress = MemoryProgressObserver::new();

    BatchScheduler::new(mock)
        .with_concurrency_limit(3)
        .synthesize_all(&segments, VoiceName::Kore, Some(&progress), None)
        .await
        .unwrap();

    let completed: Vec<_> = progress.history().iter().map(|p| p.completed).collect();
    assert_eq!(completed, vec![3, 6, 8]);
    assert!(progress.history().iter().all(|p| p.total == 8));
}
