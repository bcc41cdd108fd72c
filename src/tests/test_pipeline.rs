use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::pipeline::TtsTimeline;
use crate::progress::{ChannelProgressObserver, ProgressInfo};
use crate::tests::mock::MockSynthesizer;

const SRT: &str = "1
00:00:00,000 --> 00:00:01,000
Hello there

2
00:00:01,500 --> 00:00:02,500
<i>Second</i> line

3
00:00:03,000 --> 00:00:04,000
Third line
";

fn timeline(mock: MockSynthesizer) -> (TtsTimeline, Arc<MockSynthesizer>) {
    let mock = Arc::new(mock);
    let timeline = TtsTimeline::new(TimelineConfig::default(), mock.clone());
    (timeline, mock)
}

#[tokio::test]
async fn test_render_srt() {
    let (timeline, mock) = timeline(MockSynthesizer::new(24000).with_duration(1.0));

    let composition = timeline.render_srt(SRT).await.unwrap();

    assert_eq!(mock.call_count(), 3);
    assert_eq!(composition.synthesized, 3);
    assert!(composition.dropped.is_empty());
    assert_eq!(composition.buffer.sample_rate(), 24000);
    // Последний сегмент: 3.0 + 1.0, плюс 0.5 с паузы
    assert_eq!(composition.buffer.len(), 108000);
}

#[tokio::test]
async fn test_render_srt_reports_dropped_segments() {
    let (timeline, _) = timeline(MockSynthesizer::new(16000).failing_on("Second line"));

    let composition = timeline.render_srt(SRT).await.unwrap();

    assert_eq!(composition.synthesized, 2);
    assert_eq!(composition.dropped, vec!["2".to_string()]);
}

#[tokio::test]
async fn test_render_srt_without_segments() {
    let (timeline, mock) = timeline(MockSynthesizer::new(16000));

    let result = timeline.render_srt("not a subtitle file").await;

    assert!(matches!(result, Err(TimelineError::EmptyInput)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_render_all_failed() {
    let (timeline, _) = timeline(MockSynthesizer::new(16000).failing_always());

    let result = timeline.render_srt(SRT).await;
    assert!(matches!(result, Err(TimelineError::AllSynthesisFailed { total: 3 })));
}

#[tokio::test]
async fn test_render_srt_to_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("track.wav");
    let (timeline, _) = timeline(MockSynthesizer::new(16000).with_duration(0.5));

    let composition = timeline.render_srt_to_wav(SRT, &path).await.unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, composition.buffer.len());
}

#[tokio::test]
async fn test_progress_channel() {
    let (observer, mut rx) = ChannelProgressObserver::new();
    let (timeline, _) = timeline(MockSynthesizer::new(16000));
    let timeline = timeline.with_observer(Arc::new(observer));

    timeline.render_srt(SRT).await.unwrap();

    let mut updates = Vec::new();
    while let Ok(progress) = rx.try_recv() {
        updates.push(progress);
    }
    assert_eq!(updates, vec![ProgressInfo::new(3, 3)]);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();
    let (timeline, mock) = timeline(MockSynthesizer::new(16000));
    let timeline = timeline.with_cancellation(token);

    let result = timeline.render_srt(SRT).await;

    assert!(matches!(result, Err(TimelineError::Cancelled)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let mock = Arc::new(MockSynthesizer::new(16000));
    let config = TimelineConfig {
        concurrency_limit: 0,
        ..TimelineConfig::default()
    };
    let timeline = TtsTimeline::new(config, mock.clone());

    let result = timeline.render_srt(SRT).await;
    assert!(matches!(result, Err(TimelineError::Configuration(_))));
    assert_eq!(mock.call_count(), 0);
}
