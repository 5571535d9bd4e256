// File: crates/bubble-core/tests/driver.rs
// Purpose: Animation loop ordering, wrap-around, load-failure policies and stopping.

use std::path::Path;

use anyhow::Result;
use bubble_core::{stop_channel, Animator, Frame, FrameSink, LoadFailurePolicy, StopHandle, VizConfig};

#[derive(Default)]
struct Recording {
    seen: Vec<(usize, String, usize)>,
    stop_after: Option<(usize, StopHandle)>,
}

impl FrameSink for Recording {
    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        assert_eq!(frame.sequence as usize, self.seen.len());
        self.seen.push((frame.generation, frame.scene.label().to_string(), frame.scene.len()));
        if let Some((n, handle)) = &self.stop_after {
            if self.seen.len() >= *n {
                handle.stop();
            }
        }
        Ok(())
    }
}

fn fast_config(dir: &Path, generations: usize) -> VizConfig {
    VizConfig {
        data_dir: dir.to_path_buf(),
        generations,
        interval_ms: 1,
        transition_ms: 1,
        retry_backoff_ms: 1,
        layout_ticks: 10,
        ..VizConfig::default()
    }
}

fn write_generation(dir: &Path, g: usize, rows: usize) {
    let path = dir.join(format!("generations/generation_{g:02}.csv"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut body = String::from("Surname,Count,Nationality\n");
    for i in 0..rows {
        body.push_str(&format!("Name{i},{},English\n", (i + 1) * 3));
    }
    // rename so a concurrent reader never sees a half-written file
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, body).unwrap();
    std::fs::rename(tmp, path).unwrap();
}

fn generations(sink: &Recording) -> Vec<usize> {
    sink.seen.iter().map(|s| s.0).collect()
}

#[tokio::test]
async fn cycles_through_generations_and_wraps() {
    let dir = tempfile::tempdir().unwrap();
    for g in 0..3 {
        write_generation(dir.path(), g, g + 1);
    }
    let mut animator = Animator::from_config(&fast_config(dir.path(), 3), Recording::default())
        .unwrap()
        .with_max_frames(Some(7));
    let (_handle, signal) = stop_channel();
    let (state, stats) = animator.run(signal).await.unwrap();

    assert_eq!(stats.frames, 7);
    assert_eq!(stats.load_failures, 0);
    assert_eq!(state.generation_index, 1);
    assert!(!state.running);

    let sink = animator.into_sink();
    assert_eq!(generations(&sink), vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(sink.seen[0].1, "Generation 0");
    assert_eq!(sink.seen[2], (2, "Generation 2".to_string(), 3));
    assert_eq!(sink.seen[3].2, 1);
}

#[tokio::test]
async fn skip_policy_moves_past_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    write_generation(dir.path(), 0, 2);
    write_generation(dir.path(), 2, 2);
    let cfg = VizConfig { on_load_error: LoadFailurePolicy::Skip, ..fast_config(dir.path(), 3) };
    let mut animator = Animator::from_config(&cfg, Recording::default()).unwrap().with_max_frames(Some(4));
    let (_handle, signal) = stop_channel();
    let (_, stats) = animator.run(signal).await.unwrap();

    assert_eq!(generations(animator.sink()), vec![0, 2, 0, 2]);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.load_failures, 2);
}

#[tokio::test]
async fn retry_policy_retries_then_skips() {
    let dir = tempfile::tempdir().unwrap();
    write_generation(dir.path(), 0, 2);
    write_generation(dir.path(), 2, 2);
    let cfg = VizConfig { on_load_error: LoadFailurePolicy::Retry, max_retries: 2, ..fast_config(dir.path(), 3) };
    let mut animator = Animator::from_config(&cfg, Recording::default()).unwrap().with_max_frames(Some(2));
    let (_handle, signal) = stop_channel();
    let (_, stats) = animator.run(signal).await.unwrap();

    assert_eq!(generations(animator.sink()), vec![0, 2]);
    // first attempt plus two retries
    assert_eq!(stats.load_failures, 3);
    assert_eq!(stats.skipped, 1);
}

#[tokio::test]
async fn retry_picks_up_a_file_that_appears_later() {
    let dir = tempfile::tempdir().unwrap();
    write_generation(dir.path(), 0, 1);
    let cfg = VizConfig { max_retries: 1000, retry_backoff_ms: 5, ..fast_config(dir.path(), 2) };
    let mut animator = Animator::from_config(&cfg, Recording::default()).unwrap().with_max_frames(Some(2));

    let late = dir.path().to_path_buf();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        write_generation(&late, 1, 4);
    });
    let (_handle, signal) = stop_channel();
    let (_, stats) = animator.run(signal).await.unwrap();
    writer.await.unwrap();

    assert_eq!(generations(animator.sink()), vec![0, 1]);
    assert_eq!(animator.sink().seen[1].2, 4);
    assert!(stats.load_failures >= 1);
    assert_eq!(stats.skipped, 0);
}

#[tokio::test]
async fn stop_handle_ends_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    for g in 0..3 {
        write_generation(dir.path(), g, 2);
    }
    let (handle, signal) = stop_channel();
    let sink = Recording { stop_after: Some((2, handle)), ..Recording::default() };
    let mut animator = Animator::from_config(&fast_config(dir.path(), 3), sink).unwrap();
    let (state, stats) = animator.run(signal).await.unwrap();

    assert_eq!(stats.frames, 2);
    assert_eq!(state.generation_index, 2);
    assert!(!state.running);
}

#[tokio::test]
async fn stopped_before_start_presents_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_generation(dir.path(), 0, 1);
    let (handle, signal) = stop_channel();
    handle.stop();
    let mut animator = Animator::from_config(&fast_config(dir.path(), 1), Recording::default()).unwrap();
    let (_, stats) = animator.run(signal).await.unwrap();
    assert_eq!(stats.frames, 0);
    assert!(animator.sink().seen.is_empty());
}

#[tokio::test]
async fn fails_when_no_generation_loads() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = VizConfig { on_load_error: LoadFailurePolicy::Skip, ..fast_config(dir.path(), 4) };
    let mut animator = Animator::from_config(&cfg, Recording::default()).unwrap();
    let (_handle, signal) = stop_channel();
    let err = animator.run(signal).await.unwrap_err();
    assert!(err.to_string().contains("full cycle"), "{err}");
    assert!(animator.sink().seen.is_empty());
}

#[tokio::test]
async fn empty_generation_is_presented_with_zero_bubbles() {
    let dir = tempfile::tempdir().unwrap();
    write_generation(dir.path(), 0, 3);
    write_generation(dir.path(), 1, 0);
    let mut animator = Animator::from_config(&fast_config(dir.path(), 2), Recording::default())
        .unwrap()
        .with_max_frames(Some(2));
    let (_handle, signal) = stop_channel();
    animator.run(signal).await.unwrap();
    assert_eq!(animator.sink().seen[1], (1, "Generation 1".to_string(), 0));
}
