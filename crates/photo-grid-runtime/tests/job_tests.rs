use image::{Rgb, RgbImage};
use photo_grid_runtime::*;
use std::path::{Path, PathBuf};

fn create_test_images(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("shot-{i}.png"));
            RgbImage::from_pixel(64, 48, Rgb([(i as u8).wrapping_mul(30), 90, 160]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

fn config() -> GridConfig {
    GridConfig {
        dpi: 36.0,
        ..Default::default()
    }
}

async fn drain(job: &mut GenerationJob) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Some(event) = job.next_event().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_job_completes_with_monotonic_progress() {
    let dir = tempfile::tempdir().unwrap();
    let images = create_test_images(dir.path(), 5);
    let dest = dir.path().join("sheet.pdf");

    let mut job = GenerationJob::start(images, config(), &dest);
    let events = drain(&mut job).await;
    let summary = job.wait().await.unwrap();

    assert_eq!(summary.page_count, 2);
    assert_eq!(summary.placed, 5);

    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Progress { processed, total } => Some((*processed, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, (1..=5).map(|n| (n, 5)).collect::<Vec<_>>());

    match events.last() {
        Some(JobEvent::Completed(done)) => assert_eq!(done.output_path, dest),
        other => panic!("Expected Completed, got {other:?}"),
    }

    let doc = lopdf::Document::load(&dest).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn test_cancelled_job_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let images = create_test_images(dir.path(), 3);
    let dest = dir.path().join("never.pdf");

    let token = CancelToken::new();
    token.cancel();
    let mut job = GenerationJob::spawn(images, config(), &dest, token);

    let events = drain(&mut job).await;
    let result = job.wait().await;

    assert!(matches!(result, Err(GridError::Cancelled)));
    assert!(matches!(events.last(), Some(JobEvent::Cancelled)));
    assert!(!events.iter().any(|e| matches!(e, JobEvent::Progress { .. })));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_cancel_mid_job_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let scratch_parent = tempfile::tempdir().unwrap();
    let images = create_test_images(dir.path(), 16);
    let dest = dir.path().join("interrupted.pdf");

    // Large cells keep each resample busy long enough to cancel in between
    let mut config = config();
    config.dpi = 150.0;

    let mut job = GenerationJob::spawn_in(
        images,
        config,
        &dest,
        CancelToken::new(),
        scratch_parent.path(),
    );

    let mut events = Vec::new();
    while let Some(event) = job.next_event().await {
        if matches!(event, JobEvent::Progress { processed: 1, .. }) {
            job.cancel();
        }
        events.push(event);
    }
    let result = job.wait().await;

    assert!(matches!(result, Err(GridError::Cancelled)));
    assert!(matches!(events.last(), Some(JobEvent::Cancelled)));
    let processed = events
        .iter()
        .filter(|e| matches!(e, JobEvent::Progress { .. }))
        .count();
    assert!(processed >= 1 && processed < 16);

    assert!(!dest.exists());
    let leftovers: Vec<_> = std::fs::read_dir(scratch_parent.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(leftovers.is_empty(), "scratch left behind: {leftovers:?}");
}

#[tokio::test]
async fn test_skipped_images_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut images = create_test_images(dir.path(), 2);
    let broken = dir.path().join("broken.jpeg");
    std::fs::write(&broken, b"\xff\xd8 truncated").unwrap();
    images.push(broken.clone());

    let mut job = GenerationJob::start(images, config(), dir.path().join("partial.pdf"));
    let events = drain(&mut job).await;
    let summary = job.wait().await.unwrap();

    assert_eq!(summary.placed, 2);
    assert_eq!(summary.skipped.len(), 1);

    let skipped: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Skipped(s) => Some(s.path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![broken]);

    // Skipped images still count towards progress
    assert!(events.iter().any(|e| matches!(
        e,
        JobEvent::Progress {
            processed: 3,
            total: 3
        }
    )));
}

#[tokio::test]
async fn test_invalid_config_fails_job() {
    let dir = tempfile::tempdir().unwrap();
    let images = create_test_images(dir.path(), 1);
    let dest = dir.path().join("invalid.pdf");

    let mut config = config();
    config.rows = 0;
    let mut job = GenerationJob::start(images, config, &dest);

    let events = drain(&mut job).await;
    assert!(matches!(job.wait().await, Err(GridError::Config(_))));
    match events.as_slice() {
        [JobEvent::Failed { message }] => assert!(message.contains("Invalid configuration")),
        other => panic!("Expected a single Failed event, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn test_cancel_token_is_shared() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());
    token.cancel();
    assert!(other.is_cancelled());
}
