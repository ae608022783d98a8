use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use virtual_mirror::core::metrics::POSE_LANDMARK_COUNT;
use virtual_mirror::{
    AdjustmentRanges, Adjustments, CanvasSize, DetectionOutcome, DetectionResult, FitEngine,
    GarmentDimensions, Landmark, MirrorConfig, MirrorError, MirrorSession, PhotoFrame,
    PoseDetector, ReplayDetector, SessionConfig,
};

fn pose(left_x: f64, right_x: f64) -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::new(0.5, 0.5); POSE_LANDMARK_COUNT];
    landmarks[11] = Landmark::new(left_x, 0.3);
    landmarks[12] = Landmark::new(right_x, 0.3);
    landmarks[23] = Landmark::new(left_x + 0.05, 0.6);
    landmarks[24] = Landmark::new(right_x - 0.05, 0.6);
    landmarks
}

fn frame(id: &str) -> PhotoFrame {
    PhotoFrame::new(id, CanvasSize::new(800.0, 1000.0))
}

/// Detector with a per-frame delay and result, counting releases.
struct ScriptedDetector {
    script: HashMap<String, (Duration, DetectionResult)>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    fn new(closed: Arc<AtomicUsize>) -> Self {
        Self {
            script: HashMap::new(),
            closed,
        }
    }

    fn with(mut self, id: &str, delay: Duration, result: DetectionResult) -> Self {
        self.script.insert(id.to_string(), (delay, result));
        self
    }
}

#[async_trait]
impl PoseDetector for ScriptedDetector {
    async fn detect(&self, frame: &PhotoFrame) -> virtual_mirror::Result<DetectionResult> {
        let (delay, result) = self
            .script
            .get(&frame.id)
            .cloned()
            .ok_or_else(|| MirrorError::DetectorError {
                message: format!("unknown frame {}", frame.id),
            })?;
        tokio::time::sleep(delay).await;
        Ok(result)
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

fn config_with_timeout(timeout: Duration) -> SessionConfig {
    SessionConfig {
        detection_timeout: timeout,
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn test_slow_old_detection_does_not_overwrite_newer_one() -> Result<()> {
    let closed = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector::new(closed.clone())
        .with(
            "old",
            Duration::from_millis(80),
            DetectionResult::Landmarks(pose(0.2, 0.8)),
        )
        .with(
            "new",
            Duration::from_millis(5),
            DetectionResult::Landmarks(pose(0.35, 0.65)),
        );
    let mut session = MirrorSession::open(detector, SessionConfig::default());

    let old_ticket = session.begin_detection(frame("old"))?;
    let new_ticket = session.begin_detection(frame("new"))?;

    let old_task = {
        let detector = session.detector();
        let frame = old_ticket.frame().clone();
        tokio::spawn(async move { detector.detect(&frame).await })
    };
    let new_task = {
        let detector = session.detector();
        let frame = new_ticket.frame().clone();
        tokio::spawn(async move { detector.detect(&frame).await })
    };

    // 新的先回來
    let new_result = new_task.await?;
    let outcome = session.apply_detection(new_ticket, new_result)?;
    assert!(matches!(outcome, DetectionOutcome::Updated(_)));

    let old_result = old_task.await?;
    let outcome = session.apply_detection(old_ticket, old_result)?;
    assert_eq!(
        outcome,
        DetectionOutcome::Stale {
            generation: 1,
            current: 2
        }
    );

    let metrics = session.metrics().expect("metrics for newest frame");
    assert!((metrics.shoulder_width - 0.3).abs() < 1e-9);

    drop(session);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_detection_timeout_allows_retry() -> Result<()> {
    let closed = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector::new(closed.clone())
        .with(
            "hung",
            Duration::from_secs(30),
            DetectionResult::Landmarks(pose(0.3, 0.7)),
        )
        .with(
            "quick",
            Duration::from_millis(1),
            DetectionResult::Landmarks(pose(0.3, 0.7)),
        );
    let mut session = MirrorSession::open(detector, config_with_timeout(Duration::from_millis(20)));

    let err = session.detect(frame("hung")).await.unwrap_err();
    assert!(matches!(err, MirrorError::DetectionTimeout { .. }));
    assert!(err.is_retryable());
    assert!(session.metrics().is_none());

    let outcome = session.detect(frame("quick")).await?;
    assert!(matches!(outcome, DetectionOutcome::Updated(_)));
    assert_eq!(session.generation(), 2);
    Ok(())
}

#[tokio::test]
async fn test_garment_failure_keeps_previous_overlay() -> Result<()> {
    let closed = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector::new(closed).with(
        "me",
        Duration::ZERO,
        DetectionResult::Landmarks(pose(0.3, 0.7)),
    );
    let mut session = MirrorSession::open(detector, SessionConfig::default());
    session.detect(frame("me")).await?;
    session.load_garment(Ok(GarmentDimensions::new(400.0, 600.0)))?;
    let before = session.overlay()?.expect("overlay");

    let err = session
        .load_garment(Err(MirrorError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "truncated png",
        ))))
        .unwrap_err();
    assert!(matches!(err, MirrorError::GarmentLoadFailure { .. }));
    assert_eq!(
        err.user_friendly_message(),
        "Could not load dress image. Try uploading a local file."
    );

    let err = session
        .load_garment(Ok(GarmentDimensions::new(0.0, 600.0)))
        .unwrap_err();
    assert!(matches!(err, MirrorError::DegenerateGarmentDimensions { .. }));

    assert_eq!(session.garment(), Some(GarmentDimensions::new(400.0, 600.0)));
    assert_eq!(session.overlay()?, Some(before));
    Ok(())
}

#[tokio::test]
async fn test_adjustments_recompute_from_snapshot() -> Result<()> {
    let closed = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector::new(closed).with(
        "me",
        Duration::ZERO,
        DetectionResult::Landmarks(pose(0.3, 0.7)),
    );
    let mut session = MirrorSession::open(detector, SessionConfig::default());
    session.detect(frame("me")).await?;
    session.load_garment(Ok(GarmentDimensions::new(400.0, 600.0)))?;

    session.set_adjustments(Adjustments {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    });
    let base = session.overlay()?.expect("overlay").rect;

    // 來回調整後回到原值，結果必須完全相同
    session.set_scale(2.9);
    session.set_offset_x(-95.0);
    session.set_offset_y(180.0);
    let moved = session.overlay()?.expect("overlay").rect;
    assert!(moved.width > base.width);

    session.set_scale(1.0);
    session.set_offset_x(0.0);
    session.set_offset_y(0.0);
    assert_eq!(session.overlay()?.expect("overlay").rect, base);

    // 超出建議範圍也照用
    session.set_scale(5.0);
    let oversized = session.overlay()?.expect("overlay").rect;
    assert!((oversized.width - base.width * 5.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_rotation_only_when_enabled() -> Result<()> {
    let mut tilted = pose(0.3, 0.7);
    tilted[12] = Landmark::new(0.7, 0.34);

    for apply_rotation in [false, true] {
        let closed = Arc::new(AtomicUsize::new(0));
        let detector = ScriptedDetector::new(closed).with(
            "tilted",
            Duration::ZERO,
            DetectionResult::Landmarks(tilted.clone()),
        );
        let config = SessionConfig {
            apply_rotation,
            ..SessionConfig::default()
        };
        let mut session = MirrorSession::open(detector, config);
        session.detect(frame("tilted")).await?;
        session.load_garment(Ok(GarmentDimensions::new(400.0, 600.0)))?;

        let overlay = session.overlay()?.expect("overlay");
        match overlay.rotation {
            Some(rotation) => {
                assert!(apply_rotation);
                assert!(rotation.radians < 0.0);
            }
            None => assert!(!apply_rotation),
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_explicit_close_releases_detector_once() -> Result<()> {
    let closed = Arc::new(AtomicUsize::new(0));
    let session = MirrorSession::open(ScriptedDetector::new(closed.clone()), SessionConfig::default());
    session.close();
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_engine_with_replayed_landmarks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let landmarks = serde_json::json!({ "poseLandmarks": pose(0.3, 0.7) });
    tokio::fs::write(temp_dir.path().join("front.json"), landmarks.to_string()).await?;
    tokio::fs::write(temp_dir.path().join("empty.json"), r#"{"poseLandmarks":null}"#).await?;

    let config = MirrorConfig::from_toml_str(
        r#"
[adjustments]
scale = 1.5
offset_x = 0
offset_y = 0
"#,
    )?;
    let session = MirrorSession::open(
        ReplayDetector::new(temp_dir.path()),
        SessionConfig::from(&config),
    );
    let mut engine = FitEngine::new(session, AdjustmentRanges::default());

    let report = engine
        .run(frame("front"), Ok(GarmentDimensions::new(400.0, 600.0)))
        .await?;
    assert!((report.overlay.rect.width - 1056.0).abs() < 1e-9);
    assert!((report.overlay.rect.x - -128.0).abs() < 1e-9);
    assert!((report.overlay.rect.y - -16.8).abs() < 1e-9);
    assert!(report.out_of_range.is_empty());
    assert!(report.to_json()?.contains("\"frame\": \"front\""));

    let err = engine
        .run(frame("empty"), Ok(GarmentDimensions::new(400.0, 600.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::NoPoseDetected { .. }));
    assert!(engine.session().metrics().is_none());

    engine.close();
    Ok(())
}

#[tokio::test]
async fn test_engine_flags_out_of_range_adjustments() -> Result<()> {
    let closed = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector::new(closed).with(
        "me",
        Duration::ZERO,
        DetectionResult::Landmarks(pose(0.3, 0.7)),
    );
    let config = SessionConfig {
        adjustments: Adjustments {
            scale: 3.5,
            offset_x: 150.0,
            offset_y: 0.0,
        },
        ..SessionConfig::default()
    };
    let mut engine = FitEngine::new(
        MirrorSession::open(detector, config),
        AdjustmentRanges::default(),
    );

    let report = engine
        .run(frame("me"), Ok(GarmentDimensions::new(400.0, 600.0)))
        .await?;
    assert_eq!(report.out_of_range, vec!["scale", "offset_x"]);
    assert_eq!(report.adjustments.scale, 3.5);
    Ok(())
}
