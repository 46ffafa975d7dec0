#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tiny_preview_core::engine::{JobDescription, Muxer, SharedJob};
use tiny_preview_core::test_support::{FakeEngine, RecordingObserver, SCAN_SESSION};
use tiny_preview_core::{PreviewGenerator, PreviewPreferences};

pub const POLL: Duration = Duration::from_millis(500);

/// Generator over a fake engine with scratch output under a private temp dir.
pub struct PreviewEnv {
    pub engine: Arc<FakeEngine>,
    pub observer: Arc<RecordingObserver>,
    pub job: SharedJob,
    pub generator: PreviewGenerator,
    root: tempfile::TempDir,
}

impl PreviewEnv {
    pub fn new(preview_count: u32) -> Self {
        Self::with_job(preview_count, default_job())
    }

    pub fn with_job(preview_count: u32, job: JobDescription) -> Self {
        let root = tempfile::tempdir().expect("create scratch root");
        Self::in_root(preview_count, job, root, None)
    }

    /// Generator over an existing scratch root, optionally overriding the
    /// stale scratch directory age.
    pub fn in_root(
        preview_count: u32,
        job: JobDescription,
        root: tempfile::TempDir,
        scratch_max_age_secs: Option<u64>,
    ) -> Self {
        let prefs_json = serde_json::json!({
            "previewCount": preview_count,
            "loggingLevel": 1,
            "scratchRoot": root.path(),
            "scratchMaxAgeSecs": scratch_max_age_secs,
        });
        let prefs = PreviewPreferences::from_json_str(&prefs_json.to_string())
            .expect("parse preferences");
        let engine = Arc::new(FakeEngine::new());
        let observer = Arc::new(RecordingObserver::default());
        let job = job.into_shared();
        let generator = PreviewGenerator::new(
            engine.clone(),
            SCAN_SESSION,
            Arc::clone(&job),
            &prefs,
            observer.clone(),
            tokio::runtime::Handle::current(),
        );
        Self {
            engine,
            observer,
            job,
            generator,
            root,
        }
    }

    pub fn scratch_root(&self) -> &Path {
        self.root.path()
    }
}

pub fn default_job() -> JobDescription {
    JobDescription {
        muxer: Muxer::Mp4,
        width: 16,
        height: 9,
        pass_count: 2,
        ..JobDescription::default()
    }
}

/// Let `n` poll ticks elapse on a paused clock.
pub async fn advance_ticks(n: u32) {
    tokio::time::sleep(POLL * n + POLL / 4).await;
}
