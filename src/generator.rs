//! Per-title preview surface: still images and preview movies over one job.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::PreviewPreferences;
use crate::encode::{ControllerSettings, EncodeState, PreviewEncodeController, PreviewObserver};
use crate::engine::{Engine, SessionId, SharedJob};
use crate::error::AppError;
use crate::image_cache::{PreviewImage, PreviewImageCache};
use crate::job_builder::PreviewJobBuilder;
use crate::scratch::{ScratchDir, cleanup_stale_scratch_dirs};

pub struct PreviewGenerator {
    cache: PreviewImageCache,
    controller: PreviewEncodeController,
}

impl PreviewGenerator {
    /// `scan_session` is the host's scanning session used for still frames;
    /// movie encodes always run in their own session.
    pub fn new(
        engine: Arc<dyn Engine>,
        scan_session: SessionId,
        job: SharedJob,
        prefs: &PreviewPreferences,
        observer: Arc<dyn PreviewObserver>,
        runtime: Handle,
    ) -> Self {
        let capacity = prefs.effective_preview_count();
        let scratch_root = prefs.effective_scratch_root();
        cleanup_stale_scratch_dirs(&scratch_root, prefs.effective_scratch_max_age());
        let cache = PreviewImageCache::new(
            Arc::clone(&engine),
            scan_session,
            Arc::clone(&job),
            capacity,
            prefs.effective_deinterlace_previews(),
        );
        let builder =
            PreviewJobBuilder::new(ScratchDir::new(scratch_root), capacity);
        let settings = ControllerSettings {
            verbosity: prefs.effective_logging_level(),
            poll_interval: prefs.effective_poll_interval(),
        };
        let controller =
            PreviewEncodeController::new(engine, job, builder, settings, observer, runtime);
        log::debug!(
            target: "tiny_preview::generator",
            "preview generator ready: {} previews",
            capacity
        );
        Self { cache, controller }
    }

    pub fn image_count(&self) -> u32 {
        self.cache.capacity()
    }

    pub fn image_at_index(&self, index: u32) -> Result<Option<Arc<PreviewImage>>, AppError> {
        self.cache.image_at_index(index)
    }

    pub fn image_at_index_uncached(
        &self,
        index: u32,
    ) -> Result<Option<Arc<PreviewImage>>, AppError> {
        self.cache.image_at_index_uncached(index)
    }

    pub fn purge_image_cache(&self) {
        self.cache.purge();
    }

    pub fn set_deinterlace(&self, enabled: bool) {
        self.cache.set_deinterlace(enabled);
    }

    pub fn start_preview_encode(&self, index: u32, duration_seconds: u32) -> Result<(), AppError> {
        self.controller.start_preview_encode(index, duration_seconds)
    }

    pub fn cancel(&self) -> bool {
        self.controller.cancel()
    }

    pub fn encode_state(&self) -> EncodeState {
        self.controller.state()
    }

    pub fn movie_destination(&self) -> Option<PathBuf> {
        self.controller.destination()
    }
}
