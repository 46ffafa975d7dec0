//! Still preview images, generated on first request and kept until purged.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::engine::{Engine, SessionId, SharedJob};
use crate::error::AppError;
use crate::pixels::{PackedImage, PixelBufferConverter};

/// One generated preview frame. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub index: u32,
    pub image: PackedImage,
}

impl PreviewImage {
    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Alpha-first packed pixels (leading byte unused).
    pub fn pixels(&self) -> &[u8] {
        &self.image.data
    }

    pub fn to_rgb24(&self) -> Vec<u8> {
        self.image.to_rgb24()
    }
}

struct CacheInner {
    images: HashMap<u32, Arc<PreviewImage>>,
    converter: PixelBufferConverter,
}

/// Maps a zero-based preview index to its image.
///
/// Misses are generated while the cache lock is held, so concurrent requests
/// for the same index cost a single engine extraction.
pub struct PreviewImageCache {
    engine: Arc<dyn Engine>,
    scan_session: SessionId,
    job: SharedJob,
    capacity: u32,
    deinterlace: AtomicBool,
    inner: Mutex<CacheInner>,
}

impl PreviewImageCache {
    pub fn new(
        engine: Arc<dyn Engine>,
        scan_session: SessionId,
        job: SharedJob,
        capacity: u32,
        deinterlace: bool,
    ) -> Self {
        Self {
            engine,
            scan_session,
            job,
            capacity,
            deinterlace: AtomicBool::new(deinterlace),
            inner: Mutex::new(CacheInner {
                images: HashMap::new(),
                converter: PixelBufferConverter::new(),
            }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn deinterlace(&self) -> bool {
        self.deinterlace.load(Ordering::Relaxed)
    }

    /// Change the deinterlace override. Cached images were made with the old
    /// setting, so a change purges them.
    pub fn set_deinterlace(&self, enabled: bool) {
        if self.deinterlace.swap(enabled, Ordering::Relaxed) != enabled {
            self.purge();
        }
    }

    /// Image for `index`, generating and caching it on a miss.
    /// `Ok(None)` when `index` is outside the preview set.
    pub fn image_at_index(&self, index: u32) -> Result<Option<Arc<PreviewImage>>, AppError> {
        self.lookup(index, true)
    }

    /// Like `image_at_index`, but a miss is not stored.
    pub fn image_at_index_uncached(
        &self,
        index: u32,
    ) -> Result<Option<Arc<PreviewImage>>, AppError> {
        self.lookup(index, false)
    }

    pub fn purge(&self) {
        let mut inner = self.inner.lock();
        let count = inner.images.len();
        inner.images.clear();
        log::debug!(
            target: "tiny_preview::image_cache",
            "purged {} cached preview(s)",
            count
        );
    }

    fn lookup(&self, index: u32, store: bool) -> Result<Option<Arc<PreviewImage>>, AppError> {
        if index >= self.capacity {
            return Ok(None);
        }
        let mut inner = self.inner.lock();
        if let Some(image) = inner.images.get(&index) {
            return Ok(Some(Arc::clone(image)));
        }
        let image = Arc::new(PreviewImage {
            index,
            image: self.extract(&mut inner.converter, index)?,
        });
        if store {
            inner.images.insert(index, Arc::clone(&image));
        }
        Ok(Some(image))
    }

    fn extract(
        &self,
        converter: &mut PixelBufferConverter,
        index: u32,
    ) -> Result<PackedImage, AppError> {
        let mut job = self.job.lock();
        let (width, height) = (job.width, job.height);
        if width == 0 || height == 0 {
            return Err(AppError::InvalidDimensions { width, height });
        }

        // The job lock stays held until the original setting is back.
        let saved_deinterlace = job.deinterlace;
        if self.deinterlace() {
            job.deinterlace = true;
        }
        log::debug!(
            target: "tiny_preview::image_cache",
            "extracting preview {} ({}x{}, deinterlace={})",
            index,
            width,
            height,
            job.deinterlace
        );
        let result = converter.fill_and_convert(width, height, |raw| {
            self.engine
                .extract_preview_frame(self.scan_session, &job, index + 1, raw)
        });
        job.deinterlace = saved_deinterlace;

        if let Err(ref e) = result {
            log::warn!(
                target: "tiny_preview::image_cache",
                "preview {} extraction failed: {}",
                index,
                e
            );
        }
        result
    }
}
