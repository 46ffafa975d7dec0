//! Preview movie job derivation.

use std::path::PathBuf;

use crate::engine::{JobDescription, PTS_PER_SECOND};
use crate::error::AppError;
use crate::scratch::ScratchDir;

const PREVIEW_FILE_STEM: &str = "preview_temp";

/// Everything that turns a base job into a short preview encode.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewJobSpec {
    /// 1-based seek point the encode starts from.
    pub start_preview_index: u32,
    pub seek_point_count: u32,
    pub stop_after_pts: u64,
    pub container_extension: &'static str,
    pub destination: PathBuf,
}

impl PreviewJobSpec {
    pub fn apply_to(&self, job: &mut JobDescription) {
        job.start_at_preview = self.start_preview_index;
        job.seek_points = self.seek_point_count;
        job.pts_to_stop = self.stop_after_pts;
        job.destination = Some(self.destination.clone());
    }
}

pub fn stop_after_pts(duration_seconds: u32) -> u64 {
    u64::from(duration_seconds) * PTS_PER_SECOND
}

#[derive(Debug, Clone)]
pub struct PreviewJobBuilder {
    scratch: ScratchDir,
    capacity: u32,
}

impl PreviewJobBuilder {
    pub fn new(scratch: ScratchDir, capacity: u32) -> Self {
        Self { scratch, capacity }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Derive the spec for a preview starting at zero-based `index`.
    /// Removes any stale output left at the destination path.
    pub fn build(
        &self,
        base_job: &JobDescription,
        index: u32,
        duration_seconds: u32,
    ) -> Result<PreviewJobSpec, AppError> {
        if index >= self.capacity {
            return Err(AppError::InvalidIndex {
                index,
                capacity: self.capacity,
            });
        }
        let extension = base_job
            .muxer
            .preview_extension()
            .ok_or_else(|| AppError::UnsupportedContainer(base_job.muxer.name().to_string()))?;
        let destination = self
            .scratch
            .fresh_file(&format!("{}.{}", PREVIEW_FILE_STEM, extension))?;
        Ok(PreviewJobSpec {
            start_preview_index: index + 1,
            seek_point_count: self.capacity,
            stop_after_pts: stop_after_pts(duration_seconds),
            container_extension: extension,
            destination,
        })
    }
}
