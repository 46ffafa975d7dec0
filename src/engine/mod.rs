//! Encoding engine collaborator.
//!
//! The engine owns decoding, filtering, muxing and compression. This crate only
//! submits jobs, starts and stops sessions, and polls their state; every call
//! here is expected to return promptly (the engine runs its own workers).

mod job;
mod state;

pub use job::{JobDescription, MuxFamily, Muxer, PTS_PER_SECOND, SharedJob};
pub use state::{EnginePhase, EngineState, RateEstimate};

use crate::error::AppError;

/// Opaque engine session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Job registered on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub u64);

pub trait Engine: Send + Sync {
    /// Decode and filter one frame at 1-based `seek_point` into `out`
    /// (`job.width * job.height * 4` bytes, host-order 32-bit ARGB words).
    fn extract_preview_frame(
        &self,
        session: SessionId,
        job: &JobDescription,
        seek_point: u32,
        out: &mut [u8],
    ) -> Result<(), AppError>;

    /// Open an isolated session logging at `verbosity`.
    fn open_session(&self, verbosity: u8) -> Result<SessionId, AppError>;

    fn submit_job(&self, session: SessionId, job: &JobDescription) -> Result<JobId, AppError>;

    /// Clear per-job bookkeeping the engine attached during submission.
    fn reset_job_bookkeeping(&self, job: &mut JobDescription);

    fn start_session(&self, session: SessionId) -> Result<(), AppError>;

    /// Request an asynchronous stop; completion shows up as `WorkDone`.
    fn stop_session(&self, session: SessionId);

    fn query_state(&self, session: SessionId) -> EngineState;

    /// First job still registered on the session's shared handle.
    fn next_registered_job(&self, session: SessionId) -> Option<JobId>;

    fn remove_job(&self, session: SessionId, job: JobId);

    fn close_session(&self, session: SessionId);

    fn inhibit_system_sleep(&self, session: SessionId);

    fn allow_system_sleep(&self, session: SessionId);
}
