mod controller;
mod progress;
mod session;

use std::path::Path;

pub use controller::{ControllerSettings, PreviewEncodeController};
pub use progress::{ProgressPhase, ProgressReport};

use crate::error::AppError;

/// Controller-wide encode state.
///
/// `Idle -> Working` once a job is accepted, `Working -> Cancelled` on cancel,
/// and both collapse back to `Idle` when the engine reports work done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeState {
    Idle,
    Working,
    Cancelled,
}

/// Receives preview movie events. Called from the poll task, never while the
/// controller's lock is held, so implementations may call back into it.
pub trait PreviewObserver: Send + Sync {
    fn on_progress(&self, report: &ProgressReport);

    fn on_movie_ready(&self, path: &Path);

    /// The engine finished with an error code. Cancellation is not a failure
    /// and produces no event at all.
    fn on_movie_failed(&self, error: &AppError) {
        log::warn!(
            target: "tiny_preview::encode",
            "preview movie failed: {}",
            error
        );
    }
}
