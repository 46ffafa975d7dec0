//! Preview movie encode: job submission, polling and teardown.
//!
//! `start_preview_encode` returns as soon as the engine has accepted the job.
//! From then on a single tokio task polls the isolated session every
//! `poll_interval`; the next tick is only awaited after the previous one has
//! been handled, so ticks never overlap. Progress, completion and failure
//! reach the host through its `PreviewObserver`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::session::ActiveSession;
use super::{EncodeState, PreviewObserver, ProgressReport};
use crate::engine::{Engine, EnginePhase, SharedJob};
use crate::error::AppError;
use crate::job_builder::PreviewJobBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Finished,
}

enum Notification {
    Progress(ProgressReport),
    Ready(PathBuf),
    Failed(AppError),
}

struct ControllerInner {
    state: EncodeState,
    session: Option<ActiveSession>,
    destination: Option<PathBuf>,
    poll_task: Option<JoinHandle<()>>,
}

/// State shared between the controller and its poll task.
struct Shared {
    observer: Arc<dyn PreviewObserver>,
    inner: Mutex<ControllerInner>,
}

impl Shared {
    fn poll_tick(&self) -> TickOutcome {
        let mut inner = self.inner.lock();
        let Some(state) = inner.session.as_ref().map(ActiveSession::query) else {
            inner.poll_task = None;
            return TickOutcome::Finished;
        };

        let (outcome, notification) = match state.phase {
            EnginePhase::Idle
            | EnginePhase::Scanning
            | EnginePhase::ScanDone
            | EnginePhase::Paused => (TickOutcome::Continue, None),
            EnginePhase::Working | EnginePhase::Muxing => (
                TickOutcome::Continue,
                ProgressReport::from_engine_state(&state).map(Notification::Progress),
            ),
            EnginePhase::WorkDone => {
                // Dropping the session removes leftover jobs and closes it.
                if let Some(mut session) = inner.session.take() {
                    session.allow_sleep();
                }
                inner.poll_task = None;
                let prior = std::mem::replace(&mut inner.state, EncodeState::Idle);
                let notification = match prior {
                    EncodeState::Cancelled => {
                        log::info!(target: "tiny_preview::encode", "preview encode cancelled");
                        None
                    }
                    EncodeState::Working | EncodeState::Idle if state.error_code != 0 => {
                        log::error!(
                            target: "tiny_preview::encode",
                            "preview encode failed (engine error {})",
                            state.error_code
                        );
                        Some(Notification::Failed(AppError::EncodeFailed {
                            code: state.error_code,
                        }))
                    }
                    EncodeState::Working | EncodeState::Idle => {
                        inner.destination.clone().map(|path| {
                            log::info!(
                                target: "tiny_preview::encode",
                                "preview movie ready at {}",
                                path.display()
                            );
                            Notification::Ready(path)
                        })
                    }
                };
                (TickOutcome::Finished, notification)
            }
        };
        drop(inner);

        match notification {
            Some(Notification::Progress(report)) => self.observer.on_progress(&report),
            Some(Notification::Ready(path)) => self.observer.on_movie_ready(&path),
            Some(Notification::Failed(error)) => self.observer.on_movie_failed(&error),
            None => {}
        }
        outcome
    }
}

async fn poll_loop(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first poll happens one period after start.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if shared.poll_tick() == TickOutcome::Finished {
            break;
        }
    }
}

/// Settings the controller reads once at construction.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub verbosity: u8,
    pub poll_interval: Duration,
}

/// Drives at most one preview movie encode at a time.
pub struct PreviewEncodeController {
    engine: Arc<dyn Engine>,
    job: SharedJob,
    builder: PreviewJobBuilder,
    settings: ControllerSettings,
    runtime: Handle,
    shared: Arc<Shared>,
}

impl PreviewEncodeController {
    pub fn new(
        engine: Arc<dyn Engine>,
        job: SharedJob,
        builder: PreviewJobBuilder,
        settings: ControllerSettings,
        observer: Arc<dyn PreviewObserver>,
        runtime: Handle,
    ) -> Self {
        Self {
            engine,
            job,
            builder,
            settings,
            runtime,
            shared: Arc::new(Shared {
                observer,
                inner: Mutex::new(ControllerInner {
                    state: EncodeState::Idle,
                    session: None,
                    destination: None,
                    poll_task: None,
                }),
            }),
        }
    }

    pub fn state(&self) -> EncodeState {
        self.shared.inner.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.state() != EncodeState::Idle
    }

    /// Output path of the current or most recent encode.
    pub fn destination(&self) -> Option<PathBuf> {
        self.shared.inner.lock().destination.clone()
    }

    /// Start encoding `duration_seconds` of preview starting at zero-based `index`.
    ///
    /// `Ok` means the engine accepted and started the job; the outcome arrives
    /// through the observer. Precondition failures leave the engine untouched.
    pub fn start_preview_encode(&self, index: u32, duration_seconds: u32) -> Result<(), AppError> {
        let mut inner = self.shared.inner.lock();
        if inner.state != EncodeState::Idle {
            log::warn!(
                target: "tiny_preview::encode",
                "rejecting preview encode: {:?} in progress",
                inner.state
            );
            return Err(AppError::EncodeInProgress);
        }
        let base = self.job.lock().clone();
        let spec = self.builder.build(&base, index, duration_seconds)?;
        log::info!(
            target: "tiny_preview::encode",
            "starting preview encode: seek point {}/{}, {}s -> {}",
            spec.start_preview_index,
            spec.seek_point_count,
            duration_seconds,
            spec.destination.display()
        );

        let mut session = ActiveSession::open(Arc::clone(&self.engine), self.settings.verbosity)?;
        if base.indepth_scan {
            let mut scan = base.subtitle_prescan();
            spec.apply_to(&mut scan);
            session.submit(&scan)?;
        }
        let mut job = base.single_pass_preview();
        spec.apply_to(&mut job);
        session.submit(&job)?;
        self.engine.reset_job_bookkeeping(&mut job);

        session.inhibit_sleep();
        session.start()?;

        inner.state = EncodeState::Working;
        inner.session = Some(session);
        inner.destination = Some(spec.destination);
        inner.poll_task = Some(
            self.runtime
                .spawn(poll_loop(Arc::clone(&self.shared), self.settings.poll_interval)),
        );
        Ok(())
    }

    /// Ask the engine to stop the running encode. Returns whether a stop was requested.
    ///
    /// Completion is observed by a later poll tick; a cancelled encode ends
    /// without `on_movie_ready`.
    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.state != EncodeState::Working {
            return false;
        }
        let Some(session) = inner.session.as_mut() else {
            return false;
        };
        if !session.query().is_active() {
            return false;
        }
        session.stop();
        session.allow_sleep();
        inner.state = EncodeState::Cancelled;
        log::info!(target: "tiny_preview::encode", "preview encode cancel requested");
        true
    }
}

impl Drop for PreviewEncodeController {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        if let Some(task) = inner.poll_task.take() {
            task.abort();
        }
        if let Some(session) = inner.session.take() {
            log::info!(
                target: "tiny_preview::encode",
                "tearing down preview session {:?} on shutdown",
                session.id()
            );
            drop(session);
        }
        inner.state = EncodeState::Idle;
    }
}
