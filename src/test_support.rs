//! Scripted engine and recording observer for unit and integration tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::encode::{PreviewObserver, ProgressReport};
use crate::engine::{
    Engine, EnginePhase, EngineState, JobDescription, JobId, SessionId,
};
use crate::error::AppError;

/// Scan session id the fake treats as the host's scanning session.
pub const SCAN_SESSION: SessionId = SessionId(0);

/// Everything the fake was asked to do, in call order where it matters.
#[derive(Debug, Default, Clone)]
pub struct EngineCalls {
    /// (seek point, deinterlace flag seen by the engine)
    pub extractions: Vec<(u32, bool)>,
    pub opened: Vec<(SessionId, u8)>,
    pub submitted: Vec<(SessionId, JobDescription)>,
    pub resets: usize,
    pub started: Vec<SessionId>,
    pub stopped: Vec<SessionId>,
    pub closed: Vec<SessionId>,
    pub removed_jobs: Vec<(SessionId, JobId)>,
    pub sleep_inhibits: usize,
    pub sleep_allows: usize,
}

#[derive(Default)]
struct FakeState {
    calls: EngineCalls,
    script: VecDeque<EngineState>,
    current: EngineState,
    registered: HashMap<SessionId, Vec<JobId>>,
}

/// In-memory engine. Frames are a deterministic pattern of the seek point and
/// pixel position; session states come from a script the test pushes.
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<FakeState>,
    next_id: AtomicU64,
    pub fail_open: AtomicBool,
    pub fail_submit: AtomicBool,
    /// Submissions accepted before every later one is rejected.
    pub accepted_submits: AtomicUsize,
    pub fail_start: AtomicBool,
    pub fail_extract: AtomicBool,
    /// Leave submitted jobs registered after the session finishes.
    pub keep_jobs_registered: AtomicBool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            accepted_submits: AtomicUsize::new(usize::MAX),
            keep_jobs_registered: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// Host-order ARGB word the fake writes for a pixel.
    pub fn pixel_word(seek_point: u32, x: u32, y: u32) -> u32 {
        0x8000_0000 | ((seek_point & 0xff) << 16) | ((x & 0xff) << 8) | (y & 0xff)
    }

    /// Queue states returned by successive `query_state` calls. The last
    /// state repeats once the queue is empty.
    pub fn push_states(&self, states: impl IntoIterator<Item = EngineState>) {
        self.state.lock().script.extend(states);
    }

    pub fn push_phase(&self, phase: EnginePhase) {
        self.push_states([EngineState::with_phase(phase)]);
    }

    pub fn calls(&self) -> EngineCalls {
        self.state.lock().calls.clone()
    }

    pub fn registered_jobs(&self) -> usize {
        self.state.lock().registered.values().map(Vec::len).sum()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Engine for FakeEngine {
    fn extract_preview_frame(
        &self,
        _session: SessionId,
        job: &JobDescription,
        seek_point: u32,
        out: &mut [u8],
    ) -> Result<(), AppError> {
        self.state
            .lock()
            .calls
            .extractions
            .push((seek_point, job.deinterlace));
        if self.fail_extract.load(Ordering::Relaxed) {
            return Err(AppError::engine("extract", "decode error"));
        }
        let width = job.width as usize;
        for (i, px) in out.chunks_exact_mut(4).enumerate() {
            let (x, y) = ((i % width) as u32, (i / width) as u32);
            px.copy_from_slice(&Self::pixel_word(seek_point, x, y).to_ne_bytes());
        }
        Ok(())
    }

    fn open_session(&self, verbosity: u8) -> Result<SessionId, AppError> {
        if self.fail_open.load(Ordering::Relaxed) {
            return Err(AppError::engine("open", "no handle"));
        }
        let id = SessionId(self.next_id());
        let mut state = self.state.lock();
        state.calls.opened.push((id, verbosity));
        state.current = EngineState::with_phase(EnginePhase::Idle);
        Ok(id)
    }

    fn submit_job(&self, session: SessionId, job: &JobDescription) -> Result<JobId, AppError> {
        let mut state = self.state.lock();
        if self.fail_submit.load(Ordering::Relaxed)
            || state.calls.submitted.len() >= self.accepted_submits.load(Ordering::Relaxed)
        {
            return Err(AppError::engine("submit", "rejected"));
        }
        let id = JobId(self.next_id());
        state.calls.submitted.push((session, job.clone()));
        state.registered.entry(session).or_default().push(id);
        Ok(id)
    }

    fn reset_job_bookkeeping(&self, _job: &mut JobDescription) {
        self.state.lock().calls.resets += 1;
    }

    fn start_session(&self, session: SessionId) -> Result<(), AppError> {
        if self.fail_start.load(Ordering::Relaxed) {
            return Err(AppError::engine("start", "busy"));
        }
        self.state.lock().calls.started.push(session);
        Ok(())
    }

    fn stop_session(&self, session: SessionId) {
        let mut state = self.state.lock();
        state.calls.stopped.push(session);
        if state.current.phase != EnginePhase::WorkDone {
            state.script.clear();
            state.script.push_back(EngineState::with_phase(EnginePhase::WorkDone));
        }
    }

    fn query_state(&self, _session: SessionId) -> EngineState {
        let mut state = self.state.lock();
        if let Some(next) = state.script.pop_front() {
            state.current = next;
        }
        if state.current.phase == EnginePhase::WorkDone
            && !self.keep_jobs_registered.load(Ordering::Relaxed)
        {
            state.registered.clear();
        }
        state.current
    }

    fn next_registered_job(&self, session: SessionId) -> Option<JobId> {
        self.state
            .lock()
            .registered
            .get(&session)
            .and_then(|jobs| jobs.first().copied())
    }

    fn remove_job(&self, session: SessionId, job: JobId) {
        let mut state = self.state.lock();
        if let Some(jobs) = state.registered.get_mut(&session) {
            jobs.retain(|j| *j != job);
        }
        state.calls.removed_jobs.push((session, job));
    }

    fn close_session(&self, session: SessionId) {
        let mut state = self.state.lock();
        state.calls.closed.push(session);
        state.registered.remove(&session);
        state.script.clear();
    }

    fn inhibit_system_sleep(&self, _session: SessionId) {
        self.state.lock().calls.sleep_inhibits += 1;
    }

    fn allow_system_sleep(&self, _session: SessionId) {
        self.state.lock().calls.sleep_allows += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Progress(ProgressReport),
    Ready(PathBuf),
    Failed(String),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().clone()
    }

    pub fn progress(&self) -> Vec<ProgressReport> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::Progress(report) => Some(report),
                _ => None,
            })
            .collect()
    }

    pub fn ready_paths(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::Ready(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

impl PreviewObserver for RecordingObserver {
    fn on_progress(&self, report: &ProgressReport) {
        self.events.lock().push(ObserverEvent::Progress(report.clone()));
    }

    fn on_movie_ready(&self, path: &Path) {
        self.events.lock().push(ObserverEvent::Ready(path.to_path_buf()));
    }

    fn on_movie_failed(&self, error: &AppError) {
        self.events.lock().push(ObserverEvent::Failed(error.to_string()));
    }
}

/// Working state at `progress` with no rate estimate.
pub fn working(progress: f32) -> EngineState {
    EngineState {
        progress,
        ..EngineState::with_phase(EnginePhase::Working)
    }
}
