use std::sync::Arc;

use crate::engine::{Engine, EngineState, JobDescription, JobId, SessionId};
use crate::error::AppError;

/// Isolated engine session owned by one preview encode attempt.
///
/// Dropping it stops the session, removes jobs still registered on it, closes
/// it and lifts any sleep inhibition, whichever path the attempt ends on.
pub(crate) struct ActiveSession {
    engine: Arc<dyn Engine>,
    id: SessionId,
    sleep_inhibited: bool,
}

impl ActiveSession {
    pub(crate) fn open(engine: Arc<dyn Engine>, verbosity: u8) -> Result<Self, AppError> {
        let id = engine.open_session(verbosity)?;
        log::debug!(
            target: "tiny_preview::encode",
            "opened preview session {:?} (verbosity {})",
            id,
            verbosity
        );
        Ok(Self {
            engine,
            id,
            sleep_inhibited: false,
        })
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn submit(&self, job: &JobDescription) -> Result<JobId, AppError> {
        let job_id = self.engine.submit_job(self.id, job)?;
        log::debug!(
            target: "tiny_preview::encode",
            "submitted {:?} to {:?} (indepth_scan={}, pass_id={})",
            job_id,
            self.id,
            job.indepth_scan,
            job.pass_id
        );
        Ok(job_id)
    }

    pub(crate) fn start(&self) -> Result<(), AppError> {
        self.engine.start_session(self.id)
    }

    pub(crate) fn stop(&self) {
        self.engine.stop_session(self.id);
    }

    pub(crate) fn query(&self) -> EngineState {
        self.engine.query_state(self.id)
    }

    pub(crate) fn inhibit_sleep(&mut self) {
        if !self.sleep_inhibited {
            self.engine.inhibit_system_sleep(self.id);
            self.sleep_inhibited = true;
        }
    }

    pub(crate) fn allow_sleep(&mut self) {
        if self.sleep_inhibited {
            self.engine.allow_system_sleep(self.id);
            self.sleep_inhibited = false;
        }
    }

    /// Remove jobs the engine left registered on the session's handle.
    pub(crate) fn drain_registered_jobs(&self) -> usize {
        let mut removed = 0;
        while let Some(job) = self.engine.next_registered_job(self.id) {
            self.engine.remove_job(self.id, job);
            removed += 1;
        }
        removed
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.allow_sleep();
        self.engine.stop_session(self.id);
        let removed = self.drain_registered_jobs();
        self.engine.close_session(self.id);
        log::debug!(
            target: "tiny_preview::encode",
            "closed preview session {:?} ({} job(s) removed)",
            self.id,
            removed
        );
    }
}
