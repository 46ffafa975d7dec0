/// Session phase as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Scanning,
    ScanDone,
    Working,
    Paused,
    Muxing,
    WorkDone,
}

/// Snapshot returned by `Engine::query_state`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineState {
    pub phase: EnginePhase,
    /// Fraction of the current pass in [0, 1].
    pub progress: f32,
    pub rate_fps: f32,
    pub rate_avg_fps: f32,
    pub eta_hours: i32,
    pub eta_minutes: i32,
    /// Negative when the engine has no estimate yet.
    pub eta_seconds: i32,
    /// Non-zero when the session finished with an error.
    pub error_code: i32,
}

/// Throughput and remaining time, present only once the engine has an estimate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEstimate {
    pub fps: f32,
    pub avg_fps: f32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
}

impl EngineState {
    pub fn with_phase(phase: EnginePhase) -> Self {
        Self {
            phase,
            progress: 0.0,
            rate_fps: 0.0,
            rate_avg_fps: 0.0,
            eta_hours: 0,
            eta_minutes: 0,
            eta_seconds: -1,
            error_code: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            EnginePhase::Working | EnginePhase::Muxing | EnginePhase::Paused
        )
    }

    pub fn rate_estimate(&self) -> Option<RateEstimate> {
        if self.eta_seconds < 0 {
            return None;
        }
        Some(RateEstimate {
            fps: self.rate_fps,
            avg_fps: self.rate_avg_fps,
            hours: self.eta_hours,
            minutes: self.eta_minutes,
            seconds: self.eta_seconds,
        })
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::with_phase(EnginePhase::Idle)
    }
}
