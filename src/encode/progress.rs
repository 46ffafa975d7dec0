use crate::engine::{EnginePhase, EngineState, RateEstimate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    Encoding,
    Muxing,
}

/// Progress payload handed to observers on each poll tick.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// 0-100.
    pub percent: f64,
    pub phase: ProgressPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<RateEstimate>,
}

impl ProgressReport {
    /// Report for an engine state, `None` for phases with nothing to show.
    pub fn from_engine_state(state: &EngineState) -> Option<Self> {
        match state.phase {
            EnginePhase::Working => Some(Self {
                percent: (f64::from(state.progress) * 100.0).clamp(0.0, 100.0),
                phase: ProgressPhase::Encoding,
                rate: state.rate_estimate(),
            }),
            EnginePhase::Muxing => Some(Self {
                percent: 100.0,
                phase: ProgressPhase::Muxing,
                rate: None,
            }),
            _ => None,
        }
    }

    pub fn description(&self) -> String {
        match self.phase {
            ProgressPhase::Muxing => "Muxing preview…".to_string(),
            ProgressPhase::Encoding => {
                let mut text = format!("Encoding preview: {:.2} %", self.percent);
                if let Some(rate) = self.rate {
                    text.push_str(&format!(
                        " ({:.2} fps, avg {:.2} fps, ETA {:02}h{:02}m{:02}s)",
                        rate.fps, rate.avg_fps, rate.hours, rate.minutes, rate.seconds
                    ));
                }
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_progress_is_percent() {
        let state = EngineState {
            progress: 0.42,
            ..EngineState::with_phase(EnginePhase::Working)
        };
        let report = ProgressReport::from_engine_state(&state).unwrap();
        assert!((report.percent - 42.0).abs() < 1e-4);
        assert_eq!(report.phase, ProgressPhase::Encoding);
        assert_eq!(report.rate, None);
        assert_eq!(report.description(), "Encoding preview: 42.00 %");
    }

    #[test]
    fn working_with_eta_includes_rates() {
        let state = EngineState {
            progress: 0.5,
            rate_fps: 30.0,
            rate_avg_fps: 29.5,
            eta_hours: 0,
            eta_minutes: 1,
            eta_seconds: 2,
            ..EngineState::with_phase(EnginePhase::Working)
        };
        let report = ProgressReport::from_engine_state(&state).unwrap();
        assert_eq!(
            report.description(),
            "Encoding preview: 50.00 % (30.00 fps, avg 29.50 fps, ETA 00h01m02s)"
        );
    }

    #[test]
    fn muxing_is_full() {
        let report =
            ProgressReport::from_engine_state(&EngineState::with_phase(EnginePhase::Muxing))
                .unwrap();
        assert_eq!(report.percent, 100.0);
        assert_eq!(report.phase, ProgressPhase::Muxing);
        assert_eq!(report.description(), "Muxing preview…");
    }

    #[test]
    fn quiet_phases_have_no_report() {
        for phase in [
            EnginePhase::Idle,
            EnginePhase::Scanning,
            EnginePhase::ScanDone,
            EnginePhase::Paused,
            EnginePhase::WorkDone,
        ] {
            assert_eq!(
                ProgressReport::from_engine_state(&EngineState::with_phase(phase)),
                None
            );
        }
    }

    #[test]
    fn serializes_camel_case_without_missing_rate() {
        let report = ProgressReport {
            percent: 100.0,
            phase: ProgressPhase::Muxing,
            rate: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"percent": 100.0, "phase": "muxing"}));
    }
}
