use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

/// Job description shared between the host, the image cache and the movie controller.
/// The image cache holds the lock across each extraction call.
pub type SharedJob = Arc<Mutex<JobDescription>>;

/// Engine time base: 90 kHz ticks per second.
pub const PTS_PER_SECOND: u64 = 90_000;

/// Output multiplexer configured on a job.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Muxer {
    Mp4,
    Mkv,
    Webm,
    #[serde(untagged)]
    Other(String),
}

/// Container families a preview movie can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxFamily {
    Mp4,
    Matroska,
}

impl Muxer {
    pub fn family(&self) -> Option<MuxFamily> {
        match self {
            Muxer::Mp4 => Some(MuxFamily::Mp4),
            Muxer::Mkv | Muxer::Webm => Some(MuxFamily::Matroska),
            Muxer::Other(_) => None,
        }
    }

    /// File extension for a preview written with this muxer, `None` when unsupported.
    pub fn preview_extension(&self) -> Option<&'static str> {
        match (self, self.family()?) {
            (Muxer::Webm, _) => Some("webm"),
            (_, MuxFamily::Mp4) => Some("m4v"),
            (_, MuxFamily::Matroska) => Some("mkv"),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Muxer::Mp4 => "mp4",
            Muxer::Mkv => "mkv",
            Muxer::Webm => "webm",
            Muxer::Other(name) => name,
        }
    }
}

/// The subset of an engine job this crate reads or rewrites.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub muxer: Muxer,
    /// Output frame size after the filter chain.
    pub width: u32,
    pub height: u32,
    /// Passes the final encode would use (1 or 2).
    pub pass_count: u8,
    /// Pass being submitted; 0 means single pass.
    pub pass_id: i32,
    /// Foreign-audio subtitle search before the real encode.
    pub indepth_scan: bool,
    /// Advanced per-codec encoder options.
    pub encoder_options: Option<String>,
    pub deinterlace: bool,
    /// 1-based seek point to start from; 0 encodes from the start of the title.
    pub start_at_preview: u32,
    pub seek_points: u32,
    /// Stop after this many 90 kHz ticks; 0 encodes to the end.
    pub pts_to_stop: u64,
    pub destination: Option<PathBuf>,
}

impl Default for JobDescription {
    fn default() -> Self {
        Self {
            muxer: Muxer::Mp4,
            width: 0,
            height: 0,
            pass_count: 1,
            pass_id: 0,
            indepth_scan: false,
            encoder_options: None,
            deinterlace: false,
            start_at_preview: 0,
            seek_points: 0,
            pts_to_stop: 0,
            destination: None,
        }
    }
}

impl JobDescription {
    pub fn into_shared(self) -> SharedJob {
        Arc::new(Mutex::new(self))
    }

    /// Fast subtitle-detection pass submitted ahead of the preview encode.
    /// Encoder tuning is cleared so it cannot influence the scan.
    pub fn subtitle_prescan(&self) -> Self {
        Self {
            indepth_scan: true,
            encoder_options: None,
            pass_count: 1,
            pass_id: 0,
            ..self.clone()
        }
    }

    /// The preview encode itself: one pass, no in-depth scan.
    pub fn single_pass_preview(&self) -> Self {
        Self {
            indepth_scan: false,
            pass_count: 1,
            pass_id: 0,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mux_families() {
        assert_eq!(Muxer::Mp4.family(), Some(MuxFamily::Mp4));
        assert_eq!(Muxer::Mkv.family(), Some(MuxFamily::Matroska));
        assert_eq!(Muxer::Webm.family(), Some(MuxFamily::Matroska));
        assert_eq!(Muxer::Other("avi".into()).family(), None);
    }

    #[test]
    fn preview_extensions() {
        assert_eq!(Muxer::Mp4.preview_extension(), Some("m4v"));
        assert_eq!(Muxer::Mkv.preview_extension(), Some("mkv"));
        assert_eq!(Muxer::Webm.preview_extension(), Some("webm"));
        assert_eq!(Muxer::Other("ts".into()).preview_extension(), None);
    }

    #[test]
    fn unknown_muxer_deserializes_as_other() {
        let m: Muxer = serde_json::from_str("\"mov\"").unwrap();
        assert_eq!(m, Muxer::Other("mov".into()));
        let m: Muxer = serde_json::from_str("\"mkv\"").unwrap();
        assert_eq!(m, Muxer::Mkv);
    }

    #[test]
    fn prescan_clears_encoder_options_and_sets_scan() {
        let base = JobDescription {
            pass_count: 2,
            pass_id: 1,
            encoder_options: Some("ref=6:bframes=8".into()),
            ..JobDescription::default()
        };
        let scan = base.subtitle_prescan();
        assert!(scan.indepth_scan);
        assert_eq!(scan.encoder_options, None);
        assert_eq!(scan.pass_id, 0);
        assert_eq!(base.encoder_options.as_deref(), Some("ref=6:bframes=8"));
    }

    #[test]
    fn preview_pass_is_single_and_keeps_tuning() {
        let base = JobDescription {
            pass_count: 2,
            pass_id: 2,
            indepth_scan: true,
            encoder_options: Some("ref=6".into()),
            ..JobDescription::default()
        };
        let job = base.single_pass_preview();
        assert!(!job.indepth_scan);
        assert_eq!(job.pass_count, 1);
        assert_eq!(job.pass_id, 0);
        assert_eq!(job.encoder_options.as_deref(), Some("ref=6"));
    }
}
