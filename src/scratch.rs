//! Per-process scratch directory for preview movie output.
//!
//! Each running process writes under its own `tiny-preview-<pid>` directory so
//! concurrent sessions never collide. Directories left behind by earlier
//! processes can be swept with `cleanup_stale_scratch_dirs`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use regex::Regex;

use crate::error::AppError;

const SCRATCH_DIR_PREFIX: &str = "tiny-preview-";

static SCRATCH_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^tiny-preview-(\d+)$").expect("invalid scratch dir regex")
});

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory owned by the current process.
    pub fn path(&self) -> PathBuf {
        self.root
            .join(format!("{}{}", SCRATCH_DIR_PREFIX, std::process::id()))
    }

    /// Create the process directory if needed and confirm it is a directory.
    pub fn ensure(&self) -> Result<PathBuf, AppError> {
        let dir = self.path();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Scratch(format!("{}: {}", dir.display(), e)))?;
        if !dir.is_dir() {
            return Err(AppError::Scratch(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(dir)
    }

    /// Path for `file_name` inside the process directory. Any file already
    /// there is removed; failing to remove it is logged and ignored.
    pub fn fresh_file(&self, file_name: &str) -> Result<PathBuf, AppError> {
        let path = self.ensure()?.join(file_name);
        remove_stale_file(&path);
        Ok(path)
    }

    /// Remove the process directory and everything in it.
    pub fn remove_all(&self) -> io::Result<()> {
        match fs::remove_dir_all(self.path()) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

fn remove_stale_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!(
            target: "tiny_preview::scratch",
            "removed stale preview {}",
            path.display()
        ),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            target: "tiny_preview::scratch",
            "could not remove stale preview {}: {}",
            path.display(),
            e
        ),
    }
}

/// Remove scratch directories under `root` from other processes that have not
/// been modified for `max_age`. Returns how many were removed.
pub fn cleanup_stale_scratch_dirs(root: &Path, max_age: Duration) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    let own_pid = std::process::id();
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(caps) = name.to_str().and_then(|n| SCRATCH_DIR_RE.captures(n)) else {
            continue;
        };
        if caps[1].parse::<u32>().ok() == Some(own_pid) {
            continue;
        }
        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| now.duration_since(t).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }
        let path = entry.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                log::info!(
                    target: "tiny_preview::scratch",
                    "removed stale scratch dir {}",
                    path.display()
                );
                removed += 1;
            }
            Err(e) => log::warn!(
                target: "tiny_preview::scratch",
                "could not remove scratch dir {}: {}",
                path.display(),
                e
            ),
        }
    }
    removed
}
