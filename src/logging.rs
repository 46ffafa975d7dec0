//! env_logger setup: local timestamps, padded level, crate prefix stripped from targets.

use std::io::Write;

use time::OffsetDateTime;
use time::macros::format_description;

const CRATE_TARGET_PREFIX: &str = "tiny_preview::";

fn default_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

pub(crate) fn short_target(target: &str) -> &str {
    target
        .strip_prefix(CRATE_TARGET_PREFIX)
        .or_else(|| target.strip_prefix("tiny_preview_core::"))
        .unwrap_or(target)
}

pub fn build_logger() -> env_logger::Builder {
    let time_fmt = format_description!("[hour]:[minute]:[second]");
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(default_level())
        .format(move |buf, record| {
            let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            let ts = now.format(&time_fmt).unwrap_or_else(|_| "??:??:??".into());
            let level_style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{ts}  {level_style}{level:5}{level_style:#}  {target:5}  {message}",
                ts = ts,
                level = record.level(),
                target = short_target(record.target()),
                message = record.args()
            )
        })
        .parse_default_env();
    builder
}

/// Install the logger once. Later calls (or a logger installed by the host) are left alone.
pub fn init_logging() {
    if build_logger().try_init().is_ok() {
        log::debug!(target: "tiny_preview::logging", "logger initialized");
    }
}
