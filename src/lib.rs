pub mod config;
pub mod encode;
pub mod engine;
pub mod error;
pub mod generator;
pub mod image_cache;
pub mod job_builder;
pub mod logging;
pub mod pixels;
pub mod scratch;
#[cfg(any(test, feature = "integration-test-api"))]
pub mod test_support;

pub use config::PreviewPreferences;
pub use encode::{EncodeState, PreviewObserver, ProgressPhase, ProgressReport};
pub use error::AppError;
pub use generator::PreviewGenerator;
