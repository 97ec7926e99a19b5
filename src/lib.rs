// Library interface for liftrs modules
// This allows integration tests and benchmarks to access the core functionality

pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod stats;

// Re-export commonly used types for convenience
pub use cache::{CacheMetrics, SessionCache};
pub use config::AppConfig;
pub use error::{LiftError, Result};
pub use import::{FileSessionSource, ImportManager, SessionSource};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use stats::{compute_stats, iso_week_key, week_start, StatsCalculator, StatsConfig};
