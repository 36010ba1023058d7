pub mod core;
pub mod edgar;
pub mod metrics;
pub mod utils;

// Re-exports
pub use crate::core::config::MetricsConfig;
pub use utils::progress::ProgressTracker;
