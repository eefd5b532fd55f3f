pub mod engine;
pub mod types;

pub use engine::AnalyticsEngine;
pub use types::{EquityPoint, PerformanceReport};
