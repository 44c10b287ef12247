pub mod insight_service;
pub mod summary_service;

pub use insight_service::{Insight, InsightOptions, InsightService, DEFAULT_DOMINANT_SHARE};
pub use summary_service::SummaryService;
