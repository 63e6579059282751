//! Performance reports
//!
//! A report is a summary window plus alert counts and rule-based
//! recommendations, rendered as JSON, Markdown or HTML.

mod generator;
mod render;
mod types;

pub use generator::ReportGenerator;
pub use render::{render_html, render_markdown};
pub use types::{PerformanceReport, Recommendation, RecommendationCategory, ReportFormat};
