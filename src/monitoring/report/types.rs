//! Report types

use crate::monitoring::summary::SummaryWindow;
use crate::monitoring::types::{AlertSeverity, AlertType, SummaryPeriod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Performance,
    Reliability,
    Capacity,
    Endpoint,
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecommendationCategory::Performance => "performance",
            RecommendationCategory::Reliability => "reliability",
            RecommendationCategory::Capacity => "capacity",
            RecommendationCategory::Endpoint => "endpoint",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub id: String,
    pub period: SummaryPeriod,
    pub generated_at: DateTime<Utc>,
    pub summary: SummaryWindow,
    pub alerts_by_severity: BTreeMap<AlertSeverity, usize>,
    pub alerts_by_type: BTreeMap<AlertType, usize>,
    pub recommendations: Vec<Recommendation>,
}

impl PerformanceReport {
    pub fn total_alerts(&self) -> usize {
        self.alerts_by_severity.values().sum()
    }
}

/// Output format for rendered reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
    Html,
}

impl ReportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Markdown => "text/markdown; charset=utf-8",
            ReportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            other => Err(format!("unknown report format: {}", other)),
        }
    }
}
