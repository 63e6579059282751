//! Report assembly and delivery

use super::render::{render_html, render_markdown};
use super::types::{PerformanceReport, Recommendation, RecommendationCategory, ReportFormat};
use crate::config::RecommendationThresholds;
use crate::monitoring::alerts::AlertDispatcher;
use crate::monitoring::summary::SummaryWindow;
use crate::monitoring::types::{AlertSeverity, AlertType};
use crate::utils::error::Result;
use std::collections::BTreeMap;
use tracing::info;

/// Turns summaries into reports with fixed recommendation rules
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    thresholds: RecommendationThresholds,
}

impl ReportGenerator {
    pub fn new(thresholds: RecommendationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn generate(
        &self,
        summary: SummaryWindow,
        alerts_by_severity: BTreeMap<AlertSeverity, usize>,
        alerts_by_type: BTreeMap<AlertType, usize>,
    ) -> PerformanceReport {
        PerformanceReport {
            id: uuid::Uuid::new_v4().to_string(),
            period: summary.period,
            generated_at: summary.generated_at,
            recommendations: self.recommendations(&summary),
            summary,
            alerts_by_severity,
            alerts_by_type,
        }
    }

    pub fn recommendations(&self, summary: &SummaryWindow) -> Vec<Recommendation> {
        let t = &self.thresholds;
        let requests = &summary.requests;
        let mut out = Vec::new();

        if requests.average_response_time > t.avg_response_ms {
            out.push(Recommendation {
                category: RecommendationCategory::Performance,
                message: format!(
                    "Average response time is {:.0}ms (over {:.0}ms). Consider caching hot reads or optimizing slow handlers.",
                    requests.average_response_time, t.avg_response_ms
                ),
            });
        }

        if requests.error_rate > t.error_rate {
            out.push(Recommendation {
                category: RecommendationCategory::Reliability,
                message: format!(
                    "Error rate is {:.1}% (over {:.1}%). Investigate failing requests in the logs.",
                    requests.error_rate * 100.0,
                    t.error_rate * 100.0
                ),
            });
        }

        if summary.system.average_memory > t.memory_fraction {
            out.push(Recommendation {
                category: RecommendationCategory::Capacity,
                message: format!(
                    "Average memory use is {:.1}% of budget (over {:.1}%). Consider scaling up or out.",
                    summary.system.average_memory * 100.0,
                    t.memory_fraction * 100.0
                ),
            });
        }

        if let Some(slowest) = summary.slowest_endpoints.first() {
            if slowest.average_response_time > t.slow_endpoint_ms {
                out.push(Recommendation {
                    category: RecommendationCategory::Endpoint,
                    message: format!(
                        "{} averages {:.0}ms over {} calls. Profile this endpoint first.",
                        slowest.endpoint, slowest.average_response_time, slowest.calls
                    ),
                });
            }
        }

        out
    }

    pub fn render(&self, report: &PerformanceReport, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Json => serde_json::to_string_pretty(report)?,
            ReportFormat::Markdown => render_markdown(report),
            ReportFormat::Html => render_html(report),
        })
    }

    /// Render as Markdown and hand to every notification channel
    pub async fn deliver(&self, report: &PerformanceReport, dispatcher: &AlertDispatcher) -> Result<usize> {
        let rendered = render_markdown(report);
        let delivered = dispatcher.send_report(report, &rendered).await?;
        info!(report_id = %report.id, period = %report.period, delivered, "Report delivered");
        Ok(delivered)
    }
}
