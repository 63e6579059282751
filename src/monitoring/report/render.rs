//! Human-readable report renderers

use super::types::PerformanceReport;
use crate::utils::format_duration;
use std::fmt::Write;

fn ms(value: f64) -> String {
    format_duration(value.max(0.0).round() as u64)
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Markdown, also used as the webhook message body
pub fn render_markdown(report: &PerformanceReport) -> String {
    let summary = &report.summary;
    let requests = &summary.requests;
    let mut out = String::new();

    let _ = writeln!(out, "# Performance report ({})", report.period);
    let _ = writeln!(out, "_Generated {}_\n", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));

    let _ = writeln!(out, "## Requests\n");
    let _ = writeln!(out, "| Total | Successful | Failed | Avg response | Error rate |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} |\n",
        requests.total,
        requests.successful,
        requests.failed,
        ms(requests.average_response_time),
        percent(requests.error_rate)
    );

    if !summary.slowest_endpoints.is_empty() {
        let _ = writeln!(out, "## Slowest endpoints\n");
        let _ = writeln!(out, "| Endpoint | Avg | Max | Calls |");
        let _ = writeln!(out, "|---|---|---|---|");
        for endpoint in &summary.slowest_endpoints {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} | {} |",
                endpoint.endpoint,
                ms(endpoint.average_response_time),
                ms(endpoint.max_response_time),
                endpoint.calls
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## System\n");
    let _ = writeln!(
        out,
        "- CPU: avg {}, peak {}\n- Memory: avg {}, peak {}\n- Samples: {}\n",
        percent(summary.system.average_cpu),
        percent(summary.system.peak_cpu),
        percent(summary.system.average_memory),
        percent(summary.system.peak_memory),
        summary.system.samples
    );

    let _ = writeln!(out, "## Alerts ({})\n", report.total_alerts());
    for (severity, count) in &report.alerts_by_severity {
        let _ = writeln!(out, "- {}: {}", severity, count);
    }
    out.push('\n');

    let _ = writeln!(out, "## Recommendations\n");
    if report.recommendations.is_empty() {
        let _ = writeln!(out, "No action needed.");
    }
    for recommendation in &report.recommendations {
        let _ = writeln!(out, "- **{}**: {}", recommendation.category, recommendation.message);
    }

    out
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Standalone HTML document
pub fn render_html(report: &PerformanceReport) -> String {
    let summary = &report.summary;
    let requests = &summary.requests;
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Performance report ({period})</title></head><body>\n\
         <h1>Performance report ({period})</h1>\n<p><em>Generated {generated}</em></p>\n",
        period = report.period,
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let _ = write!(
        out,
        "<h2>Requests</h2>\n<table><tr><th>Total</th><th>Successful</th><th>Failed</th><th>Avg response</th><th>Error rate</th></tr>\n\
         <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></table>\n",
        requests.total,
        requests.successful,
        requests.failed,
        ms(requests.average_response_time),
        percent(requests.error_rate)
    );

    if !summary.slowest_endpoints.is_empty() {
        out.push_str("<h2>Slowest endpoints</h2>\n<table><tr><th>Endpoint</th><th>Avg</th><th>Max</th><th>Calls</th></tr>\n");
        for endpoint in &summary.slowest_endpoints {
            let _ = writeln!(
                out,
                "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&endpoint.endpoint),
                ms(endpoint.average_response_time),
                ms(endpoint.max_response_time),
                endpoint.calls
            );
        }
        out.push_str("</table>\n");
    }

    let _ = write!(
        out,
        "<h2>System</h2>\n<ul><li>CPU: avg {}, peak {}</li><li>Memory: avg {}, peak {}</li><li>Samples: {}</li></ul>\n",
        percent(summary.system.average_cpu),
        percent(summary.system.peak_cpu),
        percent(summary.system.average_memory),
        percent(summary.system.peak_memory),
        summary.system.samples
    );

    let _ = write!(out, "<h2>Alerts ({})</h2>\n<ul>\n", report.total_alerts());
    for (severity, count) in &report.alerts_by_severity {
        let _ = writeln!(out, "<li>{}: {}</li>", severity, count);
    }
    out.push_str("</ul>\n<h2>Recommendations</h2>\n<ul>\n");
    for recommendation in &report.recommendations {
        let _ = writeln!(
            out,
            "<li><strong>{}</strong>: {}</li>",
            recommendation.category,
            escape(&recommendation.message)
        );
    }
    out.push_str("</ul>\n</body></html>\n");
    out
}
