use crate::report::formatters::{percentile_text, trend_text, value_text};
use crate::report::types::AthleteReport;
use crate::utils::color::Rgb;
use html_escape::encode_text;

/// HTML formatter for athlete reports
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Format report as standalone HTML with embedded CSS
    pub fn format(report: &AthleteReport) -> String {
        let mut html = String::with_capacity(4096);
        let athlete = &report.athlete;

        // HTML header with CSS
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "<title>Performance report - {}</title>\n",
            encode_text(&athlete.name)
        ));
        html.push_str("<style>\n");
        html.push_str("body { font-family: system-ui, sans-serif; max-width: 900px; margin: 40px auto; padding: 20px; line-height: 1.6; }\n");
        html.push_str("h1 { color: #2c3e50; margin-bottom: 10px; }\n");
        html.push_str("h2 { color: #34495e; border-bottom: 2px solid #ecf0f1; padding-bottom: 5px; margin-top: 30px; }\n");
        html.push_str(".meta { color: #6c757d; }\n");
        html.push_str(".summary span { display: inline-block; margin-right: 16px; font-weight: 600; }\n");
        html.push_str(".swatch { display: inline-block; width: 14px; height: 14px; border-radius: 3px; vertical-align: middle; margin-right: 6px; border: 1px solid #ccc; }\n");
        html.push_str(".history span { display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 3px; }\n");
        html.push_str(".notice { background: #fff3cd; border-left: 4px solid #ffc107; padding: 10px 15px; margin: 10px 0; border-radius: 4px; }\n");
        html.push_str("table { width: 100%; border-collapse: collapse; margin: 16px 0; }\n");
        html.push_str("th { background: #34495e; color: white; text-align: left; padding: 12px; font-weight: 600; }\n");
        html.push_str("td { padding: 12px; border-bottom: 1px solid #ecf0f1; }\n");
        html.push_str("tr:hover { background: #f8f9fa; }\n");
        html.push_str("</style>\n</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>{} <small>({})</small></h1>\n",
            encode_text(&athlete.name),
            encode_text(&athlete.id)
        ));
        html.push_str(&format!(
            "<p class=\"meta\">Sex: {} | Category: {}</p>\n",
            athlete.sex, athlete.category
        ));

        let summary = &report.summary;
        html.push_str("<p class=\"summary\">");
        html.push_str(&format!("<span>🟢 {} optimal</span>", summary.optimal));
        html.push_str(&format!("<span>🟡 {} average</span>", summary.average));
        html.push_str(&format!("<span>🔴 {} critical</span>", summary.critical));
        html.push_str(&format!("<span>⚪ {} no data</span>", summary.no_data));
        html.push_str("</p>\n");

        // Metric table
        if report.cards.is_empty() {
            html.push_str("<p><em>No measurements recorded.</em></p>\n");
        } else {
            html.push_str("<h2>Metrics</h2>\n");
            html.push_str("<table>\n<thead><tr><th>Metric</th><th>Latest</th><th>Zone</th><th>Percentile</th><th>Interpretation</th><th>Trend</th><th>History</th></tr></thead>\n<tbody>\n");
            for card in &report.cards {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"history\">",
                    encode_text(&card.name),
                    swatch(card.color),
                    value_text(card),
                    card.zone,
                    percentile_text(card),
                    card.interpretation,
                    trend_text(card)
                ));
                for point in &card.history {
                    html.push_str(&format!(
                        "<span title=\"{}\" style=\"background: {}\"></span>",
                        point.date, point.color
                    ));
                }
                html.push_str("</td></tr>\n");
            }
            html.push_str("</tbody>\n</table>\n");
        }

        // Notices
        if !report.notices.is_empty() {
            html.push_str("<h2>Notices</h2>\n");
            for notice in &report.notices {
                html.push_str(&format!(
                    "<div class=\"notice\">⚠️ {}</div>\n",
                    encode_text(notice)
                ));
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn swatch(color: Rgb) -> String {
    format!("<span class=\"swatch\" style=\"background: {}\"></span>", color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::formatters::sample_report;

    #[test]
    fn test_format_html() {
        let html = HtmlFormatter::format(&sample_report());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Lucía &lt;Captain&gt; <small>(p1)</small></h1>"));
        assert!(!html.contains("<Captain>"));
        assert!(html.contains("style=\"background: #008000\"></span>32.00 cm"));
        assert!(html.contains("<span title=\"2024-01-10\" style=\"background: #ffa500\"></span>"));
        assert!(html.contains("<td>No data</td>"));
        assert!(html.contains("<div class=\"notice\">"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_empty_report_html() {
        let mut report = sample_report();
        report.cards.clear();
        let html = HtmlFormatter::format(&report);
        assert!(html.contains("No measurements recorded"));
        assert!(!html.contains("<table>"));
    }
}
