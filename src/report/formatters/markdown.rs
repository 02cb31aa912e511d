use crate::report::formatters::{percentile_text, trend_text, value_text};
use crate::report::types::{AthleteReport, MetricCard};

/// Markdown formatter for athlete reports
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format report as markdown
    pub fn format(report: &AthleteReport) -> String {
        let mut md = String::with_capacity(2048);
        let athlete = &report.athlete;

        md.push_str(&format!("# {} ({})\n\n", athlete.name, athlete.id));
        md.push_str(&format!(
            "**Sex:** {} | **Category:** {}\n\n",
            athlete.sex, athlete.category
        ));

        // Zone summary
        let summary = &report.summary;
        md.push_str(&format!(
            "🟢 {} optimal · 🟡 {} average · 🔴 {} critical · ⚪ {} no data\n\n",
            summary.optimal, summary.average, summary.critical, summary.no_data
        ));

        if report.cards.is_empty() {
            md.push_str("*No measurements recorded.*\n\n");
        } else {
            Self::format_cards(&mut md, report);
        }

        if !report.notices.is_empty() {
            md.push_str("## Notices\n\n");
            for notice in &report.notices {
                md.push_str(&format!("- ⚠️ {}\n", notice));
            }
            md.push('\n');
        }

        md
    }

    fn format_cards(md: &mut String, report: &AthleteReport) {
        md.push_str("## Metrics\n\n");
        md.push_str("| Metric | Latest | Zone | Color | Percentile | Interpretation | Trend |\n");
        md.push_str("|--------|--------|------|-------|------------|----------------|-------|\n");
        for card in &report.cards {
            md.push_str(&format!(
                "| {} | {} | {} | `{}` | {} | {} | {} |\n",
                card.name,
                value_text(card),
                card.zone,
                card.color,
                percentile_text(card),
                card.interpretation,
                trend_text(card)
            ));
        }
        md.push('\n');

        // Per-metric history
        let with_history: Vec<&MetricCard> =
            report.cards.iter().filter(|c| c.history.len() > 1).collect();
        if !with_history.is_empty() {
            md.push_str("## History\n\n");
            for card in with_history {
                Self::format_history(md, card);
            }
        }
    }

    fn format_history(md: &mut String, card: &MetricCard) {
        md.push_str(&format!("### {}\n\n", card.name));
        md.push_str("| Date | Value | Color |\n");
        md.push_str("|------|-------|-------|\n");
        for point in &card.history {
            let value = match point.value {
                Some(v) => format!("{:.2}", v),
                None => "–".to_string(),
            };
            md.push_str(&format!("| {} | {} | `{}` |\n", point.date, value, point.color));
        }
        md.push('\n');
    }
}
