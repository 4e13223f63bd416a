use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use latency_router_core::router::{render_compact, render_detailed};
use latency_router_core::SummaryReporter;
use latency_router_types::{RoundSummary, SummaryFormat};

/// Writes each round summary to stdout in the configured format.
pub struct ConsoleReporter {
    format: SummaryFormat,
}

impl ConsoleReporter {
    pub fn new(format: SummaryFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, summary: &RoundSummary) -> String {
        match self.format {
            SummaryFormat::Compact => render_compact(summary),
            SummaryFormat::Detailed => render_detailed(summary),
            SummaryFormat::Table => render_table(summary),
            SummaryFormat::Json => serde_json::to_string(summary)
                .unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e)),
        }
    }
}

impl SummaryReporter for ConsoleReporter {
    fn report(&self, summary: &RoundSummary) {
        let text = self.render(summary);
        if self.format == SummaryFormat::Json {
            println!("{}", text);
        } else {
            println!("\n{}", text.trim_end());
        }
    }
}

fn render_table(summary: &RoundSummary) -> String {
    let fastest = summary.fastest().map(|e| e.endpoint.clone());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Endpoint", "Estimate (ms)", "Requests", "Share"]);

    let total = summary.total_requests().max(1);
    for entry in &summary.endpoints {
        let estimate = match entry.estimate_ms {
            Some(ms) if fastest.as_ref() == Some(&entry.endpoint) => {
                Cell::new(format!("{:.2}", ms)).fg(Color::Green)
            },
            Some(ms) => Cell::new(format!("{:.2}", ms)),
            None => Cell::new("-").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(entry.endpoint.as_str()),
            estimate,
            Cell::new(entry.requests),
            Cell::new(format!("{:.1}%", entry.requests as f64 * 100.0 / total as f64)),
        ]);
    }

    let failed = if summary.failed > 0 {
        summary.failed.to_string().red().to_string()
    } else {
        summary.failed.to_string()
    };

    format!(
        "{}\n{table}\n{} ok, {} failed in {} ms\n",
        format!("Traffic Round {}", summary.round).cyan().bold(),
        summary.succeeded,
        failed,
        summary.duration_ms
    )
}
