//! Final result rendering

use console::style;
use mscrape_engine::CrawlReport;
use mscrape_site::SimulatedUrlInfo;
use serde_json::json;

/// Renders command results as styled text or JSON
pub struct OutputRenderer {
    json: bool,
}

impl OutputRenderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Render the crawl summary
    pub fn render_report(&self, report: &CrawlReport) {
        if self.json {
            if let Ok(line) = serde_json::to_string_pretty(report) {
                println!("{line}");
            }
            return;
        }

        println!("{}", style("Crawl finished").green().bold());
        println!("  pages:     {}", report.pages);
        println!("  downloads: {}", report.downloads);
        println!("  saved:     {}", report.saved);
        println!("  skipped:   {}", report.skipped);
        if report.failed > 0 {
            println!("  failed:    {}", style(report.failed).red());
        }
    }

    /// Render the candidate placements of a checked URL
    pub fn render_simulation(&self, url: &str, candidates: &[SimulatedUrlInfo]) {
        if self.json {
            let items: Vec<_> = candidates
                .iter()
                .map(|info| {
                    json!({
                        "url": info.url,
                        "file_path": info.file_path,
                        "structure_path": info.structure_path,
                    })
                })
                .collect();
            if let Ok(line) = serde_json::to_string_pretty(&items) {
                println!("{line}");
            }
            return;
        }

        println!("{url} matches {} structure node(s):", candidates.len());
        for info in candidates {
            let chain = info
                .structure_path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            println!("  node {chain} -> {}", info.file_path);
        }
    }
}
