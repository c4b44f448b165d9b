use crate::crawler::{CrawlReport, CrawlStatus};

/// Formats a crawl report as a plain-text table
///
/// One line per feed (`FORMAT  URI  CONTENT-TYPE`), followed by a summary line.
pub fn render_text(report: &CrawlReport) -> String {
    let mut out = String::new();

    if report.feeds.is_empty() {
        out.push_str(&format!("No feeds found for {}\n", report.source_uri));
    } else {
        let uri_width = report
            .feeds
            .iter()
            .map(|feed| feed.effective_uri.len())
            .max()
            .unwrap_or(0);

        for feed in &report.feeds {
            let content_type: &str = if feed.content_type.is_empty() {
                "-"
            } else {
                &feed.content_type
            };
            out.push_str(&format!(
                "{:<8}  {:<width$}  {}\n",
                feed.format.as_str(),
                feed.effective_uri,
                content_type,
                width = uri_width
            ));
        }
    }

    out.push_str(&format!(
        "\n{} feed(s), {} page(s) fetched, {} failure(s) in {:.2}s",
        report.feeds.len(),
        report.pages_fetched,
        report.fetch_failures + report.stage_failures,
        report.elapsed.as_secs_f64()
    ));
    if report.status == CrawlStatus::Cancelled {
        out.push_str(&format!(" (cancelled, {} left)", report.uris_pending));
    }
    out.push('\n');

    out
}
