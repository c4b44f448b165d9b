//! Markdown report generation

use crate::crawler::CrawlReport;
use chrono::Utc;

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The finished crawl
///
/// # Returns
///
/// A formatted markdown string
pub fn render_markdown(report: &CrawlReport) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Feed Locator Report\n\n");

    // Run metadata
    md.push_str("## Crawl Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Requested URI**: {}\n", report.requested_uri));
    if report.source_uri != report.requested_uri {
        md.push_str(&format!("- **Source URI**: {}\n", report.source_uri));
    }
    md.push_str(&format!("- **Status**: {}\n", report.status.as_str()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        report.elapsed.as_secs_f64()
    ));

    // Feeds
    md.push_str("## Feeds\n\n");
    if report.feeds.is_empty() {
        md.push_str("No feeds were found.\n\n");
    } else {
        md.push_str("| Format | URI | Content-Type |\n");
        md.push_str("|--------|-----|--------------|\n");
        for feed in &report.feeds {
            md.push_str(&format!(
                "| {} | <{}> | {} |\n",
                feed.format,
                feed.effective_uri,
                escape_cell(&feed.content_type)
            ));
        }
        md.push('\n');
    }

    // Statistics
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Feeds Found | {} |\n", report.feeds.len()));
    md.push_str(&format!("| URIs Visited | {} |\n", report.uris_visited));
    md.push_str(&format!("| Pages Fetched | {} |\n", report.pages_fetched));
    md.push_str(&format!("| Fetch Failures | {} |\n", report.fetch_failures));
    md.push_str(&format!("| Stage Failures | {} |\n", report.stage_failures));
    if report.uris_pending > 0 {
        md.push_str(&format!("| URIs Not Visited | {} |\n", report.uris_pending));
    }

    md
}

fn escape_cell(value: &str) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    value.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::{feeds, report};

    #[test]
    fn test_markdown_sections() {
        let md = render_markdown(&report(feeds()));

        assert!(md.starts_with("# Feed Locator Report"));
        assert!(md.contains("## Crawl Information"));
        assert!(md.contains("- **Generated**: "));
        assert!(md.contains("- **Source URI**: https://www.example.com/"));
        assert!(md.contains("- **Status**: complete"));
        assert!(md.contains("| Fetch Failures | 1 |"));
    }

    #[test]
    fn test_feed_table_rows() {
        let md = render_markdown(&report(feeds()));

        assert!(md.contains(
            "| rss | <https://www.example.com/feed.xml> | application/rss+xml; charset=utf-8 |"
        ));
        assert!(md.contains("| jsonfeed | <https://www.example.com/feed.json> | - |"));
    }

    #[test]
    fn test_no_feeds() {
        let md = render_markdown(&report(vec![]));
        assert!(md.contains("No feeds were found."));
        assert!(!md.contains("| Format |"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell(""), "-");
    }
}
