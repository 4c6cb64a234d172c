use std::fmt;

use crate::crawler::CrawlResults;

const SAMPLE_COMMENTS: usize = 3;
const MAX_TEXT_CHARS: usize = 100;

/// Human-readable summary of a crawl, as printed by `ytcrawl crawl`.
pub fn render(results: &CrawlResults) -> String {
    Report(results).to_string()
}

struct Report<'a>(&'a CrawlResults);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = self.0;
        if results.is_empty() {
            return writeln!(f, "No matching comments found.");
        }

        let separator = "-".repeat(80);
        writeln!(f, "Found matching comments in {} videos:", results.len())?;
        writeln!(f, "{}", separator)?;

        for (url, comments) in results.iter() {
            writeln!(f, "Video: {}", url)?;
            writeln!(f, "Matching comments: {}", comments.len())?;

            for comment in comments.iter().take(SAMPLE_COMMENTS) {
                writeln!(f, "  - {}: {}", comment.author, truncate(&comment.text))?;
            }
            if comments.len() > SAMPLE_COMMENTS {
                writeln!(f, "  ... and {} more", comments.len() - SAMPLE_COMMENTS)?;
            }

            writeln!(f, "{}", separator)?;
        }

        Ok(())
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_CHARS {
        let head: String = text.chars().take(MAX_TEXT_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
