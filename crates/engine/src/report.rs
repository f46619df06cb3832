//! Crawl outcome summary

use serde::Serialize;

/// Counters accumulated over a crawl
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Pages fetched and evaluated
    pub pages: usize,
    /// Files downloaded to disk
    pub downloads: usize,
    /// Extracted content files written
    pub saved: usize,
    /// URLs and files skipped (already visited or already on disk)
    pub skipped: usize,
    /// Pages and downloads that failed
    pub failed: usize,
}
