//! Domain-grouped events for the crawl pipeline

use serde::{Deserialize, Serialize};

/// Top-level event type carried on the channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum AppEvent {
    Crawl(CrawlEvent),
    Download(DownloadEvent),
    General(GeneralEvent),
}

/// Crawl lifecycle and per-page events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CrawlEvent {
    /// Crawl started from the configured start url
    Started { start_url: String },

    /// Login form submitted and accepted
    LoginSucceeded { url: String },

    /// A page was fetched and evaluated against the structure tree
    PageFetched {
        url: String,
        requests: usize,
        downloads: usize,
        saved: usize,
    },

    /// A page or url was skipped
    PageSkipped { url: String, reason: String },

    /// A page assertion failed; the page's links are not followed
    AssertionFailed { url: String, selector: String },

    /// Crawl finished
    Finished {
        pages: usize,
        downloads: usize,
        saved: usize,
        failed: usize,
    },
}

/// File download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Download started with connection info
    Started { url: String, total_size: Option<u64> },

    /// Download progress update
    Progress {
        url: String,
        bytes_downloaded: u64,
        total_bytes: u64,
    },

    /// Download completed successfully
    Completed { url: String, size: u64 },

    /// Download failed
    Failed { url: String, error: String },
}

/// Generic diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    Debug { message: String },
    Warning { message: String },
    Error { message: String },
}
