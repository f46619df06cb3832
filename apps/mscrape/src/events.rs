//! Event handling and progress display

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use mscrape_events::{AppEvent, CrawlEvent, DownloadEvent, GeneralEvent};
use std::collections::HashMap;

/// Event handler for progress display and user feedback
pub struct EventHandler {
    /// Multi-progress manager for concurrent progress bars
    multi_progress: MultiProgress,
    /// Active progress bars by URL
    download_bars: HashMap<String, ProgressBar>,
    /// Print events as JSON lines instead of styled text
    json: bool,
    /// Show debug events
    debug: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(json: bool, debug: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            download_bars: HashMap::new(),
            json,
            debug,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        if self.json {
            self.emit_json(&event);
            return;
        }

        match event {
            AppEvent::Download(event) => self.handle_download_event(event),
            AppEvent::Crawl(event) => self.handle_crawl_event(&event),
            AppEvent::General(event) => self.handle_general_event(&event),
        }
    }

    fn emit_json(&self, event: &AppEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
    }

    fn handle_crawl_event(&mut self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Started { start_url } => {
                self.show_status(&format!("Crawling {start_url}"));
            }
            CrawlEvent::LoginSucceeded { url } => {
                self.show_status(&format!("Logged in at {url}"));
            }
            CrawlEvent::PageFetched {
                url,
                requests,
                downloads,
                saved,
            } => {
                self.show_status(&format!(
                    "{url}: {requests} pages queued, {downloads} downloads, {saved} saved"
                ));
            }
            CrawlEvent::PageSkipped { url, reason } => {
                if self.debug {
                    self.show_status(&format!("Skipped {url} ({reason})"));
                }
            }
            CrawlEvent::AssertionFailed { url, selector } => {
                self.show_error(&format!("Assertion `{selector}` failed on {url}"));
            }
            CrawlEvent::Finished {
                pages,
                downloads,
                saved,
                failed,
            } => {
                self.show_status(&format!(
                    "Done: {pages} pages, {downloads} downloads, {saved} saved, {failed} failed"
                ));
            }
        }
    }

    fn handle_download_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { url, total_size } => {
                self.handle_download_started(&url, total_size);
            }
            DownloadEvent::Progress {
                url,
                bytes_downloaded,
                total_bytes,
            } => {
                if let Some(pb) = self.download_bars.get(&url) {
                    pb.set_length(total_bytes);
                    pb.set_position(bytes_downloaded);
                }
            }
            DownloadEvent::Completed { url, .. } => {
                if let Some(pb) = self.download_bars.remove(&url) {
                    pb.finish_with_message("Downloaded");
                }
            }
            DownloadEvent::Failed { url, error } => {
                if let Some(pb) = self.download_bars.remove(&url) {
                    pb.finish_with_message(format!("Failed: {error}"));
                } else {
                    self.show_error(&format!("Download failed for {url}: {error}"));
                }
            }
        }
    }

    fn handle_general_event(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Debug { message } => {
                if self.debug {
                    self.show_status(message);
                }
            }
            GeneralEvent::Warning { message } => {
                self.show_status(&format!("{} {message}", style("warning:").yellow()));
            }
            GeneralEvent::Error { message } => self.show_error(message),
        }
    }

    fn handle_download_started(&mut self, url: &str, size: Option<u64>) {
        let filename = url.split('/').next_back().unwrap_or(url);

        let pb = if let Some(total) = size {
            ProgressBar::new(total)
        } else {
            ProgressBar::new_spinner()
        };

        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("#>-")
        );

        pb.set_message(format!("Downloading {filename}"));

        let pb = self.multi_progress.add(pb);
        self.download_bars.insert(url.to_string(), pb);
    }

    /// Show status message
    fn show_status(&self, message: &str) {
        // Use multi_progress to avoid interfering with progress bars
        self.multi_progress.println(message).unwrap_or(());
    }

    /// Show error message
    fn show_error(&self, message: &str) {
        self.multi_progress
            .println(format!("{} {message}", style("error:").red().bold()))
            .unwrap_or(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_event_handling() {
        let mut handler = EventHandler::new(false, false);

        let url = "https://example.com/photo.jpg";

        handler.handle_event(AppEvent::Download(DownloadEvent::Started {
            url: url.to_string(),
            total_size: Some(1024),
        }));
        assert!(handler.download_bars.contains_key(url));

        handler.handle_event(AppEvent::Download(DownloadEvent::Progress {
            url: url.to_string(),
            bytes_downloaded: 512,
            total_bytes: 1024,
        }));

        handler.handle_event(AppEvent::Download(DownloadEvent::Completed {
            url: url.to_string(),
            size: 1024,
        }));
        assert!(!handler.download_bars.contains_key(url));
    }

    #[test]
    fn test_crawl_events_do_not_panic() {
        let mut handler = EventHandler::new(false, true);

        handler.handle_event(AppEvent::Crawl(CrawlEvent::Started {
            start_url: "http://example.com/".to_string(),
        }));
        handler.handle_event(AppEvent::Crawl(CrawlEvent::PageSkipped {
            url: "http://example.com/dup".to_string(),
            reason: "already visited".to_string(),
        }));
        handler.handle_event(AppEvent::General(GeneralEvent::Warning {
            message: "page layout changed".to_string(),
        }));
    }
}
