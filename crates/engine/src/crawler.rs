//! Breadth-first crawl over a site's structure tree

use mscrape_config::Config;
use mscrape_errors::{Error, SiteError, StorageError};
use mscrape_events::{AppEvent, CrawlEvent, DownloadEvent, EventEmitter, EventSender};
use mscrape_net::{self as net, NetClient, NetConfig};
use mscrape_site::{Page, PageUrlInfo, SiteConfig, UrlCommand};
use mscrape_site::LoginConfig;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::CrawlReport;

enum DownloadOutcome {
    Completed,
    Failed,
}

/// The crawl driver
///
/// Owns the site definition, the HTTP client (with its login cookie jar),
/// and the event channel. Pages are crawled sequentially; downloads run
/// concurrently up to `general.parallel_downloads`.
pub struct Crawler {
    site: SiteConfig,
    config: Config,
    client: NetClient,
    tx: EventSender,
}

impl Crawler {
    /// Create a crawler for a site
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(site: SiteConfig, config: Config, tx: EventSender) -> Result<Self, Error> {
        let client = NetClient::new(NetConfig::from(&config.network))?;
        Ok(Self {
            site,
            config,
            client,
            tx,
        })
    }

    /// Run the crawl to completion
    ///
    /// # Errors
    ///
    /// Returns an error if `save_dir` cannot be created, the login step
    /// fails, or the start page cannot be evaluated. Failures on later
    /// pages and downloads are reported as events and counted instead.
    pub async fn run(&self) -> Result<CrawlReport, Error> {
        self.create_save_dir().await?;

        self.tx.emit(AppEvent::Crawl(CrawlEvent::Started {
            start_url: self.site.start_url.clone(),
        }));

        self.login().await?;

        let semaphore = Arc::new(Semaphore::new(self.config.general.parallel_downloads));
        let mut downloads: JoinSet<DownloadOutcome> = JoinSet::new();

        let mut report = CrawlReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Option<PageUrlInfo>> = VecDeque::new();
        queue.push_back(None);

        while let Some(parent) = queue.pop_front() {
            let request_url = parent
                .as_ref()
                .map_or(self.site.start_url.as_str(), |info| info.url.as_str());

            let fetched = match net::fetch_page(&self.client, request_url).await {
                Ok(fetched) => fetched,
                // The start page must be walkable; anything after it is
                // a per-page failure.
                Err(e) if parent.is_none() => return Err(e),
                Err(e) => {
                    report.failed += 1;
                    self.report_page_failure(request_url, &e);
                    continue;
                }
            };

            // A redirect may land on a page that was already walked
            // under another URL
            if fetched.url != request_url && visited.contains(&fetched.url) {
                self.skip(&mut report, request_url, "redirected to a visited page");
                continue;
            }
            visited.insert(request_url.to_string());
            visited.insert(fetched.url.clone());

            let commands = match self.walk_page(fetched, parent.as_ref()) {
                Ok(commands) => commands,
                Err(e) if parent.is_none() => return Err(e),
                Err(e) => {
                    report.failed += 1;
                    self.report_page_failure(request_url, &e);
                    continue;
                }
            };

            report.pages += 1;
            self.emit_page_fetched(request_url, &commands);

            for command in commands {
                match command {
                    UrlCommand::Request(info) => {
                        if visited.insert(info.url.clone()) {
                            queue.push_back(Some(info));
                        } else {
                            self.skip(&mut report, &info.url, "already visited");
                        }
                    }
                    UrlCommand::Download { url, file_path } => {
                        self.handle_download(
                            &mut report,
                            &mut visited,
                            &mut downloads,
                            &semaphore,
                            url,
                            &file_path,
                        )
                        .await;
                    }
                    UrlCommand::SaveContent { file_path, content } => {
                        self.handle_save(&mut report, &file_path, &content).await;
                    }
                }
            }
        }

        while let Some(result) = downloads.join_next().await {
            match result {
                Ok(DownloadOutcome::Completed) => report.downloads += 1,
                Ok(DownloadOutcome::Failed) => report.failed += 1,
                Err(e) => {
                    report.failed += 1;
                    self.tx.emit_error(format!("download task panicked: {e}"));
                }
            }
        }

        self.tx.emit(AppEvent::Crawl(CrawlEvent::Finished {
            pages: report.pages,
            downloads: report.downloads,
            saved: report.saved,
            failed: report.failed,
        }));

        Ok(report)
    }

    /// Evaluate a fetched page into commands
    fn walk_page(
        &self,
        fetched: net::FetchedPage,
        parent: Option<&PageUrlInfo>,
    ) -> Result<Vec<UrlCommand>, Error> {
        let page = Page::new(&fetched.url, fetched.body)?;
        self.site.url_commands(&page, parent)
    }

    async fn handle_download(
        &self,
        report: &mut CrawlReport,
        visited: &mut HashSet<String>,
        downloads: &mut JoinSet<DownloadOutcome>,
        semaphore: &Arc<Semaphore>,
        url: String,
        file_path: &str,
    ) {
        if !visited.insert(url.clone()) {
            self.skip(report, &url, "already visited");
            return;
        }
        let Some(dest) = self.dest_path(report, &url, file_path) else {
            return;
        };
        if self.already_saved(&dest).await {
            self.skip(report, &url, "file exists");
            return;
        }

        let client = self.client.clone();
        let tx = self.tx.clone();
        let semaphore = Arc::clone(semaphore);
        downloads.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return DownloadOutcome::Failed;
            };
            match net::download_file(&client, &url, &dest, &tx).await {
                Ok(_) => DownloadOutcome::Completed,
                Err(e) => {
                    tx.emit(AppEvent::Download(DownloadEvent::Failed {
                        url,
                        error: e.to_string(),
                    }));
                    DownloadOutcome::Failed
                }
            }
        });
    }

    async fn handle_save(&self, report: &mut CrawlReport, file_path: &str, content: &[u8]) {
        let Some(dest) = self.dest_path(report, "<extracted content>", file_path) else {
            return;
        };
        if self.already_saved(&dest).await {
            self.skip(report, &dest.display().to_string(), "file exists");
            return;
        }

        match write_file(&dest, content).await {
            Ok(()) => report.saved += 1,
            Err(e) => {
                report.failed += 1;
                self.tx.emit_error(e.to_string());
            }
        }
    }

    /// Resolve a walk-produced relative path under `save_dir`
    ///
    /// An empty path means the structure chain assigned no `file_path` to
    /// the file; it is skipped with a warning rather than written over
    /// `save_dir` itself.
    fn dest_path(&self, report: &mut CrawlReport, what: &str, file_path: &str) -> Option<PathBuf> {
        if file_path.is_empty() {
            report.skipped += 1;
            self.tx
                .emit_warning(format!("no file_path in structure for {what}, skipping"));
            return None;
        }
        Some(self.site.save_dir.join(file_path))
    }

    async fn already_saved(&self, dest: &Path) -> bool {
        self.config.general.skip_existing
            && tokio::fs::try_exists(dest).await.unwrap_or(false)
    }

    fn skip(&self, report: &mut CrawlReport, url: &str, reason: &str) {
        report.skipped += 1;
        self.tx.emit(AppEvent::Crawl(CrawlEvent::PageSkipped {
            url: url.to_string(),
            reason: reason.to_string(),
        }));
    }

    fn emit_page_fetched(&self, url: &str, commands: &[UrlCommand]) {
        let mut requests = 0;
        let mut downloads = 0;
        let mut saved = 0;
        for command in commands {
            match command {
                UrlCommand::Request(_) => requests += 1,
                UrlCommand::Download { .. } => downloads += 1,
                UrlCommand::SaveContent { .. } => saved += 1,
            }
        }
        self.tx.emit(AppEvent::Crawl(CrawlEvent::PageFetched {
            url: url.to_string(),
            requests,
            downloads,
            saved,
        }));
    }

    fn report_page_failure(&self, url: &str, error: &Error) {
        if let Error::Site(SiteError::AssertionFailed { url, selector }) = error {
            self.tx.emit(AppEvent::Crawl(CrawlEvent::AssertionFailed {
                url: url.clone(),
                selector: selector.clone(),
            }));
        } else {
            self.tx
                .emit_error(format!("failed to process {url}: {error}"));
        }
    }

    async fn create_save_dir(&self) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.site.save_dir)
            .await
            .map_err(|e| {
                StorageError::DirectoryCreationFailed {
                    path: self.site.save_dir.display().to_string(),
                    message: e.to_string(),
                }
                .into()
            })
    }

    /// Establish a session before the crawl starts
    ///
    /// A bare login URL is fetched for its session cookies. A form login
    /// fetches the login page first (cookies again), then posts the
    /// configured formdata.
    async fn login(&self) -> Result<(), Error> {
        match &self.site.login {
            None => Ok(()),
            Some(LoginConfig::Url(url)) => {
                net::fetch_page(&self.client, url).await?;
                self.emit_login(url);
                Ok(())
            }
            Some(LoginConfig::Form { url, formdata }) => {
                net::fetch_page(&self.client, url).await?;
                net::submit_login_form(&self.client, url, formdata).await?;
                self.emit_login(url);
                Ok(())
            }
        }
    }

    fn emit_login(&self, url: &str) {
        self.tx.emit(AppEvent::Crawl(CrawlEvent::LoginSucceeded {
            url: url.to_string(),
        }));
    }
}

async fn write_file(dest: &Path, content: &[u8]) -> Result<(), Error> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                message: e.to_string(),
            }
        })?;
    }
    tokio::fs::write(dest, content)
        .await
        .map_err(|e| StorageError::WriteFailed {
            path: dest.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(())
}
