#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Crawl engine for mscrape
//!
//! Drives a breadth-first crawl over a site's structure tree: pages are
//! fetched one at a time and evaluated into commands, while file downloads
//! run concurrently under a semaphore. All progress is reported as events;
//! per-page failures are counted and do not abort the crawl.

mod crawler;
mod report;

pub use crawler::Crawler;
pub use report::CrawlReport;
