#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for mscrape
//!
//! This crate handles all HTTP operations: page fetching, login form
//! submission, and streaming media downloads, with connection pooling,
//! a shared cookie jar, and retry logic.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{Download, DownloadResult};

use mscrape_errors::{Error, NetworkError};
use mscrape_events::EventSender;
use std::collections::BTreeMap;
use std::path::Path;

/// A fetched page body together with the URL that served it
///
/// The URL is taken from the response, so redirects are already applied.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

/// Fetch a page and decode its body as text
///
/// # Errors
///
/// Returns an error if the request fails, the server returns a non-success
/// status, or the body cannot be decoded as text.
pub async fn fetch_page(client: &NetClient, url: &str) -> Result<FetchedPage, Error> {
    let response = client.get(url).await?;

    if !response.status().is_success() {
        return Err(NetworkError::HttpError {
            status: response.status().as_u16(),
            url: url.to_string(),
        }
        .into());
    }

    let final_url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

    Ok(FetchedPage {
        url: final_url,
        body,
    })
}

/// Submit a login form and require a success status
///
/// # Errors
///
/// Returns [`NetworkError::LoginFailed`] when the server rejects the form.
pub async fn submit_login_form(
    client: &NetClient,
    url: &str,
    formdata: &BTreeMap<String, String>,
) -> Result<(), Error> {
    let response = client.post_form(url, formdata).await?;

    if !response.status().is_success() {
        return Err(NetworkError::LoginFailed(format!(
            "{url} returned {}",
            response.status()
        ))
        .into());
    }

    Ok(())
}

/// Download a file with progress reporting
///
/// # Errors
///
/// Returns an error if the URL is invalid, the download fails, or there
/// are I/O errors while writing the file.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    tx: &EventSender,
) -> Result<DownloadResult, Error> {
    let download = Download::new(url)?;
    download.execute(client, dest, tx).await
}
