//! Streaming file download with progress reporting

use futures::StreamExt;
use mscrape_errors::{Error, NetworkError};
use mscrape_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::NetClient;

/// Download operation handle
pub struct Download {
    url: Url,
}

/// Result of a download operation
#[derive(Debug)]
pub struct DownloadResult {
    pub url: String,
    pub size: u64,
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the provided URL cannot be parsed.
    pub fn new(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        Ok(Self { url })
    }

    /// Execute the download
    ///
    /// The body is streamed into a `.download` temp file next to `dest`
    /// and renamed into place once complete, so an interrupted download
    /// never leaves a truncated file under the final name.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns an
    /// error status, or the file cannot be created or written.
    pub async fn execute(
        self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let url_str = self.url.to_string();

        let response = client.get(url_str.as_str()).await?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                url: url_str,
            }
            .into());
        }

        let content_length = response.content_length();

        tx.emit(AppEvent::Download(DownloadEvent::Started {
            url: url_str.clone(),
            total_size: content_length,
        }));

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }

        // Append to the full file name so same-stem targets in one
        // directory never share a partial file
        let mut temp_name = dest
            .file_name()
            .map_or_else(|| OsString::from("download"), OsStr::to_os_string);
        temp_name.push(".download");
        let temp_path = dest.with_file_name(temp_name);
        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &temp_path))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, &temp_path))?;

            downloaded += chunk.len() as u64;

            if let Some(total) = content_length {
                tx.emit(AppEvent::Download(DownloadEvent::Progress {
                    url: url_str.clone(),
                    bytes_downloaded: downloaded,
                    total_bytes: total,
                }));
            }
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, &temp_path))?;
        drop(file);

        tokio::fs::rename(&temp_path, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        tx.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url_str.clone(),
            size: downloaded,
        }));

        Ok(DownloadResult {
            url: url_str,
            size: downloaded,
        })
    }
}
