//! HTTP client with optional retry and status handling.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use reqwest::Client;
use std::io::Write;
use std::time::Duration;

use super::retry::{
    DEFAULT_ATTEMPTS, NonRetryableError, RETRY_DELAY_MS, check_retryable, classify_status,
};

/// What to do with a non-success HTTP status on download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Log a warning and write the response body anyway. Server errors are
    /// still retried while attempts remain.
    #[default]
    Lenient,
    /// Fail before creating the destination file.
    Strict,
}

/// HTTP client used for artifact downloads.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    attempts: usize,
    retry_delay: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            attempts: DEFAULT_ATTEMPTS,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }

    /// Total attempts per download, including the first. Clamped to at least one.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Streams the body at `url` into the writer returned by `create_writer`.
    /// The writer is only created once response headers have arrived.
    /// Returns the number of bytes written.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(
        &self,
        url: &str,
        policy: StatusPolicy,
        create_writer: F,
    ) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        debug!("Downloading file from {}...", url);

        let create_writer = &create_writer;
        self.with_retry("Download", move |attempt| {
            let final_attempt = attempt >= self.attempts;
            self.download_file_once(url, policy, final_attempt, create_writer)
        })
        .await
    }

    /// Single download attempt without retry.
    async fn download_file_once<W, F>(
        &self,
        url: &str,
        policy: StatusPolicy,
        final_attempt: bool,
        create_writer: &F,
    ) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let mut response = match policy {
            StatusPolicy::Strict => response.error_for_status().map_err(check_retryable)?,
            StatusPolicy::Lenient => {
                let status = response.status();
                if !status.is_success() {
                    if !final_attempt && classify_status(status, url).is_ok() {
                        bail!("{} answered HTTP {}", url, status);
                    }
                    warn!("{} answered HTTP {}; saving the body anyway", url, status);
                }
                response
            }
        };

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!("Downloaded {} bytes from {}", downloaded_bytes, url);

        Ok(downloaded_bytes)
    }

    /// Executes an async operation, retrying transient failures.
    /// `operation` receives the 1-based attempt number.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn(usize) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(e) if !is_retryable_error(&e) || attempt >= self.attempts => {
                    debug!("{}: giving up after attempt {}: {}", operation_name, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {:?}...",
                        operation_name, attempt, self.attempts, e, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Everything except an explicit [`NonRetryableError`] may succeed on retry.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}
