//! Request execution over the shared HTTP client
//!
//! The [`UpdateContext`] bounds one call with an optional deadline and an
//! optional cancellation signal. When either fires, the in-flight request
//! future is dropped, which aborts the exchange and discards any partial body.

use super::request::UpdateRequest;
use crate::error::{Error, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Client identifier sent with every update request
pub const USER_AGENT: &str = concat!("ddns/", env!("CARGO_PKG_VERSION"));

/// Default timeout for the shared client
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by every provider
///
/// Build it once and pass it to each update; the connection pool lives in it.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::network(format!("building http client: {}", e)))
}

/// Deadline and cancellation for one update call
#[derive(Debug, Clone, Default)]
pub struct UpdateContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`UpdateContext`] cloned from the one it was created with
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl UpdateContext {
    /// Context without deadline or cancellation
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Give up at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation signal
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle(tx))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn cancelled(&self) {
        if let Some(rx) = &self.cancel {
            let mut rx = rx.clone();
            if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                return;
            }
        }
        // No signal attached, or its handle was dropped without cancelling
        std::future::pending::<()>().await
    }

    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

/// Send `request` and read the whole body
///
/// Returns the status code and body text; classification is up to the caller.
pub async fn execute(
    ctx: &UpdateContext,
    client: &reqwest::Client,
    request: &UpdateRequest,
) -> Result<(u16, String)> {
    if ctx.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let exchange = async {
        let response = client
            .get(request.url().clone())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::network(format!("doing http request: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("reading response: {}", e.without_url())))?;

        Ok((status, body))
    };

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(Error::Cancelled),
        _ = ctx.expired() => Err(Error::network("deadline exceeded")),
        result = exchange => result,
    }
}
