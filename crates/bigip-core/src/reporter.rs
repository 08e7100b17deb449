// ── Task reporting ──
//
// State transitions are pushed to the block's self link without holding
// up the workflow. Delivery outcome is logged on its own and never feeds
// back into the workflow result.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use bigip_api::auth::IDENTIFIED_DEVICE_HEADER;
use reqwest::header::REFERER;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::task::TaskReport;

/// Receives task state reports. Implementations must not block.
pub trait TaskReporter: Send + Sync + fmt::Debug {
    /// Deliver `report` for the block at `self_link`. Fire-and-forget.
    fn report(&self, self_link: &str, report: TaskReport);
}

// ── HTTP reporter ───────────────────────────────────────────────────

/// Reports by PATCHing the block record on the local device.
///
/// Cheaply cloneable; clones share pending deliveries.
#[derive(Clone)]
pub struct HttpTaskReporter {
    inner: Arc<HttpReporterInner>,
}

struct HttpReporterInner {
    http: reqwest::Client,
    local_base_url: Url,
    referrer: Url,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for HttpTaskReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTaskReporter")
            .field("local_base_url", &self.inner.local_base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTaskReporter {
    pub fn new(http: reqwest::Client, local_base_url: Url, referrer: Url) -> Self {
        Self {
            inner: Arc::new(HttpReporterInner {
                http,
                local_base_url,
                referrer,
                pending: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Send one report and wait for the device to acknowledge it.
    ///
    /// Only the path of `self_link` is used; the block record always
    /// lives on the local device.
    pub async fn deliver(&self, self_link: &str, report: &TaskReport) -> Result<(), bigip_api::Error> {
        let path = match Url::parse(self_link) {
            Ok(url) => url.path().to_owned(),
            Err(_) => self_link.to_owned(),
        };
        let url = self.inner.local_base_url.join(&path)?;
        debug!("PATCH {}", url);

        let resp = self
            .inner
            .http
            .patch(url)
            .header(REFERER, self.inner.referrer.as_str())
            .header(IDENTIFIED_DEVICE_HEADER, "true")
            .json(report)
            .send()
            .await?;
        bigip_api::read_response(resp).await.map(drop)
    }

    /// Wait for every report handed out so far to finish delivering.
    pub async fn flush(&self) {
        let handles: Vec<_> = {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            pending.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "task report delivery panicked");
            }
        }
    }
}

impl TaskReporter for HttpTaskReporter {
    fn report(&self, self_link: &str, report: TaskReport) {
        let reporter = self.clone();
        let self_link = self_link.to_owned();
        let handle = tokio::spawn(async move {
            let state = report.block.state;
            match reporter.deliver(&self_link, &report).await {
                Ok(()) => debug!(self_link = %self_link, %state, "task report delivered"),
                Err(e) => warn!(self_link = %self_link, %state, error = %e, "task report delivery failed"),
            }
        });

        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}

// ── In-memory reporter ──────────────────────────────────────────────

/// Collects reports in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<(String, TaskReport)>>,
}

impl MemoryReporter {
    /// Snapshot of every report received, oldest first.
    pub fn reports(&self) -> Vec<(String, TaskReport)> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<TaskReport> {
        self.reports().pop().map(|(_, report)| report)
    }
}

impl TaskReporter for MemoryReporter {
    fn report(&self, self_link: &str, report: TaskReport) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((self_link.to_owned(), report));
    }
}
