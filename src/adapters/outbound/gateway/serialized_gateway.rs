use crate::config::HierarchyConfig;
use crate::hierarchy::domain::{JobNumber, LegacyRow, Part, WorkOrderKey};
use crate::ports::outbound::QueryGateway;
use crate::shared::{HierarchyError, HierarchyResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

/// SerializedGateway wraps a QueryGateway and funnels every call through one
/// logical connection.
///
/// This adapter implements the decorator pattern on top of the driver-level
/// gateway. The legacy data source is reached over a single connection, so
/// calls are queued FIFO on an async mutex, each attempt is bounded by a
/// timeout, and connection errors and timeouts are retried with a linear
/// backoff. Query errors are returned as they are.
///
/// Callers are served strictly in arrival order with no priority. A retried
/// call gives up its place during the backoff and queues again behind every
/// call that arrived meanwhile.
///
/// # Throughput
/// Expansions requested concurrently are logically parallel in the
/// coordinator but execute one at a time here. This is the throughput
/// ceiling of the whole hierarchy browser; raising the fetch pool size does
/// not raise it.
pub struct SerializedGateway<G: QueryGateway> {
    inner: G,
    connection: Mutex<()>,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl<G: QueryGateway> SerializedGateway<G> {
    pub fn new(inner: G, timeout: Duration, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            connection: Mutex::new(()),
            timeout,
            max_retries,
            backoff,
        }
    }

    /// Creates a gateway using the timeout and retry settings of `config`
    pub fn from_config(inner: G, config: &HierarchyConfig) -> Self {
        Self::new(
            inner,
            config.fetch_timeout(),
            config.max_retries,
            config.retry_backoff(),
        )
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    async fn call<T, F, Fut>(&self, operation: &'static str, attempt: F) -> HierarchyResult<T>
    where
        T: Send,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = HierarchyResult<T>> + Send,
    {
        let mut retries = 0u32;
        loop {
            let result = {
                let _connection = self.connection.lock().await;
                match tokio::time::timeout(self.timeout, attempt()).await {
                    Ok(result) => result,
                    Err(_) => Err(HierarchyError::Timeout {
                        operation: operation.to_string(),
                        seconds: self.timeout.as_secs(),
                    }),
                }
            };

            match result {
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(operation, retries, error = %e, "gateway call failed; retrying");
                    tokio::time::sleep(self.backoff * retries).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl<G: QueryGateway> QueryGateway for SerializedGateway<G> {
    async fn fetch_assemblies(&self, job_number: &JobNumber) -> HierarchyResult<Vec<LegacyRow>> {
        self.call("fetch_assemblies", || self.inner.fetch_assemblies(job_number))
            .await
    }

    async fn fetch_children(&self, key: &WorkOrderKey) -> HierarchyResult<Vec<LegacyRow>> {
        self.call("fetch_children", || self.inner.fetch_children(key))
            .await
    }

    async fn fetch_part(&self, part_id: &str) -> HierarchyResult<Part> {
        self.call("fetch_part", || self.inner.fetch_part(part_id))
            .await
    }
}
