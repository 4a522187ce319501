//! Store gateway: retry policy and bounded concurrency over a client.
//!
//! The gateway owns the operational policy the raw client does not:
//! identifier and timestamp assignment, a semaphore that bounds
//! concurrent outbound operations (queueing or failing fast when
//! exhausted), and bounded exponential-backoff retries for transient
//! faults. Conflicts are never retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use super::errors::{StoreError, StoreResult};
use super::record::{RecordCandidate, StoreRecord};
use super::StoreClient;
use crate::observability::Logger;

/// Behavior when every pool permit is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolWait {
    /// Callers queue for a permit
    #[default]
    Queue,
    /// Callers fail immediately with `PoolExhausted`
    FailFast,
}

/// Gateway tuning knobs.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Maximum concurrent outbound operations
    pub pool_size: usize,
    /// Behavior on pool exhaustion
    pub pool_wait: PoolWait,
    /// Total connection attempts per operation (first try included)
    pub retry_budget: u32,
    /// Base delay for exponential backoff between attempts
    pub backoff_base: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            pool_size: 16,
            pool_wait: PoolWait::Queue,
            retry_budget: 3,
            backoff_base: Duration::from_millis(50),
        }
    }
}

/// Boundary abstraction over the networked document store.
pub struct StoreGateway<C: StoreClient> {
    client: C,
    permits: Semaphore,
    options: GatewayOptions,
}

impl<C: StoreClient> StoreGateway<C> {
    /// Creates a gateway over a client.
    pub fn new(client: C, options: GatewayOptions) -> Self {
        let permits = Semaphore::new(options.pool_size.max(1));
        Self {
            client,
            permits,
            options,
        }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Persists an accepted document, assigning its identifier and
    /// timestamp. Retries transient faults within the budget; a
    /// conflict is surfaced immediately.
    pub async fn put(&self, candidate: RecordCandidate) -> StoreResult<StoreRecord> {
        let _permit = self.acquire().await?;
        let record = candidate.into_record();

        let mut attempt: u32 = 1;
        loop {
            match self.client.insert(&record).await {
                Ok(()) => return Ok(record),
                Err(e) if e.is_transient() && attempt < self.options.retry_budget => {
                    Logger::warn(
                        "STORE_RETRY",
                        &[
                            ("attempt", &attempt.to_string()),
                            ("budget", &self.options.retry_budget.to_string()),
                            ("reason", e.message()),
                        ],
                    );
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetches a record by identifier. Transient faults are retried
    /// within the budget.
    pub async fn get(&self, id: &str) -> StoreResult<StoreRecord> {
        let _permit = self.acquire().await?;

        let mut attempt: u32 = 1;
        loop {
            match self.client.fetch(id).await {
                Ok(record) => return Ok(record),
                Err(e) if e.is_transient() && attempt < self.options.retry_budget => {
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Replaces an existing record in place, refusing to create one.
    /// Retries transient faults within the budget.
    pub async fn replace(&self, record: &StoreRecord) -> StoreResult<()> {
        let _permit = self.acquire().await?;

        let mut attempt: u32 = 1;
        loop {
            match self.client.replace(record).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.options.retry_budget => {
                    Logger::warn(
                        "STORE_RETRY",
                        &[
                            ("attempt", &attempt.to_string()),
                            ("budget", &self.options.retry_budget.to_string()),
                            ("reason", e.message()),
                        ],
                    );
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Deletes a record by identifier. Transient faults are retried
    /// within the budget.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let _permit = self.acquire().await?;

        let mut attempt: u32 = 1;
        loop {
            match self.client.delete(id).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.options.retry_budget => {
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Probes store reachability. Single attempt, no retries: health
    /// checks want the current answer, not an eventual one.
    pub async fn ping(&self) -> StoreResult<()> {
        self.client.ping().await
    }

    async fn acquire(&self) -> StoreResult<tokio::sync::SemaphorePermit<'_>> {
        match self.options.pool_wait {
            PoolWait::Queue => self
                .permits
                .acquire()
                .await
                .map_err(|_| StoreError::unavailable("connection pool closed")),
            PoolWait::FailFast => self
                .permits
                .try_acquire()
                .map_err(|_| StoreError::pool_exhausted("no connection permit available")),
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        // attempt 1 waits base, attempt 2 waits 2x base, then 4x...
        self.options
            .backoff_base
            .saturating_mul(1u32 << (attempt - 1).min(16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn candidate() -> RecordCandidate {
        RecordCandidate::new("user", 1, json!({"name": "A"}))
    }

    #[tokio::test]
    async fn test_put_assigns_identity() {
        let gateway = StoreGateway::new(MemoryStore::new(), GatewayOptions::default());
        let record = gateway.put(candidate()).await.unwrap();
        assert!(!record.id.is_empty());
        assert!(gateway.client().contains(&record.id));
    }

    #[tokio::test]
    async fn test_get_round_trip() {
        let gateway = StoreGateway::new(MemoryStore::new(), GatewayOptions::default());
        let record = gateway.put(candidate()).await.unwrap();
        let fetched = gateway.get(&record.id).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_replace_and_delete_round_trip() {
        let gateway = StoreGateway::new(MemoryStore::new(), GatewayOptions::default());
        let mut record = gateway.put(candidate()).await.unwrap();

        record.document = json!({"name": "B"});
        gateway.replace(&record).await.unwrap();
        assert_eq!(gateway.get(&record.id).await.unwrap().document, json!({"name": "B"}));

        gateway.delete(&record.id).await.unwrap();
        assert!(gateway.client().is_empty());
    }

    #[tokio::test]
    async fn test_backoff_doubles() {
        let gateway = StoreGateway::new(
            MemoryStore::new(),
            GatewayOptions {
                backoff_base: Duration::from_millis(10),
                ..GatewayOptions::default()
            },
        );
        assert_eq!(gateway.backoff_delay(1), Duration::from_millis(10));
        assert_eq!(gateway.backoff_delay(2), Duration::from_millis(20));
        assert_eq!(gateway.backoff_delay(3), Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_fail_fast_pool() {
        let gateway = StoreGateway::new(
            MemoryStore::new(),
            GatewayOptions {
                pool_size: 1,
                pool_wait: PoolWait::FailFast,
                ..GatewayOptions::default()
            },
        );

        let _held = gateway.permits.try_acquire().unwrap();
        let err = gateway.get("any").await.unwrap_err();
        assert_eq!(err.kind(), crate::store::StoreErrorKind::PoolExhausted);
    }
}
