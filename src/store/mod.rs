//! Document store subsystem.
//!
//! The store is an external networked service; this module only knows
//! put/get/ping semantics. `StoreClient` is the opaque transport,
//! `StoreGateway` wraps any client with identifier assignment, bounded
//! concurrency, and retry policy. Two clients ship: `MemoryStore` for
//! embedded use and tests, `RemoteStore` for a store reachable via a
//! connection string.

mod errors;
mod gateway;
mod memory;
mod record;
mod remote;

pub use errors::{StoreError, StoreErrorKind, StoreResult};
pub use gateway::{GatewayOptions, PoolWait, StoreGateway};
pub use memory::MemoryStore;
pub use record::{RecordCandidate, StoreRecord};
pub use remote::RemoteStore;

/// Transport to a document store. Implementations perform a single
/// attempt per call; retry policy lives in the gateway.
#[allow(async_fn_in_trait)]
pub trait StoreClient: Send + Sync + 'static {
    /// Inserts a record under optimistic semantics: a duplicate
    /// identifier is a conflict.
    async fn insert(&self, record: &StoreRecord) -> StoreResult<()>;

    /// Fetches a record by identifier.
    async fn fetch(&self, id: &str) -> StoreResult<StoreRecord>;

    /// Replaces an existing record in place; a missing identifier is
    /// `NotFound`, never an insert.
    async fn replace(&self, record: &StoreRecord) -> StoreResult<()>;

    /// Deletes a record by identifier; a missing identifier is
    /// `NotFound`.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Probes reachability.
    async fn ping(&self) -> StoreResult<()>;
}

/// Concrete store selection made at boot from configuration.
pub enum StoreBackend {
    /// In-process store (no `store_url` configured)
    Memory(MemoryStore),
    /// Networked store behind a connection string
    Remote(RemoteStore),
}

impl StoreClient for StoreBackend {
    async fn insert(&self, record: &StoreRecord) -> StoreResult<()> {
        match self {
            StoreBackend::Memory(s) => s.insert(record).await,
            StoreBackend::Remote(s) => s.insert(record).await,
        }
    }

    async fn fetch(&self, id: &str) -> StoreResult<StoreRecord> {
        match self {
            StoreBackend::Memory(s) => s.fetch(id).await,
            StoreBackend::Remote(s) => s.fetch(id).await,
        }
    }

    async fn replace(&self, record: &StoreRecord) -> StoreResult<()> {
        match self {
            StoreBackend::Memory(s) => s.replace(record).await,
            StoreBackend::Remote(s) => s.replace(record).await,
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        match self {
            StoreBackend::Memory(s) => s.delete(id).await,
            StoreBackend::Remote(s) => s.delete(id).await,
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        match self {
            StoreBackend::Memory(s) => s.ping().await,
            StoreBackend::Remote(s) => s.ping().await,
        }
    }
}
