//! Remote store client.
//!
//! Speaks a minimal newline-delimited JSON protocol to a networked
//! document store: one request object per line, one response object per
//! line. The connection is established lazily on first use and cached;
//! any transport fault drops the cached connection and surfaces as
//! `Unavailable`, leaving reconnection to the next attempt.
//!
//! A single cached connection is held under a mutex for the duration of
//! each exchange, so remote operations serialize here even when the
//! gateway pool admits more concurrency. Acceptable for the current
//! request-per-line protocol; a per-client connection pool would be the
//! next step if the remote store becomes the bottleneck.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::errors::{StoreError, StoreResult};
use super::record::StoreRecord;
use super::StoreClient;

/// Client for a document store reachable via `host:port`.
pub struct RemoteStore {
    addr: String,
    conn: Mutex<Option<BufStream<TcpStream>>>,
}

impl RemoteStore {
    /// Creates a client for the given connection string. No connection
    /// is made until the first operation.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            conn: Mutex::new(None),
        }
    }

    /// Returns the connection string.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn request(&self, payload: Value) -> StoreResult<Value> {
        let mut guard = self.conn.lock().await;

        let stream = match guard.take() {
            Some(stream) => guard.insert(stream),
            None => {
                let stream = TcpStream::connect(&self.addr).await.map_err(|e| {
                    StoreError::unavailable(format!("connect to '{}' failed: {}", self.addr, e))
                })?;
                guard.insert(BufStream::new(stream))
            }
        };

        match Self::exchange(stream, &payload).await {
            Ok(response) => Ok(response),
            Err(e) => {
                // Connection state is unknown after a fault; reconnect
                // on the next attempt.
                *guard = None;
                Err(e)
            }
        }
    }

    async fn exchange(
        stream: &mut BufStream<TcpStream>,
        payload: &Value,
    ) -> StoreResult<Value> {
        let mut line = serde_json::to_string(payload)
            .map_err(|e| StoreError::unavailable(format!("encode failed: {}", e)))?;
        line.push('\n');

        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::unavailable(format!("write failed: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| StoreError::unavailable(format!("flush failed: {}", e)))?;

        let mut response = String::new();
        let n = stream
            .read_line(&mut response)
            .await
            .map_err(|e| StoreError::unavailable(format!("read failed: {}", e)))?;
        if n == 0 {
            return Err(StoreError::unavailable("store closed the connection"));
        }

        let response: Value = serde_json::from_str(response.trim_end())
            .map_err(|e| StoreError::unavailable(format!("malformed response: {}", e)))?;

        match response.get("error") {
            Some(error) => Err(decode_error(error)),
            None => Ok(response),
        }
    }
}

impl StoreClient for RemoteStore {
    async fn insert(&self, record: &StoreRecord) -> StoreResult<()> {
        self.request(json!({"op": "insert", "record": record}))
            .await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> StoreResult<StoreRecord> {
        let response = self.request(json!({"op": "fetch", "id": id})).await?;
        let record = response
            .get("record")
            .cloned()
            .ok_or_else(|| StoreError::unavailable("response missing record"))?;
        serde_json::from_value(record)
            .map_err(|e| StoreError::unavailable(format!("malformed record: {}", e)))
    }

    async fn replace(&self, record: &StoreRecord) -> StoreResult<()> {
        self.request(json!({"op": "replace", "record": record}))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.request(json!({"op": "delete", "id": id})).await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.request(json!({"op": "ping"})).await?;
        Ok(())
    }
}

fn decode_error(error: &Value) -> StoreError {
    let kind = error.get("kind").and_then(|v| v.as_str()).unwrap_or("");
    let message = error
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("store reported an error");
    match kind {
        "conflict" => StoreError::conflict(message),
        "not_found" => StoreError::not_found(message),
        _ => StoreError::unavailable(message),
    }
}
