//! Record mutation dispatcher.
//!
//! Sends updates and confirmed deletes. Responses are never merged into the
//! view; the caller reloads the record set after every success. At most one
//! mutation per (table, row) is in flight at a time.

use log::{info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::client::AdminClient;
use crate::error::MutationError;
use crate::models::{Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    table: String,
    id: RecordId,
}

/// A delete the operator has asked for but not yet confirmed.
///
/// Only [`MutationDispatcher::request_delete`] creates one, so a delete
/// cannot be dispatched without passing through the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    table: String,
    id: RecordId,
}

impl PendingDelete {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Releases the in-flight slot on drop, including when the future is dropped.
struct InFlightGuard {
    rows: Arc<Mutex<HashSet<RowKey>>>,
    key: RowKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.rows.lock().remove(&self.key);
    }
}

#[derive(Clone)]
pub struct MutationDispatcher {
    client: AdminClient,
    in_flight: Arc<Mutex<HashSet<RowKey>>>,
}

impl MutationDispatcher {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// True while a mutation for this row is awaiting its response; the UI
    /// disables the row's controls meanwhile.
    pub fn is_in_flight(&self, table: &str, id: &RecordId) -> bool {
        self.in_flight.lock().contains(&RowKey {
            table: table.to_string(),
            id: id.clone(),
        })
    }

    fn claim(&self, table: &str, id: &RecordId) -> Result<InFlightGuard, MutationError> {
        let key = RowKey {
            table: table.to_string(),
            id: id.clone(),
        };
        if !self.in_flight.lock().insert(key.clone()) {
            warn!("[MUTATION] Rejected concurrent change to {}/{}", table, id);
            return Err(MutationError::InFlight {
                table: table.to_string(),
                id: id.clone(),
            });
        }
        Ok(InFlightGuard {
            rows: Arc::clone(&self.in_flight),
            key,
        })
    }

    /// `update(tableName, recordId, fields)`. No retry on failure.
    pub async fn update(&self, table: &str, id: &RecordId, fields: &Record) -> Result<(), MutationError> {
        let _slot = self.claim(table, id)?;
        self.client.update_record(table, id, fields).await?;
        info!("[MUTATION] Updated {}/{}", table, id);
        Ok(())
    }

    /// First step of a delete: record the operator's intent.
    pub fn request_delete(&self, table: &str, id: &RecordId) -> PendingDelete {
        PendingDelete {
            table: table.to_string(),
            id: id.clone(),
        }
    }

    /// Second step: dispatch a confirmed delete. No retry on failure.
    pub async fn delete(&self, confirmed: PendingDelete) -> Result<(), MutationError> {
        let _slot = self.claim(&confirmed.table, &confirmed.id)?;
        self.client
            .delete_record(&confirmed.table, &confirmed.id)
            .await?;
        info!("[MUTATION] Deleted {}/{}", confirmed.table, confirmed.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiRequest, ApiResponse, Transport};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    /// Holds every request until the test releases it.
    struct GatedTransport {
        gate: Notify,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(&self, _request: ApiRequest) -> crate::Result<ApiResponse> {
            self.gate.notified().await;
            Ok(ApiResponse::json(json!({ "message": "ok" })))
        }
    }

    fn dispatcher() -> MutationDispatcher {
        let client = AdminClient::builder()
            .base_url("http://127.0.0.1:5000")
            .build()
            .unwrap();
        MutationDispatcher::new(client)
    }

    #[test]
    fn test_one_mutation_per_row() {
        let dispatcher = dispatcher();
        let id = RecordId::from(1);

        let slot = dispatcher.claim("users", &id).unwrap();
        assert!(dispatcher.is_in_flight("users", &id));
        assert_eq!(
            dispatcher.claim("users", &id).err(),
            Some(MutationError::InFlight {
                table: "users".into(),
                id: id.clone()
            })
        );

        // Other rows and same id in another table are independent
        assert!(dispatcher.claim("users", &RecordId::from(2)).is_ok());
        assert!(dispatcher.claim("bookings", &id).is_ok());

        drop(slot);
        assert!(!dispatcher.is_in_flight("users", &id));
        assert!(dispatcher.claim("users", &id).is_ok());
    }

    #[test]
    fn test_request_delete_sends_nothing() {
        let dispatcher = dispatcher();
        let pending = dispatcher.request_delete("users", &RecordId::from("a-7"));
        assert_eq!(pending.table(), "users");
        assert_eq!(pending.id().as_str(), "a-7");
        assert!(!dispatcher.is_in_flight("users", pending.id()));
    }

    #[tokio::test]
    async fn test_concurrent_update_on_shared_dispatcher() {
        let transport = Arc::new(GatedTransport { gate: Notify::new() });
        let client = AdminClient::builder()
            .build_with_transport(transport.clone())
            .unwrap();
        let dispatcher = MutationDispatcher::new(client);
        let record: Record = [("id", json!(1)), ("email", json!("b@x.com"))]
            .into_iter()
            .collect();

        let first = tokio::spawn({
            let dispatcher = dispatcher.clone();
            let record = record.clone();
            async move { dispatcher.update("users", &RecordId::from(1), &record).await }
        });
        while !dispatcher.is_in_flight("users", &RecordId::from(1)) {
            tokio::task::yield_now().await;
        }

        let second = dispatcher.update("users", &RecordId::from(1), &record).await;
        assert!(matches!(second, Err(MutationError::InFlight { .. })));
        let delete = dispatcher.delete(dispatcher.request_delete("users", &RecordId::from(1))).await;
        assert!(matches!(delete, Err(MutationError::InFlight { .. })));

        transport.gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!dispatcher.is_in_flight("users", &RecordId::from(1)));
    }
}
