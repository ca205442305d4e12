//! Authoritative store of interest records.
//!
//! [`InterestStore`] keeps every active submission behind a single
//! [`tokio::sync::RwLock`]. Records are appended in creation order, so
//! a plain scan yields the creation-ascending ordering the matcher
//! relies on. The write lock makes [`InterestStore::mark_matched_pair`]
//! the sole serialization point for concurrent match attempts.

use tokio::sync::RwLock;

use super::interest::{InterestRecord, WaitingInterest};
use super::{ConnectionId, InterestId, RoomId};
use crate::error::GatewayError;

/// Central store for all interest records, matched and waiting.
///
/// # Concurrency
///
/// - Reads (listing, lookups) may run concurrently.
/// - All mutations serialize on the single write lock, so the
///   conditional update in [`InterestStore::mark_matched_pair`] is
///   atomic: either both records are claimed or neither is.
#[derive(Debug)]
pub struct InterestStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Records in creation order. Matched records stay in place.
    records: Vec<InterestRecord>,
    /// Embedding dimension, pinned by the first accepted record.
    dimension: Option<usize>,
}

impl InterestStore {
    /// Creates an empty store. The embedding dimension is pinned by the
    /// first record accepted into it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Creates a new unmatched record for `connection_id`.
    ///
    /// A connection holds at most one unmatched record: a re-submission
    /// while a previous record is still waiting replaces that record in
    /// the same locked section.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] if the text is empty or
    /// whitespace, the embedding is empty, or the embedding dimension
    /// does not match the store's pinned dimension.
    pub async fn create(
        &self,
        connection_id: ConnectionId,
        text: &str,
        embedding: Vec<f32>,
    ) -> Result<InterestRecord, GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::Validation(
                "interest text must not be empty".to_string(),
            ));
        }
        if embedding.is_empty() {
            return Err(GatewayError::Validation(
                "embedding must not be empty".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;
        if let Some(dimension) = inner.dimension
            && embedding.len() != dimension
        {
            return Err(GatewayError::Validation(format!(
                "embedding dimension {} does not match expected {dimension}",
                embedding.len()
            )));
        }
        inner.dimension = Some(embedding.len());

        // Replace any still-waiting record from the same connection.
        inner
            .records
            .retain(|r| r.matched || r.connection_id != connection_id);

        let record = InterestRecord {
            id: InterestId::new(),
            connection_id,
            text: text.to_string(),
            embedding,
            matched: false,
            room_id: None,
            created_at: chrono::Utc::now(),
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    /// Returns all unmatched records in creation-ascending order,
    /// optionally excluding one connection's own record.
    pub async fn list_unmatched(&self, exclude: Option<ConnectionId>) -> Vec<InterestRecord> {
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .filter(|r| !r.matched && exclude.is_none_or(|conn| r.connection_id != conn))
            .cloned()
            .collect()
    }

    /// Returns the waiting-list projection of all unmatched records,
    /// oldest first.
    pub async fn waiting_list(&self) -> Vec<WaitingInterest> {
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .filter(|r| !r.matched)
            .map(WaitingInterest::from)
            .collect()
    }

    /// Looks up a record by id.
    pub async fn get(&self, id: InterestId) -> Option<InterestRecord> {
        let inner = self.inner.read().await;
        inner.records.iter().find(|r| r.id == id).cloned()
    }

    /// Returns the connection's unmatched record, if it has one.
    pub async fn find_unmatched_by_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Option<InterestRecord> {
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .find(|r| !r.matched && r.connection_id == connection_id)
            .cloned()
    }

    /// Atomically marks both records matched and assigns `room_id`.
    ///
    /// The update is conditioned on both records still being unmatched
    /// and is all-or-nothing: a failed precondition leaves the store
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] if `a` and `b` are the same record.
    /// - [`GatewayError::InterestNotFound`] if either id is unknown.
    /// - [`GatewayError::AlreadyMatched`] if either record was already
    ///   claimed by a concurrent match.
    pub async fn mark_matched_pair(
        &self,
        a: InterestId,
        b: InterestId,
        room_id: &RoomId,
    ) -> Result<(), GatewayError> {
        if a == b {
            return Err(GatewayError::Validation(
                "cannot match a record with itself".to_string(),
            ));
        }

        let mut inner = self.inner.write().await;

        // Validate both preconditions before touching either record.
        for id in [a, b] {
            let record = inner
                .records
                .iter()
                .find(|r| r.id == id)
                .ok_or(GatewayError::InterestNotFound(id.into()))?;
            if record.matched {
                return Err(GatewayError::AlreadyMatched);
            }
        }

        for record in inner.records.iter_mut() {
            if record.id == a || record.id == b {
                record.matched = true;
                record.room_id = Some(room_id.clone());
            }
        }
        Ok(())
    }

    /// Removes the connection's unmatched record, if any, returning it.
    ///
    /// Matched records belonging to the connection are left untouched.
    pub async fn delete_unmatched_by_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Option<InterestRecord> {
        let mut inner = self.inner.write().await;
        let position = inner
            .records
            .iter()
            .position(|r| !r.matched && r.connection_id == connection_id)?;
        Some(inner.records.remove(position))
    }

    /// Returns the total number of records, matched included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

impl Default for InterestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn create_or_panic(
        store: &InterestStore,
        conn: ConnectionId,
        text: &str,
        embedding: Vec<f32>,
    ) -> InterestRecord {
        match store.create(conn, text, embedding).await {
            Ok(record) => record,
            Err(e) => panic!("create failed: {e}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_empty_text() {
        let store = InterestStore::new();
        let result = store.create(ConnectionId::new(), "   ", vec![1.0]).await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_rejects_empty_embedding() {
        let store = InterestStore::new();
        let result = store.create(ConnectionId::new(), "hiking", vec![]).await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_mismatched_dimension() {
        let store = InterestStore::new();
        let _ = create_or_panic(&store, ConnectionId::new(), "hiking", vec![1.0, 0.0]).await;
        let result = store
            .create(ConnectionId::new(), "cooking", vec![1.0, 0.0, 0.0])
            .await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn resubmission_replaces_waiting_record() {
        let store = InterestStore::new();
        let conn = ConnectionId::new();
        let first = create_or_panic(&store, conn, "hiking", vec![1.0, 0.0]).await;
        let second = create_or_panic(&store, conn, "cooking", vec![0.0, 1.0]).await;
        assert_ne!(first.id, second.id);
        assert_eq!(store.len().await, 1);
        assert!(store.get(first.id).await.is_none());
    }

    #[tokio::test]
    async fn list_unmatched_orders_by_creation_and_excludes() {
        let store = InterestStore::new();
        let conn_a = ConnectionId::new();
        let conn_b = ConnectionId::new();
        let a = create_or_panic(&store, conn_a, "first", vec![1.0, 0.0]).await;
        let b = create_or_panic(&store, conn_b, "second", vec![0.0, 1.0]).await;

        let all = store.list_unmatched(None).await;
        let ids: Vec<InterestId> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        let excluded = store.list_unmatched(Some(conn_a)).await;
        let ids: Vec<InterestId> = excluded.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id]);
    }

    #[tokio::test]
    async fn mark_matched_pair_sets_room_on_both() {
        let store = InterestStore::new();
        let a = create_or_panic(&store, ConnectionId::new(), "a", vec![1.0]).await;
        let b = create_or_panic(&store, ConnectionId::new(), "b", vec![1.0]).await;

        let room = RoomId::generate();
        let result = store.mark_matched_pair(a.id, b.id, &room).await;
        assert!(result.is_ok());

        for id in [a.id, b.id] {
            let Some(record) = store.get(id).await else {
                panic!("record should exist");
            };
            assert!(record.matched);
            assert_eq!(record.room_id.as_ref(), Some(&room));
        }
    }

    #[tokio::test]
    async fn mark_matched_pair_rejects_claimed_record_without_partial_write() {
        let store = InterestStore::new();
        let a = create_or_panic(&store, ConnectionId::new(), "a", vec![1.0]).await;
        let b = create_or_panic(&store, ConnectionId::new(), "b", vec![1.0]).await;
        let c = create_or_panic(&store, ConnectionId::new(), "c", vec![1.0]).await;

        let first = RoomId::generate();
        assert!(store.mark_matched_pair(a.id, b.id, &first).await.is_ok());

        // b is claimed; pairing c with b must not touch c.
        let second = RoomId::generate();
        let result = store.mark_matched_pair(c.id, b.id, &second).await;
        assert!(matches!(result, Err(GatewayError::AlreadyMatched)));

        let Some(c_after) = store.get(c.id).await else {
            panic!("record should exist");
        };
        assert!(!c_after.matched);
        assert!(c_after.room_id.is_none());
    }

    #[tokio::test]
    async fn mark_matched_pair_unknown_id_is_not_found() {
        let store = InterestStore::new();
        let a = create_or_panic(&store, ConnectionId::new(), "a", vec![1.0]).await;
        let room = RoomId::generate();
        let result = store.mark_matched_pair(a.id, InterestId::new(), &room).await;
        assert!(matches!(result, Err(GatewayError::InterestNotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_claims_on_same_pair_succeed_exactly_once() {
        let store = InterestStore::new();
        let a = create_or_panic(&store, ConnectionId::new(), "a", vec![1.0]).await;
        let b = create_or_panic(&store, ConnectionId::new(), "b", vec![1.0]).await;

        let room_one = RoomId::generate();
        let room_two = RoomId::generate();
        let (first, second) = tokio::join!(
            store.mark_matched_pair(a.id, b.id, &room_one),
            store.mark_matched_pair(b.id, a.id, &room_two),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let already = [first, second]
            .into_iter()
            .filter(|r| matches!(r, Err(GatewayError::AlreadyMatched)))
            .count();
        assert_eq!(already, 1);

        // Both records carry the same room id, whichever claim won.
        let Some(a_after) = store.get(a.id).await else {
            panic!("record should exist");
        };
        let Some(b_after) = store.get(b.id).await else {
            panic!("record should exist");
        };
        assert!(a_after.matched && b_after.matched);
        assert_eq!(a_after.room_id, b_after.room_id);
    }

    #[tokio::test]
    async fn delete_unmatched_removes_only_own_waiting_record() {
        let store = InterestStore::new();
        let conn_a = ConnectionId::new();
        let conn_b = ConnectionId::new();
        let a = create_or_panic(&store, conn_a, "a", vec![1.0]).await;
        let b = create_or_panic(&store, conn_b, "b", vec![1.0]).await;

        let removed = store.delete_unmatched_by_connection(conn_a).await;
        assert_eq!(removed.map(|r| r.id), Some(a.id));
        assert!(store.get(a.id).await.is_none());
        assert!(store.get(b.id).await.is_some());
    }

    #[tokio::test]
    async fn delete_unmatched_leaves_matched_record_untouched() {
        let store = InterestStore::new();
        let conn_a = ConnectionId::new();
        let a = create_or_panic(&store, conn_a, "a", vec![1.0]).await;
        let b = create_or_panic(&store, ConnectionId::new(), "b", vec![1.0]).await;
        let room = RoomId::generate();
        assert!(store.mark_matched_pair(a.id, b.id, &room).await.is_ok());

        let removed = store.delete_unmatched_by_connection(conn_a).await;
        assert!(removed.is_none());
        let Some(a_after) = store.get(a.id).await else {
            panic!("matched record should be retained");
        };
        assert!(a_after.matched);
    }

    #[tokio::test]
    async fn waiting_list_skips_matched_records() {
        let store = InterestStore::new();
        let a = create_or_panic(&store, ConnectionId::new(), "a", vec![1.0]).await;
        let b = create_or_panic(&store, ConnectionId::new(), "b", vec![1.0]).await;
        let c = create_or_panic(&store, ConnectionId::new(), "c", vec![1.0]).await;
        let room = RoomId::generate();
        assert!(store.mark_matched_pair(a.id, b.id, &room).await.is_ok());

        let waiting = store.waiting_list().await;
        let ids: Vec<InterestId> = waiting.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![c.id]);
    }
}
