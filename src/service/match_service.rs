//! Matchmaking service: submission flow, room lifecycle, and relays.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    ConnectionId, EventBus, InterestId, InterestRecord, InterestStore, Room, RoomId, RoomRegistry,
    SessionEvent, SignalKind, WaitingInterest,
};
use crate::embedding::EmbeddingClient;
use crate::error::GatewayError;
use crate::matching::find_best_match;
use crate::persistence::InterestArchive;

use super::PresenceTracker;

/// Orchestration layer for the whole pairing flow.
///
/// Owns references to the [`InterestStore`], [`RoomRegistry`], and
/// [`PresenceTracker`], and publishes every state change through the
/// [`EventBus`]. Within one submission the order is fixed: embedding,
/// then the candidate scan, then the store's conditional update. The
/// store's [`InterestStore::mark_matched_pair`] is the only
/// serialization point between concurrent match attempts; on a lost
/// race this service re-scans instead of failing the submission.
#[derive(Debug)]
pub struct MatchService {
    store: Arc<InterestStore>,
    rooms: Arc<RoomRegistry>,
    presence: Arc<PresenceTracker>,
    embedding: EmbeddingClient,
    event_bus: EventBus,
    match_threshold: f64,
    archive: Option<InterestArchive>,
}

impl MatchService {
    /// Creates a new `MatchService`.
    #[must_use]
    pub fn new(
        store: Arc<InterestStore>,
        rooms: Arc<RoomRegistry>,
        presence: Arc<PresenceTracker>,
        embedding: EmbeddingClient,
        event_bus: EventBus,
        match_threshold: f64,
        archive: Option<InterestArchive>,
    ) -> Self {
        Self {
            store,
            rooms,
            presence,
            embedding,
            event_bus,
            match_threshold,
            archive,
        }
    }

    /// Returns a reference to the inner [`InterestStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<InterestStore> {
        &self.store
    }

    /// Returns a reference to the inner [`RoomRegistry`].
    #[must_use]
    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    /// Returns a reference to the inner [`PresenceTracker`].
    #[must_use]
    pub fn presence(&self) -> &Arc<PresenceTracker> {
        &self.presence
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Registers a new connection and rebroadcasts presence state.
    pub async fn connect(&self, connection_id: ConnectionId) {
        let count = self.presence.register(connection_id).await;
        tracing::info!(%connection_id, count, "client connected");
        let _ = self
            .event_bus
            .publish(SessionEvent::UserCountChanged { count });
        self.publish_waiting_list().await;
    }

    /// Cleans up after a disconnected connection.
    ///
    /// Removes the connection's waiting record (matched records are
    /// retained), drops its rooms, and rebroadcasts presence state. The
    /// remaining member of a dropped room is not notified; it learns of
    /// the departure when its next relay into the room fails.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let count = self.presence.unregister(connection_id).await;
        tracing::info!(%connection_id, count, "client disconnected");
        let _ = self
            .event_bus
            .publish(SessionEvent::UserCountChanged { count });

        if let Some(removed) = self.store.delete_unmatched_by_connection(connection_id).await {
            self.archive_removed(removed.id).await;
            self.publish_waiting_list().await;
        }

        let dropped = self.rooms.remove_by_connection(connection_id).await;
        for room in dropped {
            tracing::debug!(room_id = %room.room_id, "room closed by disconnect");
        }
    }

    /// Runs the full submission flow: embed, store, scan, claim.
    ///
    /// Returns the stored record, reflecting any match that happened
    /// during the same call.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] for empty text or an unknown
    ///   connection.
    /// - [`GatewayError::EmbeddingTimeout`] / [`GatewayError::EmbeddingService`]
    ///   from the embedding call; no record is created.
    /// - [`GatewayError::Store`] if persistence of the record fails.
    pub async fn submit_interest(
        &self,
        connection_id: ConnectionId,
        text: &str,
    ) -> Result<InterestRecord, GatewayError> {
        if text.trim().is_empty() {
            return Err(GatewayError::Validation(
                "interest text must not be empty".to_string(),
            ));
        }
        let embedding = self.embedding.embed(text).await?;
        self.place_interest(connection_id, text, embedding).await
    }

    /// Stores an already-embedded submission and attempts a match.
    ///
    /// The connection is re-checked after the embedding suspension
    /// point: nothing is written for a connection that is already gone.
    ///
    /// # Errors
    ///
    /// See [`MatchService::submit_interest`].
    pub async fn place_interest(
        &self,
        connection_id: ConnectionId,
        text: &str,
        embedding: Vec<f32>,
    ) -> Result<InterestRecord, GatewayError> {
        if !self.presence.is_connected(connection_id).await {
            return Err(GatewayError::Validation(format!(
                "connection {connection_id} is not connected"
            )));
        }

        let replaced = self.store.find_unmatched_by_connection(connection_id).await;
        let record = self.store.create(connection_id, text, embedding).await?;
        if let Some(old) = replaced {
            self.archive_removed(old.id).await;
        }
        self.archive_created(&record).await;
        tracing::info!(%connection_id, interest_id = %record.id, "interest submitted");
        self.publish_waiting_list().await;

        self.auto_match(&record).await?;

        Ok(self.store.get(record.id).await.unwrap_or(record))
    }

    /// Scans waiting candidates and claims the best one, re-scanning
    /// after a lost race until the submitter is matched or no candidate
    /// meets the threshold.
    async fn auto_match(&self, record: &InterestRecord) -> Result<(), GatewayError> {
        loop {
            let candidates = self.store.list_unmatched(Some(record.connection_id)).await;
            let Some(best) =
                find_best_match(&record.embedding, &candidates, self.match_threshold)
            else {
                return Ok(());
            };

            let room_id = RoomId::generate();
            match self
                .store
                .mark_matched_pair(record.id, best.id, &room_id)
                .await
            {
                Ok(()) => {
                    self.finish_match(room_id, record, best).await;
                    return Ok(());
                }
                Err(GatewayError::AlreadyMatched | GatewayError::InterestNotFound(_)) => {
                    // A concurrent actor claimed one side. If it was our
                    // own record, the submitter is matched and we stop;
                    // otherwise the candidate is gone and we re-scan.
                    match self.store.get(record.id).await {
                        Some(own) if !own.matched => continue,
                        _ => return Ok(()),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Pairs the caller's waiting interest with the target record.
    ///
    /// Drives the same atomic claim as the automatic flow; the caller
    /// becomes the signaling initiator.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InterestNotFound`] for an unknown target id.
    /// - [`GatewayError::AlreadyMatched`] if the target (or the caller's
    ///   own record) was claimed first; no room is created.
    /// - [`GatewayError::Validation`] if the caller targets itself or
    ///   has no waiting interest.
    pub async fn manual_match(
        &self,
        target_id: InterestId,
        caller: ConnectionId,
    ) -> Result<(RoomId, WaitingInterest), GatewayError> {
        let target = self
            .store
            .get(target_id)
            .await
            .ok_or(GatewayError::InterestNotFound(target_id.into()))?;
        if target.matched {
            return Err(GatewayError::AlreadyMatched);
        }
        if target.connection_id == caller {
            return Err(GatewayError::Validation(
                "cannot match an interest with its own connection".to_string(),
            ));
        }
        let caller_record = self
            .store
            .find_unmatched_by_connection(caller)
            .await
            .ok_or_else(|| {
                GatewayError::Validation("caller has no waiting interest".to_string())
            })?;

        let room_id = RoomId::generate();
        self.store
            .mark_matched_pair(caller_record.id, target.id, &room_id)
            .await?;
        self.finish_match(room_id.clone(), &caller_record, &target).await;

        Ok((room_id, WaitingInterest::from(&target)))
    }

    /// Registers the room and notifies both members.
    ///
    /// Membership is registered before either notification is
    /// published, so neither peer can signal into an incomplete room.
    async fn finish_match(
        &self,
        room_id: RoomId,
        initiator: &InterestRecord,
        peer: &InterestRecord,
    ) {
        let room = Room::new(room_id.clone(), initiator.connection_id, peer.connection_id);
        self.rooms.insert(room).await;
        self.archive_matched(initiator.id, peer.id, &room_id).await;
        tracing::info!(
            %room_id,
            initiator = %initiator.connection_id,
            peer = %peer.connection_id,
            "pair matched"
        );

        let _ = self.event_bus.publish(SessionEvent::MatchFound {
            to: initiator.connection_id,
            room_id: room_id.clone(),
            is_initiator: true,
        });
        let _ = self.event_bus.publish(SessionEvent::MatchFound {
            to: peer.connection_id,
            room_id,
            is_initiator: false,
        });
        self.publish_waiting_list().await;
    }

    /// Forwards a signaling payload to the other member of the room.
    ///
    /// The payload is opaque: never inspected, never persisted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RoomUnavailable`] when the room is
    /// unknown, one-sided, or the sender is not a member. Only the
    /// sender learns of the failure.
    pub async fn relay_signal(
        &self,
        sender: ConnectionId,
        room_id: &RoomId,
        kind: SignalKind,
        payload: Value,
    ) -> Result<(), GatewayError> {
        let peer = self
            .rooms
            .peer_of(room_id, sender)
            .await
            .ok_or_else(|| GatewayError::RoomUnavailable(room_id.to_string()))?;
        let _ = self.event_bus.publish(SessionEvent::SignalRelayed {
            to: peer,
            room_id: room_id.clone(),
            kind,
            payload,
        });
        Ok(())
    }

    /// Forwards a chat message to the other member of the room.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RoomUnavailable`] when the room is
    /// unknown, one-sided, or the sender is not a member.
    pub async fn relay_chat(
        &self,
        sender: ConnectionId,
        room_id: &RoomId,
        text: String,
        timestamp: String,
        sender_label: String,
    ) -> Result<(), GatewayError> {
        let peer = self
            .rooms
            .peer_of(room_id, sender)
            .await
            .ok_or_else(|| GatewayError::RoomUnavailable(room_id.to_string()))?;
        let _ = self.event_bus.publish(SessionEvent::ChatRelayed {
            to: peer,
            room_id: room_id.clone(),
            text,
            timestamp,
            sender: sender_label,
        });
        Ok(())
    }

    /// Forwards a manual pairing request to its target connection.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] if the request does not reference
    ///   the requester's own waiting interest, or the target is not
    ///   connected.
    pub async fn request_pairing(
        &self,
        from: ConnectionId,
        target: ConnectionId,
        request_id: InterestId,
    ) -> Result<(), GatewayError> {
        let requester = self.store.get(request_id).await;
        let Some(requester) = requester.filter(|r| r.connection_id == from && !r.matched) else {
            return Err(GatewayError::Validation(
                "request must reference the caller's waiting interest".to_string(),
            ));
        };
        if !self.presence.is_connected(target).await {
            return Err(GatewayError::Validation(
                "target connection is not available".to_string(),
            ));
        }
        let _ = self.event_bus.publish(SessionEvent::PairRequested {
            to: target,
            from,
            request_id,
            interest: requester.text,
        });
        Ok(())
    }

    /// Forwards a denial to the requester of a manual pairing.
    pub async fn deny_pairing(&self, from: ConnectionId, requester: ConnectionId) {
        let _ = self
            .event_bus
            .publish(SessionEvent::PairDenied { to: requester, from });
    }

    /// Broadcasts the current waiting-list snapshot, oldest first.
    async fn publish_waiting_list(&self) {
        let interests = self.store.waiting_list().await;
        let _ = self
            .event_bus
            .publish(SessionEvent::WaitingListChanged { interests });
    }

    async fn archive_created(&self, record: &InterestRecord) {
        if let Some(archive) = &self.archive
            && let Err(e) = archive.record_created(record).await
        {
            tracing::warn!(error = %e, "interest archive insert failed");
        }
    }

    async fn archive_matched(&self, a: InterestId, b: InterestId, room_id: &RoomId) {
        if let Some(archive) = &self.archive
            && let Err(e) = archive.pair_matched(a, b, room_id).await
        {
            tracing::warn!(error = %e, "interest archive update failed");
        }
    }

    async fn archive_removed(&self, id: InterestId) {
        if let Some(archive) = &self.archive
            && let Err(e) = archive.unmatched_removed(id).await
        {
            tracing::warn!(error = %e, "interest archive delete failed");
        }
    }
}
