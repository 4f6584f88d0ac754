//! Event router — dispatches parsed client events to their handlers.
//!
//! The router reads the presence and room registries but never mutates
//! them. Persistence always happens before any broadcast, so every
//! frame a client receives describes durable state.

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use banter_core::config::RealtimeConfig;
use banter_core::error::ErrorKind;
use banter_entity::reaction::ReactionRecord;
use banter_entity::user::UserRef;

use crate::connection::handle::ConnectionHandle;
use crate::dispatch::Dispatcher;
use crate::room::types::RoomId;
use crate::store::ChatStore;

use super::mentions::extract_mentions;
use super::types::{InboundEvent, OutboundEvent, ReactionKind};

/// Routes inbound client events to persistence and fan-out.
pub struct EventRouter {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn ChatStore>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter").finish()
    }
}

impl EventRouter {
    /// Creates a new event router.
    pub fn new(config: RealtimeConfig, dispatcher: Arc<Dispatcher>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            dispatcher,
            store,
            config,
        }
    }

    /// Handles one raw frame from a client connection.
    pub async fn handle_frame(&self, handle: &ConnectionHandle, raw: &str) {
        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                debug!(conn_id = %handle.id, error = %e, "Unparseable client frame");
                self.dispatcher.send_to_connection(
                    handle,
                    &OutboundEvent::Error {
                        message: "Invalid event".to_string(),
                    },
                );
                return;
            }
        };

        match event {
            InboundEvent::MessageSend { channel_id, content } => {
                self.handle_message_send(handle, channel_id, content).await;
            }
            InboundEvent::Typing {
                channel_id,
                is_typing,
            } => {
                self.handle_typing(handle, channel_id, is_typing);
            }
            InboundEvent::Reaction {
                message_id,
                emoji,
                kind,
            } => {
                self.handle_reaction(handle, message_id, &emoji, kind).await;
            }
        }
    }

    /// Persists a message, broadcasts it to the channel, and notifies
    /// mentioned users on all their connections.
    async fn handle_message_send(&self, handle: &ConnectionHandle, channel_id: Uuid, content: String) {
        let trimmed = content.trim();
        if trimmed.is_empty() || content.chars().count() > self.config.max_message_length {
            self.dispatcher.send_to_connection(
                handle,
                &OutboundEvent::Error {
                    message: "Invalid message content".to_string(),
                },
            );
            return;
        }

        let mentioned_names = extract_mentions(&content);
        let mentioned_users = if mentioned_names.is_empty() {
            Vec::new()
        } else {
            match self.store.find_users_by_usernames(&mentioned_names).await {
                Ok(users) => users,
                Err(e) => {
                    error!(conn_id = %handle.id, error = %e, "Failed to resolve mentions");
                    self.send_error(handle, "Failed to send message");
                    return;
                }
            }
        };
        let mention_ids: Vec<Uuid> = mentioned_users.iter().map(|u| u.id).collect();

        let record = match self
            .store
            .create_message(handle.user_id, channel_id, &content, &mention_ids)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                error!(conn_id = %handle.id, channel_id = %channel_id, error = %e, "Failed to persist message");
                self.send_error(handle, "Failed to send message");
                return;
            }
        };

        // Sender included: their own frame confirms the durable write.
        let message_id = record.id;
        let sender_username = record.sender.username.clone();
        self.dispatcher.broadcast_to_room(
            &RoomId::Channel(channel_id),
            &OutboundEvent::MessageReceived(record),
        );

        for UserRef { id, .. } in &mentioned_users {
            self.dispatcher.send_to_user(
                id,
                &OutboundEvent::Mentioned {
                    message_id,
                    channel_id,
                    mentioned_by: sender_username.clone(),
                },
            );
        }
    }

    /// Relays a typing indicator to everyone else in the channel.
    fn handle_typing(&self, handle: &ConnectionHandle, channel_id: Uuid, is_typing: bool) {
        self.dispatcher.broadcast_to_room_except(
            &RoomId::Channel(channel_id),
            &handle.id,
            &OutboundEvent::Typing {
                user_id: handle.user_id,
                channel_id,
                is_typing,
            },
        );
    }

    /// Adds or removes a reaction, broadcasting to the message's channel.
    async fn handle_reaction(
        &self,
        handle: &ConnectionHandle,
        message_id: Uuid,
        emoji: &str,
        kind: ReactionKind,
    ) {
        let result = match kind {
            ReactionKind::Add => self.add_reaction(handle, message_id, emoji).await,
            ReactionKind::Remove => self.remove_reaction(handle, message_id, emoji).await,
        };

        if let Err(e) = result {
            error!(conn_id = %handle.id, message_id = %message_id, error = %e, "Failed to handle reaction");
            self.send_error(handle, "Failed to process reaction");
        }
    }

    async fn add_reaction(
        &self,
        handle: &ConnectionHandle,
        message_id: Uuid,
        emoji: &str,
    ) -> banter_core::AppResult<()> {
        let reaction = match self
            .store
            .add_reaction(handle.user_id, message_id, emoji)
            .await
        {
            Ok(reaction) => reaction,
            // A double-add is benign; the first add already broadcast.
            Err(e) if e.kind == ErrorKind::Conflict => {
                debug!(conn_id = %handle.id, message_id = %message_id, "Duplicate reaction ignored");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let Some(channel_id) = self.store.channel_of_message(message_id).await? else {
            warn!(message_id = %message_id, "Reaction on message with no channel");
            return Ok(());
        };

        self.dispatcher.broadcast_to_room(
            &RoomId::Channel(channel_id),
            &OutboundEvent::ReactionAdded {
                message_id,
                reaction: ReactionRecord {
                    id: reaction.id,
                    emoji: reaction.emoji,
                    user: UserRef {
                        id: handle.user_id,
                        username: handle.username.clone(),
                    },
                },
            },
        );
        Ok(())
    }

    async fn remove_reaction(
        &self,
        handle: &ConnectionHandle,
        message_id: Uuid,
        emoji: &str,
    ) -> banter_core::AppResult<()> {
        // Removing a reaction that does not exist is a silent no-op.
        let Some(reaction) = self
            .store
            .find_reaction(handle.user_id, message_id, emoji)
            .await?
        else {
            return Ok(());
        };

        if !self.store.remove_reaction(reaction.id).await? {
            return Ok(());
        }

        let Some(channel_id) = self.store.channel_of_message(message_id).await? else {
            return Ok(());
        };

        self.dispatcher.broadcast_to_room(
            &RoomId::Channel(channel_id),
            &OutboundEvent::ReactionRemoved {
                message_id,
                reaction_id: reaction.id,
            },
        );
        Ok(())
    }

    fn send_error(&self, handle: &ConnectionHandle, message: &str) {
        self.dispatcher.send_to_connection(
            handle,
            &OutboundEvent::Error {
                message: message.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::authenticator::AuthenticatedUser;
    use crate::connection::gateway::ConnectionGateway;
    use crate::presence::registry::PresenceRegistry;
    use crate::room::registry::RoomRegistry;
    use crate::testutil::{MockChatStore, drain_frames};
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    struct Fixture {
        gateway: ConnectionGateway,
        router: EventRouter,
        store: Arc<MockChatStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MockChatStore::new());
        let presence = Arc::new(PresenceRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(presence.clone(), rooms.clone()));
        let gateway = ConnectionGateway::new(
            RealtimeConfig::default(),
            presence,
            rooms,
            dispatcher.clone(),
            store.clone(),
        );
        let router = EventRouter::new(RealtimeConfig::default(), dispatcher, store.clone());
        Fixture {
            gateway,
            router,
            store,
        }
    }

    async fn connect_member(
        fx: &Fixture,
        username: &str,
        channel_id: Uuid,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let user = fx.store.add_user(username);
        fx.store.add_membership(user.id, channel_id);
        let (handle, mut rx) = fx
            .gateway
            .connect(AuthenticatedUser {
                user_id: user.id,
                username: user.username,
                is_guest: false,
            })
            .await;
        // Discard presence frames from earlier connects.
        drain_frames(&mut rx);
        (handle, rx)
    }

    fn events_of(frames: &[Value]) -> Vec<&str> {
        frames
            .iter()
            .map(|f| f["event"].as_str().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn message_is_persisted_then_broadcast_to_channel() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;
        let (_bob, mut bob_rx) = connect_member(&fx, "bob", channel).await;
        drain_frames(&mut alice_rx);

        let frame = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "hello world" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        assert_eq!(fx.store.created_message_count(), 1);

        let bob_frames = drain_frames(&mut bob_rx);
        assert_eq!(events_of(&bob_frames), vec!["message:received"]);
        assert_eq!(bob_frames[0]["data"]["content"], "hello world");
        assert_eq!(bob_frames[0]["data"]["sender"]["username"], "alice");

        // The sender receives their own message too.
        let alice_frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&alice_frames), vec!["message:received"]);
    }

    #[tokio::test]
    async fn non_members_do_not_receive_channel_messages() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, _alice_rx) = connect_member(&fx, "alice", channel).await;
        let (_carol, mut carol_rx) = connect_member(&fx, "carol", Uuid::new_v4()).await;

        let frame = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "members only" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        assert!(drain_frames(&mut carol_rx).is_empty());
    }

    #[tokio::test]
    async fn mentioned_user_is_notified_on_every_connection() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, _alice_rx) = connect_member(&fx, "alice", channel).await;

        let bob = fx.store.add_user("bob");
        fx.store.add_membership(bob.id, channel);
        let authed = AuthenticatedUser {
            user_id: bob.id,
            username: bob.username.clone(),
            is_guest: false,
        };
        let (_b1, mut b1_rx) = fx.gateway.connect(authed.clone()).await;
        let (_b2, mut b2_rx) = fx.gateway.connect(authed).await;
        drain_frames(&mut b1_rx);
        drain_frames(&mut b2_rx);

        let frame = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "ping @bob" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        for rx in [&mut b1_rx, &mut b2_rx] {
            let frames = drain_frames(rx);
            let events = events_of(&frames);
            assert!(events.contains(&"message:received"), "events: {events:?}");
            assert!(events.contains(&"user:mentioned"), "events: {events:?}");
            let mention = frames
                .iter()
                .find(|f| f["event"] == "user:mentioned")
                .unwrap();
            assert_eq!(mention["data"]["mentionedBy"], "alice");
        }
    }

    #[tokio::test]
    async fn mention_of_offline_user_is_dropped_not_queued() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;

        // Bob exists and is a channel member but has no open connection.
        let bob = fx.store.add_user("bob");
        fx.store.add_membership(bob.id, channel);

        let frame = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "wb @bob" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        // The message still persists and reaches the channel.
        assert_eq!(fx.store.created_message_count(), 1);
        assert_eq!(
            events_of(&drain_frames(&mut alice_rx)),
            vec!["message:received"]
        );

        // Bob connects afterwards to an empty buffer; nothing was held
        // back for him while he was offline.
        let (_bob_conn, mut bob_rx) = fx
            .gateway
            .connect(AuthenticatedUser {
                user_id: bob.id,
                username: bob.username.clone(),
                is_guest: false,
            })
            .await;
        assert!(drain_frames(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn unknown_mentions_are_ignored() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;

        let frame = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "hi @nobody" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        let frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&frames), vec!["message:received"]);
        assert!(frames[0]["data"]["mentions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_persistence_sends_error_to_sender_only() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;
        let (_bob, mut bob_rx) = connect_member(&fx, "bob", channel).await;
        drain_frames(&mut alice_rx);
        fx.store.fail_create_message();

        let frame = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "doomed" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        let alice_frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&alice_frames), vec!["error"]);
        assert_eq!(alice_frames[0]["data"]["message"], "Failed to send message");
        assert!(drain_frames(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn empty_and_oversized_messages_are_rejected() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;

        let blank = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "   " }
        })
        .to_string();
        fx.router.handle_frame(&alice, &blank).await;

        let oversized = json!({
            "event": "message:send",
            "data": { "channelId": channel, "content": "x".repeat(4001) }
        })
        .to_string();
        fx.router.handle_frame(&alice, &oversized).await;

        assert_eq!(fx.store.created_message_count(), 0);
        let frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&frames), vec!["error", "error"]);
    }

    #[tokio::test]
    async fn typing_reaches_channel_members_except_sender() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;
        let (_bob, mut bob_rx) = connect_member(&fx, "bob", channel).await;
        drain_frames(&mut alice_rx);

        let frame = json!({
            "event": "user:typing",
            "data": { "channelId": channel, "isTyping": true }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        let bob_frames = drain_frames(&mut bob_rx);
        assert_eq!(events_of(&bob_frames), vec!["user:typing"]);
        assert_eq!(bob_frames[0]["data"]["userId"], alice.user_id.to_string());
        assert_eq!(bob_frames[0]["data"]["isTyping"], true);
        assert!(drain_frames(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn reaction_add_broadcasts_to_message_channel() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        fx.store.seed_message(message_id, channel);

        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;
        let (_bob, mut bob_rx) = connect_member(&fx, "bob", channel).await;
        drain_frames(&mut alice_rx);

        let frame = json!({
            "event": "message:reaction",
            "data": { "messageId": message_id, "emoji": "👍", "type": "add" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        for rx in [&mut alice_rx, &mut bob_rx] {
            let frames = drain_frames(rx);
            assert_eq!(events_of(&frames), vec!["message:reaction:added"]);
            assert_eq!(frames[0]["data"]["reaction"]["emoji"], "👍");
            assert_eq!(frames[0]["data"]["reaction"]["user"]["username"], "alice");
        }
    }

    #[tokio::test]
    async fn duplicate_reaction_add_is_silent() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        fx.store.seed_message(message_id, channel);
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;

        let frame = json!({
            "event": "message:reaction",
            "data": { "messageId": message_id, "emoji": "👍", "type": "add" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;
        drain_frames(&mut alice_rx);

        fx.router.handle_frame(&alice, &frame).await;
        assert!(drain_frames(&mut alice_rx).is_empty());
        assert_eq!(fx.store.reaction_count(), 1);
    }

    #[tokio::test]
    async fn reaction_remove_broadcasts_then_repeat_is_noop() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        fx.store.seed_message(message_id, channel);
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;

        let add = json!({
            "event": "message:reaction",
            "data": { "messageId": message_id, "emoji": "🔥", "type": "add" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &add).await;
        drain_frames(&mut alice_rx);

        let remove = json!({
            "event": "message:reaction",
            "data": { "messageId": message_id, "emoji": "🔥", "type": "remove" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &remove).await;

        let frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&frames), vec!["message:reaction:removed"]);
        assert!(frames[0]["data"]["reactionId"].is_string());

        // Removing again produces nothing, not an error.
        fx.router.handle_frame(&alice, &remove).await;
        assert!(drain_frames(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn reaction_store_failure_reports_error_to_sender() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        fx.store.seed_message(message_id, channel);
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;
        fx.store.fail_reactions();

        let frame = json!({
            "event": "message:reaction",
            "data": { "messageId": message_id, "emoji": "👍", "type": "add" }
        })
        .to_string();
        fx.router.handle_frame(&alice, &frame).await;

        let frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&frames), vec!["error"]);
        assert_eq!(frames[0]["data"]["message"], "Failed to process reaction");
    }

    #[tokio::test]
    async fn malformed_frame_gets_error_reply() {
        let fx = fixture();
        let channel = Uuid::new_v4();
        let (alice, mut alice_rx) = connect_member(&fx, "alice", channel).await;

        fx.router.handle_frame(&alice, "not json at all").await;

        let frames = drain_frames(&mut alice_rx);
        assert_eq!(events_of(&frames), vec!["error"]);
    }
}
