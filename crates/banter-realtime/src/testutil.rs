//! Shared test fixtures: an in-memory [`ChatStore`] and frame-capturing
//! connection helpers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use banter_core::{AppError, AppResult};
use banter_entity::message::MessageRecord;
use banter_entity::reaction::Reaction;
use banter_entity::user::{User, UserRef};

use crate::store::ChatStore;

#[derive(Default)]
struct MockState {
    users: HashMap<Uuid, User>,
    memberships: HashMap<Uuid, Vec<Uuid>>,
    reactions: Vec<Reaction>,
    message_channels: HashMap<Uuid, Uuid>,
    touched_last_seen: Vec<Uuid>,
    created_messages: Vec<MessageRecord>,
    fail_create_message: bool,
    fail_reactions: bool,
    fail_touch_last_seen: bool,
}

/// In-memory chat store for gateway and router tests.
#[derive(Default)]
pub(crate) struct MockChatStore {
    state: Mutex<MockState>,
}

impl MockChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and returns it.
    pub fn add_user(&self, username: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: None,
            is_guest: false,
            last_seen: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user
    }

    /// Makes a user a member of a channel.
    pub fn add_membership(&self, user_id: Uuid, channel_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .memberships
            .entry(user_id)
            .or_default()
            .push(channel_id);
    }

    /// Seeds a persisted message so reactions can resolve its channel.
    pub fn seed_message(&self, message_id: Uuid, channel_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .message_channels
            .insert(message_id, channel_id);
    }

    pub fn fail_create_message(&self) {
        self.state.lock().unwrap().fail_create_message = true;
    }

    pub fn fail_reactions(&self) {
        self.state.lock().unwrap().fail_reactions = true;
    }

    pub fn fail_touch_last_seen(&self) {
        self.state.lock().unwrap().fail_touch_last_seen = true;
    }

    pub fn touched_last_seen(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().touched_last_seen.clone()
    }

    pub fn created_message_count(&self) -> usize {
        self.state.lock().unwrap().created_messages.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.state.lock().unwrap().reactions.len()
    }
}

#[async_trait]
impl ChatStore for MockChatStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn touch_last_seen(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_touch_last_seen {
            return Err(AppError::database("last seen update failed"));
        }
        state.touched_last_seen.push(id);
        Ok(())
    }

    async fn member_channel_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .memberships
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_message(
        &self,
        sender_id: Uuid,
        channel_id: Uuid,
        content: &str,
        mention_ids: &[Uuid],
    ) -> AppResult<MessageRecord> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_message {
            return Err(AppError::database("message insert failed"));
        }

        let sender = state
            .users
            .get(&sender_id)
            .map(|u| UserRef {
                id: u.id,
                username: u.username.clone(),
            })
            .ok_or_else(|| AppError::database("unknown sender"))?;
        let mentions = mention_ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(|u| UserRef {
                id: u.id,
                username: u.username.clone(),
            })
            .collect();

        let record = MessageRecord {
            id: Uuid::new_v4(),
            content: content.to_string(),
            channel_id,
            created_at: Utc::now(),
            sender,
            mentions,
        };
        state.message_channels.insert(record.id, channel_id);
        state.created_messages.push(record.clone());
        Ok(record)
    }

    async fn find_users_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<UserRef>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .filter(|u| usernames.iter().any(|n| n == &u.username))
            .map(|u| UserRef {
                id: u.id,
                username: u.username.clone(),
            })
            .collect())
    }

    async fn add_reaction(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Reaction> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reactions {
            return Err(AppError::database("reaction insert failed"));
        }
        let duplicate = state
            .reactions
            .iter()
            .any(|r| r.user_id == user_id && r.message_id == message_id && r.emoji == emoji);
        if duplicate {
            return Err(AppError::conflict("Reaction already exists"));
        }

        let reaction = Reaction {
            id: Uuid::new_v4(),
            emoji: emoji.to_string(),
            user_id,
            message_id,
            created_at: Utc::now(),
        };
        state.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn find_reaction(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Option<Reaction>> {
        let state = self.state.lock().unwrap();
        if state.fail_reactions {
            return Err(AppError::database("reaction lookup failed"));
        }
        Ok(state
            .reactions
            .iter()
            .find(|r| r.user_id == user_id && r.message_id == message_id && r.emoji == emoji)
            .cloned())
    }

    async fn remove_reaction(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.reactions.len();
        state.reactions.retain(|r| r.id != id);
        Ok(state.reactions.len() < before)
    }

    async fn channel_of_message(&self, message_id: Uuid) -> AppResult<Option<Uuid>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .message_channels
            .get(&message_id)
            .copied())
    }
}

/// Drains every frame currently buffered on a connection's receiver and
/// parses them as JSON.
pub(crate) fn drain_frames(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).expect("frame should be valid JSON"));
    }
    frames
}

/// Returns the event names of every buffered frame.
pub(crate) fn drain_event_names(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    drain_frames(rx)
        .into_iter()
        .map(|f| f["event"].as_str().unwrap_or_default().to_string())
        .collect()
}
