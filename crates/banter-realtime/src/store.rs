//! Persistence seam for the real-time engine.
//!
//! The gateway and event router go through [`ChatStore`] for every
//! database interaction, which keeps them testable against an in-memory
//! implementation. [`PostgresChatStore`] is the production implementation
//! backed by the repository layer.

use async_trait::async_trait;
use uuid::Uuid;

use banter_core::AppResult;
use banter_database::PgPool;
use banter_database::repositories::{
    ChannelRepository, MessageRepository, ReactionRepository, UserRepository,
};
use banter_entity::message::MessageRecord;
use banter_entity::reaction::Reaction;
use banter_entity::user::{User, UserRef};

/// Database operations the real-time engine depends on.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Looks up a user by ID.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Updates a user's last-seen timestamp.
    async fn touch_last_seen(&self, id: Uuid) -> AppResult<()>;

    /// Returns the IDs of all channels the user is a member of.
    async fn member_channel_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Persists a message with its mention links and returns the full
    /// broadcast record.
    async fn create_message(
        &self,
        sender_id: Uuid,
        channel_id: Uuid,
        content: &str,
        mention_ids: &[Uuid],
    ) -> AppResult<MessageRecord>;

    /// Resolves usernames to user projections. Unknown names are
    /// silently dropped from the result.
    async fn find_users_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<UserRef>>;

    /// Persists a reaction. A duplicate (user, message, emoji) triple
    /// fails with `ErrorKind::Conflict`.
    async fn add_reaction(&self, user_id: Uuid, message_id: Uuid, emoji: &str)
    -> AppResult<Reaction>;

    /// Finds a reaction by its identifying triple.
    async fn find_reaction(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Option<Reaction>>;

    /// Deletes a reaction by ID. Returns `true` if a row was removed.
    async fn remove_reaction(&self, id: Uuid) -> AppResult<bool>;

    /// Returns the channel a message belongs to, if the message exists.
    async fn channel_of_message(&self, message_id: Uuid) -> AppResult<Option<Uuid>>;
}

/// Production [`ChatStore`] backed by the Postgres repositories.
pub struct PostgresChatStore {
    users: UserRepository,
    channels: ChannelRepository,
    messages: MessageRepository,
    reactions: ReactionRepository,
}

impl PostgresChatStore {
    /// Creates a store over a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            channels: ChannelRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            reactions: ReactionRepository::new(pool),
        }
    }
}

#[async_trait]
impl ChatStore for PostgresChatStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn touch_last_seen(&self, id: Uuid) -> AppResult<()> {
        self.users.touch_last_seen(id).await
    }

    async fn member_channel_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.channels.member_channel_ids(user_id).await
    }

    async fn create_message(
        &self,
        sender_id: Uuid,
        channel_id: Uuid,
        content: &str,
        mention_ids: &[Uuid],
    ) -> AppResult<MessageRecord> {
        self.messages
            .create(sender_id, channel_id, content, mention_ids)
            .await
    }

    async fn find_users_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<UserRef>> {
        self.users.find_refs_by_usernames(usernames).await
    }

    async fn add_reaction(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Reaction> {
        self.reactions.create(user_id, message_id, emoji).await
    }

    async fn find_reaction(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        emoji: &str,
    ) -> AppResult<Option<Reaction>> {
        self.reactions.find(user_id, message_id, emoji).await
    }

    async fn remove_reaction(&self, id: Uuid) -> AppResult<bool> {
        self.reactions.delete(id).await
    }

    async fn channel_of_message(&self, message_id: Uuid) -> AppResult<Option<Uuid>> {
        self.messages.channel_of(message_id).await
    }
}
