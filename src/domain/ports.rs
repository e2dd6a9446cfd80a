use async_trait::async_trait;

use crate::domain::entities::{LinkEntry, ReplyTarget};

pub type PortError = Box<dyn std::error::Error + Send + Sync>;

// Port for outstanding link codes shared by issuance and redemption.
#[async_trait]
pub trait LinkStore: Send + Sync {
    // Inserts unconditionally, replacing any entry under the same code.
    async fn put(&self, code: String, entry: LinkEntry) -> Result<(), String>;
    // Inserts only when the code is not outstanding; returns whether it was stored.
    async fn insert_if_absent(&self, code: String, entry: LinkEntry) -> Result<bool, String>;
    // Looks up and removes in one atomic step.
    async fn take(&self, code: &str) -> Result<Option<LinkEntry>, String>;
    async fn purge_expired(&self, now: u64) -> Result<usize, String>;
}

// Port for the external identity service that binds a chat user to a player.
#[async_trait]
pub trait IdentityLinker: Send + Sync {
    async fn link_chat_identity(&self, chat_user_id: &str, player_id: &str)
    -> Result<(), PortError>;
}

// Port for posting replies back into the chat channel.
#[async_trait]
pub trait ChatReplier: Send + Sync {
    async fn reply(&self, target: &ReplyTarget, content: &str) -> Result<(), PortError>;
}

// Port for minting candidate link codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

#[async_trait]
impl<T: IdentityLinker + ?Sized> IdentityLinker for std::sync::Arc<T> {
    async fn link_chat_identity(
        &self,
        chat_user_id: &str,
        player_id: &str,
    ) -> Result<(), PortError> {
        (**self).link_chat_identity(chat_user_id, player_id).await
    }
}
