// Outstanding link code record. The code itself is the store key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkEntry {
    pub player_id: String,
    pub issued_at: u64,
    // None means the code never expires.
    pub expires_at: Option<u64>,
}

impl LinkEntry {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

// Transport-neutral view of an inbound chat message.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub message_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub author_is_bot: bool,
    pub content: String,
}

impl ChatMessage {
    pub fn reply_target(&self) -> ReplyTarget {
        ReplyTarget {
            channel_id: self.channel_id.clone(),
            message_id: self.message_id.clone(),
        }
    }
}

// Where a chat reply should be posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyTarget {
    pub channel_id: String,
    pub message_id: String,
}
