// Discord gateway wire payloads (API v10, JSON encoding).

use crate::domain::entities::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

// Close codes after which identifying again cannot succeed.
pub mod close_code {
    pub const AUTHENTICATION_FAILED: u16 = 4004;
    pub const INVALID_SHARD: u16 = 4010;
    pub const SHARDING_REQUIRED: u16 = 4011;
    pub const INVALID_API_VERSION: u16 = 4012;
    pub const INVALID_INTENTS: u16 = 4013;
    pub const DISALLOWED_INTENTS: u16 = 4014;

    pub fn is_fatal(code: u16) -> bool {
        matches!(
            code,
            AUTHENTICATION_FAILED
                | INVALID_SHARD
                | SHARDING_REQUIRED
                | INVALID_API_VERSION
                | INVALID_INTENTS
                | DISALLOWED_INTENTS
        )
    }
}

pub const INTENT_GUILDS: u64 = 1 << 0;
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;
pub const INTENTS: u64 = INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT;

/// Any frame received from the gateway.
#[derive(Debug, Deserialize)]
pub struct GatewayEvent {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

/// Any frame sent to the gateway.
#[derive(Debug, Serialize)]
pub struct GatewayCommand<T> {
    pub op: u8,
    pub d: T,
}

#[derive(Debug, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Serialize)]
pub struct Identify<'a> {
    pub token: &'a str,
    pub intents: u64,
    pub properties: ConnectionProperties,
}

#[derive(Debug, Serialize)]
pub struct ConnectionProperties {
    pub os: &'static str,
    pub browser: &'static str,
    pub device: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Deserialize)]
pub struct Ready {
    pub user: User,
}

/// `MESSAGE_CREATE` dispatch body, trimmed to the fields the bot reads.
#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
    pub author: User,
}

impl From<MessageCreate> for ChatMessage {
    fn from(message: MessageCreate) -> Self {
        Self {
            message_id: message.id,
            channel_id: message.channel_id,
            author_id: message.author.id,
            author_is_bot: message.author.bot,
            content: message.content,
        }
    }
}

pub fn identify_frame(token: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&GatewayCommand {
        op: opcode::IDENTIFY,
        d: Identify {
            token,
            intents: INTENTS,
            properties: ConnectionProperties {
                os: std::env::consts::OS,
                browser: env!("CARGO_PKG_NAME"),
                device: env!("CARGO_PKG_NAME"),
            },
        },
    })
}

pub fn heartbeat_frame(last_sequence: Option<u64>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&GatewayCommand {
        op: opcode::HEARTBEAT,
        d: last_sequence,
    })
}
