use crate::domain::entities::ReplyTarget;
use crate::domain::ports::{ChatReplier, PortError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
    message_reference: MessageReference<'a>,
}

#[derive(Debug, Serialize)]
struct MessageReference<'a> {
    message_id: &'a str,
}

#[derive(Debug, Error)]
pub enum DiscordClientError {
    #[error("discord transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("discord upstream error {status}: {body}")]
    Upstream { status: StatusCode, body: String },
}

// Thin reqwest client for posting bot replies over the Discord REST API.
#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    api_base_url: String,
    bot_token: String,
}

impl DiscordClient {
    pub fn new(api_base_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base_url: api_base_url.into(),
            bot_token: bot_token.into(),
        }
    }

    pub async fn create_reply(
        &self,
        target: &ReplyTarget,
        content: &str,
    ) -> Result<(), DiscordClientError> {
        let url = format!(
            "{}/channels/{}/messages",
            self.api_base_url, target.channel_id
        );
        let res = self
            .http
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&CreateMessageRequest {
                content,
                message_reference: MessageReference {
                    message_id: &target.message_id,
                },
            })
            .send()
            .await
            .map_err(DiscordClientError::Transport)?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(DiscordClientError::Upstream { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl ChatReplier for DiscordClient {
    async fn reply(&self, target: &ReplyTarget, content: &str) -> Result<(), PortError> {
        self.create_reply(target, content).await?;
        Ok(())
    }
}
