use crate::domain::ports::{IdentityLinker, PortError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const SECRET_KEY_HEADER: &str = "X-SecretKey";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LinkCustomIdRequest<'a> {
    custom_id: &'a str,
    force_link: bool,
}

// PlayFab error envelope; only the message is kept for logs.
#[derive(Debug, Deserialize)]
struct PlayFabErrorResponse {
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Error)]
pub enum PlayFabClientError {
    #[error("playfab transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("playfab upstream error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Upstream {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("playfab response decode error: {0}")]
    Decode(#[source] reqwest::Error),
}

// Thin reqwest client for the PlayFab custom ID link call.
#[derive(Clone)]
pub struct PlayFabClient {
    http: Client,
    base_url: String,
    secret_key: String,
    force_link: bool,
}

impl PlayFabClient {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        force_link: bool,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            force_link,
        })
    }

    pub async fn link_custom_id(&self, custom_id: &str) -> Result<(), PlayFabClientError> {
        let url = format!("{}/Client/LinkCustomID", self.base_url);
        let res = self
            .http
            .post(url)
            .header(SECRET_KEY_HEADER, &self.secret_key)
            .json(&LinkCustomIdRequest {
                custom_id,
                force_link: self.force_link,
            })
            .send()
            .await
            .map_err(PlayFabClientError::Transport)?;
        let status = res.status();

        if !status.is_success() {
            let message = res
                .json::<PlayFabErrorResponse>()
                .await
                .ok()
                .and_then(|payload| payload.error_message);
            return Err(PlayFabClientError::Upstream { status, message });
        }

        // A link only counts once PlayFab returned a readable body.
        res.json::<serde_json::Value>()
            .await
            .map(|_| ())
            .map_err(PlayFabClientError::Decode)
    }
}

#[async_trait]
impl IdentityLinker for PlayFabClient {
    async fn link_chat_identity(
        &self,
        chat_user_id: &str,
        player_id: &str,
    ) -> Result<(), PortError> {
        // The link targets the player behind the title's client session; the
        // player id only travels in logs.
        tracing::debug!(%chat_user_id, %player_id, "calling playfab LinkCustomID");
        self.link_custom_id(chat_user_id).await?;
        Ok(())
    }
}
