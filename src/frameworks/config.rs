use crate::interface_adapters::gateway::GatewaySettings;
use std::{
    env,
    net::{IpAddr, SocketAddr},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

// Runtime configuration, validated once at startup.

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_PLAYFAB_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DISCORD_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
pub const DEFAULT_DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;
pub const DEFAULT_CODE_TTL_SECONDS: u64 = 600;
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct PlayFabSettings {
    pub base_url: String,
    pub secret_key: String,
    pub force_link: bool,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub playfab: PlayFabSettings,
    pub gateway: GatewaySettings,
    pub discord_api_base_url: String,
    // None keeps codes until redeemed.
    pub code_ttl: Option<Duration>,
    pub sweep_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset.
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let title_id = read("PLAYFAB_TITLE_ID");
        let secret_key = read("PLAYFAB_SECRET_KEY");
        let bot_token = read("DISCORD_BOT_TOKEN");

        let missing: Vec<&'static str> = [
            ("PLAYFAB_TITLE_ID", title_id.is_none()),
            ("PLAYFAB_SECRET_KEY", secret_key.is_none()),
            ("DISCORD_BOT_TOKEN", bot_token.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, is_missing)| is_missing.then_some(key))
        .collect();

        let (Some(title_id), Some(secret_key), Some(bot_token)) = (title_id, secret_key, bot_token)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let host: IpAddr = parse_or("LINK_SERVER_HOST", read("LINK_SERVER_HOST"), || {
            IpAddr::from([0, 0, 0, 0])
        })?;
        let port: u16 = parse_or("LINK_SERVER_PORT", read("LINK_SERVER_PORT"), || {
            DEFAULT_HTTP_PORT
        })?;

        let playfab_base_url = read("PLAYFAB_API_BASE_URL")
            .unwrap_or_else(|| format!("https://{title_id}.playfabapi.com"));
        let playfab_timeout_ms: u64 = parse_or("PLAYFAB_TIMEOUT_MS", read("PLAYFAB_TIMEOUT_MS"), || {
            DEFAULT_PLAYFAB_TIMEOUT_MS
        })?;
        let force_link: bool =
            parse_or("PLAYFAB_FORCE_LINK", read("PLAYFAB_FORCE_LINK"), || true)?;

        let reconnect_delay_ms: u64 = parse_or(
            "DISCORD_RECONNECT_DELAY_MS",
            read("DISCORD_RECONNECT_DELAY_MS"),
            || DEFAULT_RECONNECT_DELAY_MS,
        )?;

        let ttl_seconds: u64 = parse_or("LINK_CODE_TTL_SECONDS", read("LINK_CODE_TTL_SECONDS"), || {
            DEFAULT_CODE_TTL_SECONDS
        })?;
        let sweep_seconds_raw = read("LINK_CODE_SWEEP_INTERVAL_SECONDS");
        let sweep_seconds: u64 = parse_or(
            "LINK_CODE_SWEEP_INTERVAL_SECONDS",
            sweep_seconds_raw.clone(),
            || DEFAULT_SWEEP_INTERVAL_SECONDS,
        )?;
        if sweep_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "LINK_CODE_SWEEP_INTERVAL_SECONDS",
                value: sweep_seconds_raw.unwrap_or_default(),
            });
        }

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            playfab: PlayFabSettings {
                base_url: playfab_base_url.trim_end_matches('/').to_string(),
                secret_key,
                force_link,
                timeout: Duration::from_millis(playfab_timeout_ms),
            },
            gateway: GatewaySettings {
                url: read("DISCORD_GATEWAY_URL")
                    .unwrap_or_else(|| DEFAULT_DISCORD_GATEWAY_URL.to_string()),
                bot_token,
                reconnect_delay: Duration::from_millis(reconnect_delay_ms),
            },
            discord_api_base_url: read("DISCORD_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            code_ttl: (ttl_seconds > 0).then(|| Duration::from_secs(ttl_seconds)),
            sweep_interval: Duration::from_secs(sweep_seconds),
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default()),
    }
}
