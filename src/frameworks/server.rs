// Framework bootstrap for the link service runtime.

use crate::frameworks::config::AppConfig;
use crate::interface_adapters::clients::discord::DiscordClient;
use crate::interface_adapters::clients::playfab::PlayFabClient;
use crate::interface_adapters::gateway::{BotState, run_gateway};
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, InMemoryLinkStore, SystemClock};
use crate::use_cases::sweep_expired::SweepExpiredCodesUseCase;

use std::{io::Result, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serves the issuance API on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::other(e)
    })?;

    let state = AppState::new(config.code_ttl);
    spawn_chat_bot(&config, &state)?;
    if config.code_ttl.is_some() {
        spawn_expiry_sweeper(state.link_store(), config.sweep_interval);
    }

    let address = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, state).await
}

fn spawn_chat_bot(config: &AppConfig, state: &AppState) -> Result<JoinHandle<()>> {
    let playfab = PlayFabClient::new(
        config.playfab.base_url.clone(),
        config.playfab.secret_key.clone(),
        config.playfab.force_link,
        config.playfab.timeout,
    )
    .map_err(|e| std::io::Error::other(format!("failed to initialize playfab client: {e}")))?;
    tracing::debug!(
        playfab_base_url = %config.playfab.base_url,
        playfab_timeout_ms = config.playfab.timeout.as_millis(),
        force_link = config.playfab.force_link,
        "playfab client configured"
    );

    let bot = BotState {
        link_codes: state.link_codes.clone(),
        linker: Arc::new(playfab),
        replier: Arc::new(DiscordClient::new(
            config.discord_api_base_url.clone(),
            config.gateway.bot_token.clone(),
        )),
    };

    Ok(tokio::spawn(run_gateway(config.gateway.clone(), bot)))
}

// Periodically drops link codes whose lifetime has elapsed.
pub fn spawn_expiry_sweeper(store: InMemoryLinkStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let use_case = SweepExpiredCodesUseCase {
                clock: SystemClock,
                store: store.clone(),
            };
            match use_case.execute().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "purged expired link codes"),
                Err(e) => tracing::warn!(error = %e, "link code sweep failed"),
            }
        }
    })
}
