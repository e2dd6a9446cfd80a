use crate::interface_adapters::gateway::protocol::{
    GatewayEvent, Hello, MessageCreate, Ready, close_code, heartbeat_frame, identify_frame,
    opcode,
};
use crate::interface_adapters::gateway::{BotState, handle_message};

use futures_util::{Sink, SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct GatewaySettings {
    pub url: String,
    pub bot_token: String,
    pub reconnect_delay: Duration,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway connect failed: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("gateway socket error: {0}")]
    Socket(#[source] tungstenite::Error),
    #[error("gateway payload error: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("gateway closed the connection (code {code:?}): {reason}")]
    Closed { code: Option<u16>, reason: String },
    #[error("gateway requested a reconnect")]
    ReconnectRequested,
    #[error("gateway invalidated the session")]
    InvalidSession,
    #[error("gateway stopped acknowledging heartbeats")]
    HeartbeatTimeout,
}

impl GatewayError {
    // True when reconnecting with the same token and intents is bound to fail.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed { code: Some(code), .. } if close_code::is_fatal(*code))
    }
}

// Keeps a gateway session alive until the gateway rejects the bot outright.
pub async fn run_gateway(settings: GatewaySettings, state: BotState) {
    loop {
        match run_session(&settings, &state).await {
            Err(err) if err.is_fatal() => {
                error!(error = %err, "gateway rejected the bot; chat linking is disabled");
                return;
            }
            Err(err) => warn!(error = %err, "gateway session ended"),
            Ok(()) => {}
        }
        tokio::time::sleep(settings.reconnect_delay).await;
        info!("reconnecting to gateway");
    }
}

pub async fn run_session(settings: &GatewaySettings, state: &BotState) -> Result<(), GatewayError> {
    let (ws, _) = tokio_tungstenite::connect_async(settings.url.as_str())
        .await
        .map_err(GatewayError::Connect)?;
    let (mut sink, mut stream) = ws.split();
    debug!(url = %settings.url, "gateway connected");

    // The first frame must be Hello; it carries the heartbeat cadence.
    let hello = loop {
        let event = next_event(stream.next().await)?;
        let Some(event) = event else { continue };
        if event.op == opcode::HELLO {
            break serde_json::from_value::<Hello>(event.d).map_err(GatewayError::Payload)?;
        }
    };

    send_text(
        &mut sink,
        identify_frame(&settings.bot_token).map_err(GatewayError::Payload)?,
    )
    .await?;

    let period = Duration::from_millis(hello.heartbeat_interval.max(1));
    let jitter = period.mul_f64(rand::random::<f64>());
    let mut heartbeat = tokio::time::interval_at(Instant::now() + jitter, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_sequence: Option<u64> = None;
    let mut awaiting_ack = false;

    loop {
        tokio::select! {
            // Frames already received (an ACK in particular) win over a due heartbeat.
            biased;

            frame = stream.next() => {
                let event = match next_event(frame) {
                    Ok(Some(event)) => event,
                    Ok(None) => continue,
                    Err(GatewayError::Payload(err)) => {
                        warn!(error = %err, "skipping undecodable gateway frame");
                        continue;
                    }
                    Err(err) => return Err(err),
                };

                if let Some(sequence) = event.s {
                    last_sequence = Some(sequence);
                }

                match event.op {
                    opcode::DISPATCH => handle_dispatch(event, state),
                    opcode::HEARTBEAT => {
                        send_text(&mut sink, heartbeat_frame(last_sequence).map_err(GatewayError::Payload)?).await?;
                    }
                    opcode::HEARTBEAT_ACK => awaiting_ack = false,
                    opcode::RECONNECT => return Err(GatewayError::ReconnectRequested),
                    opcode::INVALID_SESSION => return Err(GatewayError::InvalidSession),
                    other => debug!(op = other, "ignoring gateway opcode"),
                }
            }
            _ = heartbeat.tick() => {
                if awaiting_ack {
                    return Err(GatewayError::HeartbeatTimeout);
                }
                send_text(&mut sink, heartbeat_frame(last_sequence).map_err(GatewayError::Payload)?).await?;
                awaiting_ack = true;
            }
        }
    }
}

// Ok(None) for frames that carry no gateway event (ping, pong, binary).
fn next_event(
    frame: Option<Result<Message, tungstenite::Error>>,
) -> Result<Option<GatewayEvent>, GatewayError> {
    match frame {
        Some(Ok(Message::Text(text))) => serde_json::from_str(text.as_str())
            .map(Some)
            .map_err(GatewayError::Payload),
        Some(Ok(Message::Close(Some(frame)))) => Err(GatewayError::Closed {
            code: Some(u16::from(frame.code)),
            reason: frame.reason.as_str().to_string(),
        }),
        Some(Ok(Message::Close(None))) => Err(GatewayError::Closed {
            code: None,
            reason: "no close frame".to_string(),
        }),
        Some(Ok(_)) => Ok(None),
        Some(Err(err)) => Err(GatewayError::Socket(err)),
        None => Err(GatewayError::Closed {
            code: None,
            reason: "stream ended".to_string(),
        }),
    }
}

fn handle_dispatch(event: GatewayEvent, state: &BotState) {
    match event.t.as_deref() {
        Some("READY") => match serde_json::from_value::<Ready>(event.d) {
            Ok(ready) => info!(bot = %ready.user.username, "bot is online"),
            Err(err) => warn!(error = %err, "undecodable READY payload"),
        },
        Some("MESSAGE_CREATE") => match serde_json::from_value::<MessageCreate>(event.d) {
            Ok(message) => {
                // Each message gets its own task so a slow link call never
                // stalls heartbeats or other messages.
                let state = state.clone();
                tokio::spawn(async move {
                    handle_message(&state, message.into()).await;
                });
            }
            Err(err) => warn!(error = %err, "undecodable MESSAGE_CREATE payload"),
        },
        _ => {}
    }
}

async fn send_text<S>(sink: &mut S, text: String) -> Result<(), GatewayError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    sink.send(Message::Text(text.into()))
        .await
        .map_err(GatewayError::Socket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::protocol::{CloseFrame, frame::coding::CloseCode};

    #[test]
    fn when_text_frame_is_valid_json_then_event_is_returned() {
        let frame = Some(Ok(Message::Text(r#"{"op":11}"#.into())));

        let event = next_event(frame).expect("expected frame to decode");

        assert_eq!(event.map(|event| event.op), Some(opcode::HEARTBEAT_ACK));
    }

    #[test]
    fn when_ping_frame_arrives_then_no_event_is_returned() {
        let frame = Some(Ok(Message::Ping(Default::default())));

        assert!(matches!(next_event(frame), Ok(None)));
    }

    #[test]
    fn when_text_frame_is_garbage_then_payload_error_is_returned() {
        let frame = Some(Ok(Message::Text("not json".into())));

        assert!(matches!(next_event(frame), Err(GatewayError::Payload(_))));
    }

    fn close(code: u16, reason: &str) -> Option<Result<Message, tungstenite::Error>> {
        Some(Ok(Message::Close(Some(CloseFrame {
            code: CloseCode::from(code),
            reason: reason.into(),
        }))))
    }

    #[test]
    fn when_gateway_closes_with_authentication_failed_then_error_is_fatal() {
        let err = next_event(close(4004, "Authentication failed.")).expect_err("expected close");

        assert!(matches!(
            err,
            GatewayError::Closed {
                code: Some(4004),
                ..
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn when_gateway_closes_with_disallowed_intents_then_error_is_fatal() {
        let err = next_event(close(4014, "Disallowed intent(s).")).expect_err("expected close");

        assert!(err.is_fatal());
    }

    #[test]
    fn when_gateway_closes_with_session_timeout_then_error_is_retried() {
        let err = next_event(close(4009, "Session timed out.")).expect_err("expected close");

        assert!(!err.is_fatal());
        assert!(!GatewayError::HeartbeatTimeout.is_fatal());
    }

    #[test]
    fn when_stream_ends_then_session_is_closed() {
        assert!(matches!(next_event(None), Err(GatewayError::Closed { .. })));
    }
}
