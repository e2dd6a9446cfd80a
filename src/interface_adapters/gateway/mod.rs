// Chat gateway adapter: turns inbound chat messages into redemption attempts.

pub mod protocol;
pub mod session;

use crate::domain::entities::ChatMessage;
use crate::domain::ports::{ChatReplier, IdentityLinker};
use crate::interface_adapters::state::{InMemoryLinkStore, LinkTable, SystemClock};
use crate::use_cases::chat_command::LinkAccountCommandUseCase;
use crate::use_cases::redeem_code::RedeemCodeUseCase;
use std::sync::Arc;

pub use session::{GatewayError, GatewaySettings, run_gateway, run_session};

// State shared by every chat message task.
#[derive(Clone)]
pub struct BotState {
    // Same table the HTTP issuer writes into.
    pub link_codes: LinkTable,
    pub linker: Arc<dyn IdentityLinker>,
    pub replier: Arc<dyn ChatReplier>,
}

#[tracing::instrument(
    name = "link_account_command",
    skip_all,
    fields(chat_user_id = %message.author_id, message_id = %message.message_id)
)]
pub async fn handle_message(state: &BotState, message: ChatMessage) {
    let use_case = LinkAccountCommandUseCase {
        redeem: RedeemCodeUseCase {
            clock: SystemClock,
            linker: state.linker.clone(),
            store: InMemoryLinkStore {
                entries: state.link_codes.clone(),
            },
        },
    };

    let Some(reply) = use_case.execute(&message).await else {
        return;
    };

    if let Err(err) = state.replier.reply(&message.reply_target(), &reply).await {
        tracing::error!(error = %err, "failed to post chat reply");
    }
}
