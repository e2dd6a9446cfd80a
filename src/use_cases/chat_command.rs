use crate::domain::entities::ChatMessage;
use crate::domain::errors::LinkError;
use crate::domain::ports::{Clock, IdentityLinker, LinkStore};
use crate::use_cases::redeem_code::RedeemCodeUseCase;

pub const LINK_COMMAND: &str = "?linkaccount";

pub const REPLY_MISSING_CODE: &str = "❌ Please provide a code: `?linkaccount <code>`";
pub const REPLY_UNKNOWN_CODE: &str = "❌ Invalid or expired code.";
pub const REPLY_LINKED: &str = "✅ Successfully linked your account!";
pub const REPLY_LINK_FAILED: &str = "❌ Failed to link your account.";

// Parsed form of a recognized chat command.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    LinkAccount { code: Option<&'a str> },
}

// Returns None when the message is not a command at all.
pub fn parse_command(content: &str) -> Option<ChatCommand<'_>> {
    let mut tokens = content.split_whitespace();
    if tokens.next()? != LINK_COMMAND {
        return None;
    }

    Some(ChatCommand::LinkAccount {
        code: tokens.next(),
    })
}

// Chat-facing redemption flow: filters, parses and turns outcomes into replies.
pub struct LinkAccountCommandUseCase<C, L, S> {
    pub redeem: RedeemCodeUseCase<C, L, S>,
}

impl<C, L, S> LinkAccountCommandUseCase<C, L, S>
where
    C: Clock,
    L: IdentityLinker,
    S: LinkStore,
{
    // Returns the reply to post, or None when the message should be ignored.
    pub async fn execute(&self, message: &ChatMessage) -> Option<String> {
        if message.author_is_bot {
            return None;
        }

        let ChatCommand::LinkAccount { code } = parse_command(&message.content)?;

        let outcome = match code {
            Some(code) => self
                .redeem
                .execute(&message.author_id, code)
                .await
                .map(|_| ()),
            None => Err(LinkError::MissingCodeArgument),
        };

        Some(reply_for(outcome).to_string())
    }
}

fn reply_for(outcome: Result<(), LinkError>) -> &'static str {
    match outcome {
        Ok(()) => REPLY_LINKED,
        Err(LinkError::MissingCodeArgument) => REPLY_MISSING_CODE,
        Err(LinkError::UnknownCode) => REPLY_UNKNOWN_CODE,
        Err(LinkError::DownstreamLinkFailure)
        | Err(LinkError::StorageFailure)
        | Err(LinkError::InvalidRequest)
        | Err(LinkError::CodeSpaceExhausted { .. }) => REPLY_LINK_FAILED,
    }
}
