use crate::domain::errors::LinkError;
use crate::domain::ports::{Clock, IdentityLinker, LinkStore};

// Response returned by the redeem code use case.
#[derive(Debug)]
pub struct RedeemedLink {
    pub player_id: String,
}

// Link code redemption use case with injected dependencies.
pub struct RedeemCodeUseCase<C, L, S> {
    pub clock: C,
    pub linker: L,
    pub store: S,
}

impl<C, L, S> RedeemCodeUseCase<C, L, S>
where
    C: Clock,
    L: IdentityLinker,
    S: LinkStore,
{
    pub async fn execute(&self, chat_user_id: &str, code: &str) -> Result<RedeemedLink, LinkError> {
        // The code is consumed here, before the downstream call, and never restored.
        let entry = self
            .store
            .take(code)
            .await
            .map_err(|_| LinkError::StorageFailure)?
            .ok_or(LinkError::UnknownCode)?;

        if entry.is_expired(self.clock.now_epoch_seconds()) {
            tracing::debug!(%code, "expired link code presented");
            return Err(LinkError::UnknownCode);
        }

        if let Err(err) = self
            .linker
            .link_chat_identity(chat_user_id, &entry.player_id)
            .await
        {
            tracing::error!(
                error = %err,
                %chat_user_id,
                player_id = %entry.player_id,
                "failed to link chat identity"
            );
            return Err(LinkError::DownstreamLinkFailure);
        }

        tracing::info!(%chat_user_id, player_id = %entry.player_id, "linked chat identity");

        Ok(RedeemedLink {
            player_id: entry.player_id,
        })
    }
}
