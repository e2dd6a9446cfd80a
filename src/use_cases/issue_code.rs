use std::time::Duration;

use crate::domain::entities::LinkEntry;
use crate::domain::errors::LinkError;
use crate::domain::ports::{Clock, CodeGenerator, LinkStore};

// Fresh codes drawn before giving up on a crowded code space.
pub const MAX_CODE_ATTEMPTS: usize = 8;

// Response returned by the issue code use case.
#[derive(Debug)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: Option<u64>,
}

// Link code issuance use case with injected dependencies.
pub struct IssueCodeUseCase<C, G, S> {
    pub clock: C,
    pub generator: G,
    pub store: S,
    // None keeps codes outstanding until redeemed.
    pub ttl: Option<Duration>,
}

impl<C, G, S> IssueCodeUseCase<C, G, S>
where
    C: Clock,
    G: CodeGenerator,
    S: LinkStore,
{
    pub async fn execute(&self, player_id: &str) -> Result<IssuedCode, LinkError> {
        if player_id.trim().is_empty() {
            return Err(LinkError::InvalidRequest);
        }

        let issued_at = self.clock.now_epoch_seconds();
        // A lifetime past the end of the clock means the code never lapses.
        let expires_at = self
            .ttl
            .map(|ttl| issued_at.saturating_add(ttl.as_secs()));

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.generator.generate();
            let entry = LinkEntry {
                player_id: player_id.to_string(),
                issued_at,
                expires_at,
            };

            let inserted = self
                .store
                .insert_if_absent(code.clone(), entry)
                .await
                .map_err(|_| LinkError::StorageFailure)?;
            if inserted {
                return Ok(IssuedCode { code, expires_at });
            }

            tracing::warn!("link code collided with an outstanding code");
        }

        Err(LinkError::CodeSpaceExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }
}
