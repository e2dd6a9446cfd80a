use crate::domain::errors::LinkError;
use crate::domain::ports::{Clock, LinkStore};

// Removes link codes whose lifetime has elapsed.
pub struct SweepExpiredCodesUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> SweepExpiredCodesUseCase<C, S>
where
    C: Clock,
    S: LinkStore,
{
    pub async fn execute(&self) -> Result<usize, LinkError> {
        self.store
            .purge_expired(self.clock.now_epoch_seconds())
            .await
            .map_err(|_| LinkError::StorageFailure)
    }
}
