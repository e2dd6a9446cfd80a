// Use cases layer: link-code issuance, redemption and housekeeping.

pub mod chat_command;
pub mod issue_code;
pub mod redeem_code;
pub mod sweep_expired;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat_command::LinkAccountCommandUseCase;
pub use issue_code::{IssueCodeUseCase, IssuedCode};
pub use redeem_code::{RedeemCodeUseCase, RedeemedLink};
pub use sweep_expired::SweepExpiredCodesUseCase;
