use thiserror::Error;

// Domain-level errors for the link-code protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("player id is required")]
    InvalidRequest,
    #[error("link command is missing its code argument")]
    MissingCodeArgument,
    #[error("link code is unknown, redeemed or expired")]
    UnknownCode,
    #[error("downstream identity link failed")]
    DownstreamLinkFailure,
    #[error("link store failure")]
    StorageFailure,
    #[error("no free link code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
}
