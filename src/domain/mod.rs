// Domain layer: link-code entities, errors and ports.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{ChatMessage, LinkEntry, ReplyTarget};
pub use errors::LinkError;
pub use ports::{ChatReplier, Clock, CodeGenerator, IdentityLinker, LinkStore};
