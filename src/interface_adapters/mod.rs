// Interface adapters: HTTP surface, chat gateway, upstream clients and storage.

pub mod clients;
pub mod gateway;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod utils;
