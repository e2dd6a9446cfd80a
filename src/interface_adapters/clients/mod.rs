// The clients defined here are reqwest clients for external services.

pub mod discord;
pub mod playfab;
