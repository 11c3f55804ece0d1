// Adapters layer: concrete clients for external systems.

pub mod bot_api;

pub use bot_api::BotApiClient;
