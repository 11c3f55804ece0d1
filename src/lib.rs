pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::BotApiClient;
pub use config::toml_config::TomlConfig;
pub use core::{engine::ScanEngine, pipeline::ChannelFinderPipeline};
pub use domain::model::{AccountScan, Discovery, DiscoverySource, Entity, EntityKind, FullUser, PeerRef, ScanResult};
pub use domain::ports::TelegramApi;
pub use utils::error::{Result, ScanError};
