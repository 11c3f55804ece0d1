pub mod engine;
pub mod extract;
pub mod lookup;
pub mod pipeline;

pub use crate::domain::model::{AccountScan, ScanResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TelegramApi};
pub use crate::utils::error::Result;
