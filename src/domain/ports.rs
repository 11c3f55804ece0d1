use crate::domain::model::{Entity, FullUser, PeerRef, ScanResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_path(&self) -> Option<&str>;
    fn name_variations(&self) -> &[String];
}

/// Remote messaging client. Each call may fail independently; callers decide
/// whether to fall through to another parameter shape.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_entity(&self, peer: &PeerRef) -> Result<Entity>;
    async fn get_full_user(&self, user: &Entity) -> Result<FullUser>;
    /// `peers` are expected to be channel references.
    async fn get_channels(&self, peers: &[PeerRef]) -> Result<Vec<Entity>>;
    /// Returns the `chats` array of the full channel response.
    async fn get_full_channel(&self, channel: &Entity) -> Result<Vec<Entity>>;
    async fn resolve_username(&self, username: &str) -> Result<PeerRef>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<String>>;
    async fn transform(&self, accounts: Vec<String>) -> Result<ScanResult>;
    async fn load(&self, result: ScanResult) -> Result<String>;
}
