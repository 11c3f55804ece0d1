use crate::core::lookup::ChannelLookup;
use crate::core::{ConfigProvider, Pipeline, ScanResult, Storage, TelegramApi};
use crate::utils::error::{Result, ScanError};

pub struct ChannelFinderPipeline<S: Storage, C: ConfigProvider, A: TelegramApi> {
    storage: S,
    config: C,
    api: A,
}

impl<S: Storage, C: ConfigProvider, A: TelegramApi> ChannelFinderPipeline<S, C, A> {
    pub fn new(storage: S, config: C, api: A) -> Self {
        Self {
            storage,
            config,
            api,
        }
    }

    fn render_report(result: &ScanResult) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["account", "channel", "source"])?;

        for scan in &result.accounts {
            if scan.discoveries.is_empty() {
                if let Some(error) = &scan.error {
                    writer.write_record([
                        scan.account.as_str(),
                        "",
                        format!("error:{}", error).as_str(),
                    ])?;
                }
                continue;
            }

            for discovery in &scan.discoveries {
                writer.write_record([
                    scan.account.as_str(),
                    discovery.handle.as_str(),
                    discovery.source.to_string().as_str(),
                ])?;
            }
        }

        writer.into_inner().map_err(|e| ScanError::ProcessingError {
            message: format!("Failed to finish CSV report: {}", e),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, A: TelegramApi> Pipeline for ChannelFinderPipeline<S, C, A> {
    async fn extract(&self) -> Result<Vec<String>> {
        tracing::debug!("Reading accounts from: {}", self.config.input_path());
        let raw = self.storage.read_file(self.config.input_path()).await?;
        let content = String::from_utf8(raw).map_err(|e| ScanError::ProcessingError {
            message: format!("{} is not valid UTF-8: {}", self.config.input_path(), e),
        })?;

        let accounts: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(accounts)
    }

    async fn transform(&self, accounts: Vec<String>) -> Result<ScanResult> {
        let lookup = ChannelLookup::new(&self.api);
        let mut result = ScanResult::default();

        // 帳號逐一處理，不做並行
        for account in accounts {
            tracing::info!("Processing account: {}", account);
            let mut scan = lookup.process_user(&account).await;

            if scan.is_empty() {
                if let Some(username) = account.strip_prefix('@') {
                    tracing::debug!(
                        "No channels found with primary method, trying alternative methods..."
                    );
                    lookup
                        .try_direct_fetch_user_channel(
                            username,
                            self.config.name_variations(),
                            &mut scan,
                        )
                        .await;

                    if scan.is_empty() {
                        tracing::debug!("Alternative methods also failed to find channels");
                    } else {
                        tracing::debug!("Alternative methods found channels: {:?}", scan.handles());
                    }
                }
            }

            result.push(scan);
        }

        Ok(result)
    }

    async fn load(&self, result: ScanResult) -> Result<String> {
        let output_path = self.config.output_path().to_string();

        self.storage
            .write_file(&output_path, result.channel_list().as_bytes())
            .await?;

        if let Some(report_path) = self.config.report_path() {
            let report = Self::render_report(&result)?;
            tracing::debug!("Writing report ({} bytes) to {}", report.len(), report_path);
            self.storage.write_file(report_path, &report).await?;
        }

        tracing::info!(
            "Extracted {} unique channels and saved to {}",
            result.channels.len(),
            output_path
        );
        Ok(output_path)
    }
}
