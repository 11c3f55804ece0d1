use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ScanEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ScanEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        let monitor = SystemMonitor::new(monitor_enabled);
        if monitor.is_enabled() {
            tracing::info!("🔍 System monitoring enabled");
        }
        Self { pipeline, monitor }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting channel scan...");
        self.monitor.log_stats("Start");

        // Extract
        let accounts = self.pipeline.extract().await?;
        tracing::info!("Loaded {} accounts", accounts.len());
        self.monitor.log_stats("Read accounts");

        // Transform
        let result = self.pipeline.transform(accounts).await?;
        let failed = result
            .accounts
            .iter()
            .filter(|scan| scan.error.is_some())
            .count();
        tracing::info!(
            "Scanned {} accounts ({} failed), {} unique channels",
            result.accounts.len(),
            failed,
            result.channels.len()
        );
        self.monitor.log_stats("Scan accounts");

        // Load
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Write output");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AccountScan, ScanResult};
    use crate::domain::model::DiscoverySource;
    use std::sync::Mutex;

    struct RecordingPipeline {
        phases: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<Vec<String>> {
            self.phases.lock().unwrap().push("extract".to_string());
            Ok(vec!["@a".to_string(), "@b".to_string()])
        }

        async fn transform(&self, accounts: Vec<String>) -> Result<ScanResult> {
            self.phases.lock().unwrap().push("transform".to_string());
            let mut result = ScanResult::default();
            for account in accounts {
                let mut scan = AccountScan::new(account.clone());
                scan.add(account.trim_start_matches('@'), DiscoverySource::Direct);
                result.push(scan);
            }
            Ok(result)
        }

        async fn load(&self, result: ScanResult) -> Result<String> {
            self.phases
                .lock()
                .unwrap()
                .push(format!("load:{}", result.channels.len()));
            Ok("channels.txt".to_string())
        }
    }

    #[test]
    fn test_run_executes_phases_in_order() {
        let engine = ScanEngine::new(RecordingPipeline {
            phases: Mutex::new(Vec::new()),
        });

        let output = tokio_test::block_on(engine.run()).unwrap();

        assert_eq!(output, "channels.txt");
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load:2"]
        );
    }

    #[test]
    fn test_monitored_run_keeps_output() {
        let engine = ScanEngine::new_with_monitoring(
            RecordingPipeline {
                phases: Mutex::new(Vec::new()),
            },
            true,
        );
        assert_eq!(engine.monitor.is_enabled(), cfg!(feature = "cli"));

        let output = tokio_test::block_on(engine.run()).unwrap();
        assert_eq!(output, "channels.txt");
    }
}
