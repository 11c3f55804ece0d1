#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::{load_env_file, CliConfig};

#[cfg(feature = "cli")]
mod cli_config {
    use crate::adapters::BotApiClient;
    use crate::config::toml_config::TomlConfig;
    use crate::core::lookup::default_name_variations;
    use crate::core::ConfigProvider;
    use crate::utils::error::{Result, ScanError};
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::time::Duration;

    pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
    pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
    pub const API_BASE_URL_ENV: &str = "TELEGRAM_API_BASE_URL";
    pub const DEFAULT_INPUT: &str = "accounts.txt";
    pub const DEFAULT_OUTPUT: &str = "channels.txt";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "channel-finder")]
    #[command(about = "Discover public Telegram channels associated with a list of accounts")]
    pub struct CliConfig {
        #[arg(long, help = "File with one account per line [default: accounts.txt]")]
        pub input: Option<String>,

        #[arg(long, help = "Where to write the channel list [default: channels.txt]")]
        pub output: Option<String>,

        #[arg(long, default_value = ".", help = "Directory input and output paths are relative to")]
        pub base_path: String,

        #[arg(long, help = "Optional CSV report of account, channel and strategy")]
        pub report: Option<String>,

        #[arg(long, help = "Bot API base URL (default: $TELEGRAM_API_BASE_URL or api.telegram.org)")]
        pub api_base_url: Option<String>,

        #[arg(long, help = "Bot token (default: $TELEGRAM_BOT_TOKEN)")]
        pub bot_token: Option<String>,

        #[arg(long, help = "Per-request timeout in seconds [default: 30]")]
        pub timeout_secs: Option<u64>,

        #[arg(long, help = "Skip the username variation fallback")]
        pub no_variations: bool,

        #[arg(long, help = "TOML configuration file")]
        pub config: Option<String>,

        #[arg(long, help = "Dotenv file to load before reading the environment (default: ./.env if present)")]
        pub env_file: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[arg(skip = default_name_variations())]
        pub name_variations: Vec<String>,
    }

    impl CliConfig {
        /// 命令列沒給的值，從環境變數補上
        pub fn apply_env(&mut self) {
            if self.bot_token.is_none() {
                self.bot_token = std::env::var(BOT_TOKEN_ENV).ok();
            }
            if self.api_base_url.is_none() {
                self.api_base_url = std::env::var(API_BASE_URL_ENV).ok();
            }
        }

        /// Fills in whatever the command line left unset; explicit flags
        /// always win over the file.
        pub fn merge_toml(&mut self, file: TomlConfig) -> Result<()> {
            file.validate()?;

            let TomlConfig { telegram, scan } = file;

            if self.bot_token.is_none() {
                self.bot_token = telegram.bot_token;
            }
            if self.api_base_url.is_none() {
                self.api_base_url = telegram.api_base_url;
            }
            if self.timeout_secs.is_none() {
                self.timeout_secs = telegram.timeout_seconds;
            }
            if self.input.is_none() {
                self.input = scan.input;
            }
            if self.output.is_none() {
                self.output = scan.output;
            }
            if self.report.is_none() {
                self.report = scan.report;
            }
            if let Some(templates) = scan.name_variations {
                self.name_variations = templates;
            }
            if scan.try_name_variations == Some(false) {
                self.no_variations = true;
            }

            Ok(())
        }

        /// Resolves `--config`, then the environment.
        pub fn load(mut self) -> Result<Self> {
            if let Some(path) = self.config.clone() {
                let file = TomlConfig::from_file(&path)?;
                self.merge_toml(file)?;
            }
            self.apply_env();
            Ok(self)
        }

        pub fn timeout_secs(&self) -> u64 {
            self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
        }

        pub fn api_base_url(&self) -> &str {
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
        }

        pub fn telegram_client(&self) -> Result<BotApiClient> {
            let token = crate::utils::validation::validate_required_field("bot_token", &self.bot_token)?;
            BotApiClient::new(
                self.api_base_url(),
                token,
                Duration::from_secs(self.timeout_secs()),
            )
        }
    }

    /// 載入 dotenv 檔；未指定時只嘗試目前目錄的 `.env`
    pub fn load_env_file(path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ScanError::ConfigError {
                    message: format!("Failed to load env file {}: {}", path, e),
                })?;
                tracing::debug!("Loaded environment from {}", path);
                Ok(())
            }
            None => {
                if let Ok(path) = dotenvy::dotenv() {
                    tracing::debug!("Loaded environment from {}", path.display());
                }
                Ok(())
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            self.input.as_deref().unwrap_or(DEFAULT_INPUT)
        }

        fn output_path(&self) -> &str {
            self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
        }

        fn report_path(&self) -> Option<&str> {
            self.report.as_deref()
        }

        fn name_variations(&self) -> &[String] {
            if self.no_variations {
                &[]
            } else {
                &self.name_variations
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            use crate::utils::validation::*;

            validate_url("api_base_url", self.api_base_url())?;

            let token = validate_required_field("bot_token", &self.bot_token)?;
            validate_non_empty_string("bot_token", token)?;

            validate_path("input", self.input_path())?;
            validate_path("output", self.output_path())?;
            validate_path("base_path", &self.base_path)?;

            if let Some(report) = &self.report {
                validate_file_extension("report", report, &["csv"])?;
            }

            validate_range("timeout_secs", self.timeout_secs(), 1, 300)?;
            validate_name_templates("name_variations", &self.name_variations)?;

            tracing::debug!("✅ CLI configuration validation passed");
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> CliConfig {
            let mut argv = vec!["channel-finder"];
            argv.extend_from_slice(args);
            CliConfig::parse_from(argv)
        }

        #[test]
        fn test_defaults() {
            let config = parse(&[]);
            assert_eq!(config.input_path(), "accounts.txt");
            assert_eq!(config.output_path(), "channels.txt");
            assert_eq!(config.timeout_secs(), 30);
            assert_eq!(config.name_variations(), default_name_variations().as_slice());
            assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        }

        #[test]
        fn test_missing_token_fails_validation() {
            let config = parse(&[]);
            assert!(matches!(
                config.validate(),
                Err(ScanError::MissingConfigError { .. })
            ));
        }

        #[test]
        fn test_valid_with_token() {
            let config = parse(&["--bot-token", "1:a", "--report", "out.csv"]);
            assert!(config.validate().is_ok());

            let config = parse(&["--bot-token", "1:a", "--report", "out.txt"]);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_no_variations_flag() {
            let config = parse(&["--no-variations"]);
            assert!(config.name_variations().is_empty());
        }

        #[test]
        fn test_merge_toml_respects_explicit_flags() {
            let mut config = parse(&["--bot-token", "cli-token"]);
            let file = TomlConfig::from_toml_str(
                r#"
[telegram]
bot_token = "file-token"
api_base_url = "http://localhost:8081"
timeout_seconds = 5

[scan]
output = "found.txt"
try_name_variations = false
"#,
            )
            .unwrap();

            config.merge_toml(file).unwrap();

            assert_eq!(config.bot_token.as_deref(), Some("cli-token"));
            assert_eq!(config.api_base_url(), "http://localhost:8081");
            assert_eq!(config.timeout_secs(), 5);
            assert_eq!(config.output_path(), "found.txt");
            assert_eq!(config.input_path(), "accounts.txt");
            assert!(config.name_variations().is_empty());
        }

        #[test]
        fn test_explicit_paths_and_timeout_win_over_toml() {
            let mut config = parse(&[
                "--output",
                "mine.txt",
                "--timeout-secs",
                "12",
                "--input",
                "list.txt",
            ]);
            let file = TomlConfig::from_toml_str(
                r#"
[telegram]
timeout_seconds = 5

[scan]
input = "file-accounts.txt"
output = "found.txt"
"#,
            )
            .unwrap();

            config.merge_toml(file).unwrap();

            assert_eq!(config.timeout_secs(), 12);
            assert_eq!(config.output_path(), "mine.txt");
            assert_eq!(config.input_path(), "list.txt");
        }

        #[test]
        fn test_load_env_file_sets_variables() {
            let dir = tempfile::TempDir::new().unwrap();
            let path = dir.path().join("test.env");
            std::fs::write(&path, "CHANNEL_FINDER_ENV_FILE_TEST=from-dotenv\n").unwrap();

            load_env_file(Some(path.to_str().unwrap())).unwrap();

            assert_eq!(
                std::env::var("CHANNEL_FINDER_ENV_FILE_TEST").unwrap(),
                "from-dotenv"
            );
        }

        #[test]
        fn test_load_env_file_missing_path_is_config_error() {
            let dir = tempfile::TempDir::new().unwrap();
            let path = dir.path().join("absent.env");

            let result = load_env_file(Some(path.to_str().unwrap()));
            assert!(matches!(result, Err(ScanError::ConfigError { .. })));
        }
    }
}
