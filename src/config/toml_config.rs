use crate::utils::error::{Result, ScanError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub scan: ScanSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSection {
    pub api_base_url: Option<String>,
    pub bot_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSection {
    pub input: Option<String>,
    pub output: Option<String>,
    pub report: Option<String>,
    pub try_name_variations: Option<bool>,
    pub name_variations: Option<Vec<String>>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScanError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TELEGRAM_BOT_TOKEN})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    fn check_resolved(field: &str, value: &Option<String>) -> Result<()> {
        match value {
            Some(v) if v.contains("${") => Err(ScanError::ConfigValidationError {
                field: field.to_string(),
                message: format!("environment variable in '{}' is not set", v),
            }),
            _ => Ok(()),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        Self::check_resolved("telegram.api_base_url", &self.telegram.api_base_url)?;
        Self::check_resolved("telegram.bot_token", &self.telegram.bot_token)?;

        if let Some(url) = &self.telegram.api_base_url {
            validate_url("telegram.api_base_url", url)?;
        }
        if let Some(token) = &self.telegram.bot_token {
            validate_non_empty_string("telegram.bot_token", token)?;
        }
        if let Some(timeout) = self.telegram.timeout_seconds {
            validate_range("telegram.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(input) = &self.scan.input {
            validate_path("scan.input", input)?;
        }
        if let Some(output) = &self.scan.output {
            validate_path("scan.output", output)?;
        }
        if let Some(report) = &self.scan.report {
            validate_file_extension("scan.report", report, &["csv"])?;
        }
        if let Some(templates) = &self.scan.name_variations {
            validate_name_templates("scan.name_variations", templates)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[telegram]
api_base_url = "http://localhost:8081"
bot_token = "123:abc"
timeout_seconds = 10

[scan]
input = "in.txt"
output = "out.txt"
report = "report.csv"
name_variations = ["{}", "{}_news"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.telegram.api_base_url.as_deref(),
            Some("http://localhost:8081")
        );
        assert_eq!(config.telegram.timeout_seconds, Some(10));
        assert_eq!(config.scan.input.as_deref(), Some("in.txt"));
        assert_eq!(
            config.scan.name_variations,
            Some(vec!["{}".to_string(), "{}_news".to_string()])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.telegram.bot_token.is_none());
        assert!(config.scan.output.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CHANNEL_FINDER_TEST_TOKEN", "999:xyz");

        let config = TomlConfig::from_toml_str(
            r#"
[telegram]
bot_token = "${CHANNEL_FINDER_TEST_TOKEN}"
"#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token.as_deref(), Some("999:xyz"));

        std::env::remove_var("CHANNEL_FINDER_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_placeholder_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[telegram]
bot_token = "${CHANNEL_FINDER_SURELY_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ScanError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let config = TomlConfig::from_toml_str(
            r#"
[telegram]
api_base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[scan]
name_variations = ["static_name"]
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            TomlConfig::from_toml_str("[telegram\n"),
            Err(ScanError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[scan]\noutput = \"found.txt\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.scan.output.as_deref(), Some("found.txt"));
    }
}
