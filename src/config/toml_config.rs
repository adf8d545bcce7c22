use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "EyeCareJobScout/1.0 (eye-care-job-scout@example.com)";

fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_max_results() -> usize {
    20
}
fn default_fallback_results() -> usize {
    10
}
fn default_radius_m() -> u32 {
    5000
}
fn default_true() -> bool {
    true
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_nominatim_endpoint() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}
fn default_search_timeout() -> u64 {
    8
}
fn default_detail_timeout() -> u64 {
    10
}
fn default_result_limit() -> u32 {
    10
}
fn default_overpass_endpoint() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}
fn default_overpass_timeout() -> u64 {
    15
}
fn default_wikidata_endpoint() -> String {
    "https://query.wikidata.org/sparql".to_string()
}
fn default_wikidata_timeout() -> u64 {
    20
}
fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_enquiry_model() -> String {
    "gemini-pro".to_string()
}
fn default_ranking_model() -> String {
    "gemini-2.5-flash-preview-05-20".to_string()
}
fn default_max_attempts() -> u32 {
    5
}
fn default_backoff_base_ms() -> u64 {
    1000
}
fn default_gemini_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 未設定 RUST_LOG 時使用的日誌等級與格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// actix-web 存取日誌的等級
    #[serde(default = "default_log_level")]
    pub http_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            http_level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_fallback_results")]
    pub fallback_results: usize,
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
    #[serde(default = "default_true")]
    pub structured_search: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            fallback_results: default_fallback_results(),
            default_radius_m: default_radius_m(),
            structured_search: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub nominatim: NominatimConfig,
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub wikidata: WikidataConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            nominatim: NominatimConfig::default(),
            overpass: OverpassConfig::default(),
            wikidata: WikidataConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    #[serde(default = "default_nominatim_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_timeout")]
    pub search_timeout_seconds: u64,
    #[serde(default = "default_detail_timeout")]
    pub detail_timeout_seconds: u64,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: default_nominatim_endpoint(),
            search_timeout_seconds: default_search_timeout(),
            detail_timeout_seconds: default_detail_timeout(),
            result_limit: default_result_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_overpass_timeout")]
    pub timeout_seconds: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: default_overpass_endpoint(),
            timeout_seconds: default_overpass_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikidataConfig {
    #[serde(default = "default_wikidata_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_wikidata_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            endpoint: default_wikidata_endpoint(),
            timeout_seconds: default_wikidata_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_enquiry_model")]
    pub enquiry_model: String,
    #[serde(default = "default_ranking_model")]
    pub ranking_model: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            api_key: None,
            enquiry_model: default_enquiry_model(),
            ranking_model: default_ranking_model(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_seconds: default_gemini_timeout(),
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: ServiceConfig =
            toml::from_str(&processed_content).map_err(|e| ScoutError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.normalize();
        Ok(config)
    }

    /// 依序尋找預設位置的設定檔，找不到就用預設值
    pub fn discover() -> Result<Self> {
        for path in default_config_paths() {
            if path.exists() {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                return Self::from_file(&path);
            }
        }
        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoutError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    // 未被替換的 ${VAR} 或空字串都視為沒有設定 API key
    fn normalize(&mut self) {
        let unset = self
            .providers
            .gemini
            .api_key
            .as_deref()
            .map(|k| k.trim().is_empty() || k.starts_with("${"))
            .unwrap_or(false);
        if unset {
            self.providers.gemini.api_key = None;
        }
    }

    pub fn socket_addr(&self) -> (String, u16) {
        (self.server.bind.clone(), self.server.port)
    }

    pub fn gemini_key_configured(&self) -> bool {
        self.providers.gemini.api_key.is_some()
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        let providers = &self.providers;
        validation::validate_url("providers.nominatim.endpoint", &providers.nominatim.endpoint)?;
        validation::validate_url("providers.overpass.endpoint", &providers.overpass.endpoint)?;
        validation::validate_url("providers.wikidata.endpoint", &providers.wikidata.endpoint)?;
        validation::validate_url("providers.gemini.endpoint", &providers.gemini.endpoint)?;
        validation::validate_non_empty_string("providers.user_agent", &providers.user_agent)?;
        validation::validate_non_empty_string("server.bind", &self.server.bind)?;
        validation::validate_log_level("logging.level", &self.logging.level)?;
        validation::validate_log_level("logging.http_level", &self.logging.http_level)?;

        validation::validate_positive_number("search.max_results", self.search.max_results, 1)?;
        validation::validate_positive_number(
            "search.fallback_results",
            self.search.fallback_results,
            1,
        )?;
        validation::validate_range(
            "providers.nominatim.result_limit",
            providers.nominatim.result_limit,
            1,
            50,
        )?;
        validation::validate_range(
            "providers.gemini.max_attempts",
            providers.gemini.max_attempts,
            1,
            10,
        )?;

        if let Some(workers) = self.server.workers {
            validation::validate_positive_number("server.workers", workers, 1)?;
        }

        Ok(())
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("eyecare-scout.toml"),
        PathBuf::from(".eyecare-scout.toml"),
        PathBuf::from("config/eyecare-scout.toml"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = ServiceConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.search.fallback_results, 10);
        assert_eq!(config.providers.nominatim.search_timeout_seconds, 8);
        assert_eq!(config.providers.gemini.max_attempts, 5);
        assert!(config.providers.gemini.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_provider_sections() {
        let toml_content = r#"
[server]
bind = "0.0.0.0"
port = 8080

[search]
max_results = 15
structured_search = false

[providers.nominatim]
endpoint = "http://localhost:9000"

[providers.gemini]
api_key = "abc123"
enquiry_model = "gemini-1.5-flash"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.socket_addr(), ("0.0.0.0".to_string(), 8080));
        assert_eq!(config.search.max_results, 15);
        assert!(!config.search.structured_search);
        assert_eq!(config.providers.nominatim.endpoint, "http://localhost:9000");
        assert_eq!(config.providers.nominatim.result_limit, 10);
        assert_eq!(config.providers.gemini.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.providers.gemini.enquiry_model, "gemini-1.5-flash");
        assert_eq!(
            config.providers.gemini.ranking_model,
            "gemini-2.5-flash-preview-05-20"
        );
    }

    #[test]
    fn test_logging_section() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.http_level, "info");
        assert!(!config.logging.json);

        let config = ServiceConfig::from_toml_str(
            "[logging]\nlevel = \"debug\"\nhttp_level = \"warn\"\njson = true\n",
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.http_level, "warn");
        assert!(config.logging.json);
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.logging.http_level = "loud".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCOUT_TEST_GEMINI_KEY", "from-env");

        let toml_content = r#"
[providers.gemini]
api_key = "${SCOUT_TEST_GEMINI_KEY}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.providers.gemini.api_key.as_deref(), Some("from-env"));

        std::env::remove_var("SCOUT_TEST_GEMINI_KEY");
    }

    #[test]
    fn test_unresolved_api_key_is_treated_as_missing() {
        let toml_content = r#"
[providers.gemini]
api_key = "${SCOUT_TEST_UNSET_VARIABLE_XYZ}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(!config.gemini_key_configured());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[providers.overpass]
endpoint = "invalid-url"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.providers.gemini.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config =
            ServiceConfig::from_toml_str(include_str!("../../eyecare-scout.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.providers.overpass.timeout_seconds, 15);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = ServiceConfig::from_toml_str("[server\nport = 1");
        assert!(matches!(
            result,
            Err(ScoutError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[server]
port = 4100
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 4100);
    }
}
