use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // API configuration
    pub api_base_url: String,
    pub request_timeout_secs: Option<u64>,
    pub environment: String,
    pub log_level: String,

    // Session storage
    pub session_file: PathBuf,

    // Pagination
    pub notifications_per_page: usize,
    pub follows_per_page: usize,

    // Content settings
    pub min_title_length: usize,
    pub min_username_length: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            api_base_url: env::var("TECHTALK_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5555".to_string()),
            request_timeout_secs: match env::var("REQUEST_TIMEOUT_SECS") {
                Ok(value) => Some(value.parse()?),
                Err(_) => None,
            },
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "techtalk_client=warn".to_string()),

            session_file: env::var("TECHTALK_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".techtalk/session.json")),

            notifications_per_page: env::var("NOTIFICATIONS_PER_PAGE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            follows_per_page: env::var("FOLLOWS_PER_PAGE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            min_title_length: env::var("MIN_TITLE_LENGTH")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            min_username_length: env::var("MIN_USERNAME_LENGTH")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
        })
    }

    /// 指向给定后端地址的配置，其余取默认值
    pub fn for_base_url(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5555".to_string(),
            request_timeout_secs: None,
            environment: "development".to_string(),
            log_level: "techtalk_client=warn".to_string(),
            session_file: PathBuf::from(".techtalk/session.json"),
            notifications_per_page: 10,
            follows_per_page: 10,
            min_title_length: 5,
            min_username_length: 4,
        }
    }
}
