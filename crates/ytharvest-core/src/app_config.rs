use std::path::PathBuf;

use crate::run_config::{CollectorConfig, ReplyConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// DevTools endpoint of the browser hosting the watch page.
    pub cdp_url: String,
    /// Optional YAML file overriding the built-in locator rules.
    pub locators_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub collector: CollectorConfig,
    pub reply: ReplyConfig,
    /// Hard ceiling on one `autoReply` request, enforced by the dispatcher.
    pub reply_timeout_secs: u64,
}
