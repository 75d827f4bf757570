pub mod app_config;
pub mod config;
pub mod export;
pub mod locators;
pub mod records;
pub mod run_config;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use export::{export_file_name, write_export, ExportDocument, ExportError};
pub use locators::{load_locators, Field, LocatorRule, LocatorTable};
pub use records::{
    ChannelInfo, CollectionResult, CommentKey, CommentRecord, ReplyOutcome, ReplyProgressEvent,
    StopReason, VideoMetadata,
};
pub use run_config::{CollectorConfig, DelayRange, ReplyConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read locators file {path}: {source}")]
    LocatorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locators file: {0}")]
    LocatorsFileParse(#[source] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
