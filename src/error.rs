use legal_secretary_engine::backup::ImportError;
use legal_secretary_engine::draft;
use legal_secretary_engine::remote;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to load configuration: {0}")]
    Configuration(#[from] config::ConfigError),
    #[error("template {0:?} not found")]
    TemplateNotFound(String),
    #[error("invalid value {0:?}, expected NAME=VALUE")]
    InvalidValue(String),
    #[error("unable to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unable to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Sync(#[from] remote::Error),
    #[error(transparent)]
    Draft(#[from] draft::Error),
}
