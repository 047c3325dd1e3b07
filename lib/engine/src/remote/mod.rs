pub mod http;

use crate::codec::{self, CompressionError, DecompressionError};
use legal_secretary_prelude::{CloudConfig, CloudData, RemoteSnapshot};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("remote sync is disabled, no endpoint configured")]
    Disabled,
    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unable to reach the remote store: {0}")]
    Request(#[source] reqwest::Error),
    #[error("remote store answered {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("unable to read the remote payload: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("unable to decompress the remote data, it may be corrupted")]
    Decompression(#[from] DecompressionError),
    #[error("unable to compress the local data: {0}")]
    Compression(#[from] CompressionError),
}

/// The remote copy of the template library.
#[async_trait::async_trait]
pub trait Remote: std::fmt::Debug + Send + Sync {
    async fn fetch(&self, config: &CloudConfig) -> Result<RemoteSnapshot, Error>;
    async fn save(&self, config: &CloudConfig, data: &CloudData) -> Result<(), Error>;
}

/// Turns any body the remote store may answer into the logical payload.
///
/// Accepts a `{ "record": ... }` wrapper, the compressed format and the legacy
/// uncompressed format. Anything else is returned as is.
pub fn normalize(body: Value) -> Result<Value, Error> {
    let payload = match body {
        Value::Object(mut inner) => match inner.remove("record") {
            Some(record) => {
                tracing::debug!("unwrapping record envelope");
                record
            }
            None => Value::Object(inner),
        },
        other => other,
    };
    if payload.get("compressed").and_then(Value::as_bool) == Some(true) {
        if let Some(data) = payload.get("data").and_then(Value::as_str) {
            return codec::decompress(data).map_err(|err| {
                metrics::counter!("sync_error", "reason" => "decompression").increment(1);
                tracing::error!("unable to decompress remote payload: {}", err);
                Error::Decompression(err)
            });
        }
    }
    if payload.get("templates").is_some_and(Value::is_array) {
        tracing::debug!("received legacy uncompressed payload");
    }
    Ok(payload)
}
