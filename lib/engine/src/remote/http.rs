use super::Error;
use legal_secretary_prelude::{CloudConfig, CloudData, CompressedPayload, RemoteSnapshot};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, Url};

/// Sends the credential under every header convention the supported json
/// stores use. Narrow it here when a backend needs a single one.
pub fn attach_credential(request: RequestBuilder, config: &CloudConfig) -> RequestBuilder {
    let request = request.header(CONTENT_TYPE, "application/json");
    match config.api_key() {
        Some(key) => request
            .header("X-Access-Key", key)
            .header("X-Master-Key", key)
            .header(AUTHORIZATION, format!("Bearer {key}")),
        None => request,
    }
}

#[derive(Clone, Debug, Default)]
pub struct HttpRemote {
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_url(&self, config: &CloudConfig) -> Result<Url, Error> {
        if !config.is_enabled() {
            return Err(Error::Disabled);
        }
        let endpoint = config.endpoint.trim();
        Url::parse(endpoint).map_err(|err| {
            tracing::error!("unable to parse endpoint: {:?}", err);
            Error::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                source: err,
            }
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let res = request.send().await.map_err(|err| {
            metrics::counter!("sync_error", "reason" => "request").increment(1);
            tracing::error!("unable to execute request: {:?}", err);
            Error::Request(err)
        })?;
        let status = res.status();
        if !status.is_success() {
            metrics::counter!("sync_error", "reason" => "status").increment(1);
            tracing::error!("remote store answered with status {}", status);
            return Err(Error::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(res)
    }
}

#[async_trait::async_trait]
impl super::Remote for HttpRemote {
    async fn fetch(&self, config: &CloudConfig) -> Result<RemoteSnapshot, Error> {
        let url = self.build_url(config)?;
        tracing::debug!("fetching templates from {}", url);
        let request = attach_credential(self.client.get(url), config);
        let res = self.send(request).await?;
        let body = res.bytes().await.map_err(|err| {
            tracing::error!("unable to read response body: {:?}", err);
            Error::Request(err)
        })?;
        let body: serde_json::Value = serde_json::from_slice(&body).map_err(|err| {
            tracing::error!("unable to parse response body: {:?}", err);
            Error::Payload(err)
        })?;
        let payload = super::normalize(body)?;
        serde_json::from_value(payload).map_err(|err| {
            tracing::error!("unexpected remote payload: {:?}", err);
            Error::Payload(err)
        })
    }

    async fn save(&self, config: &CloudConfig, data: &CloudData) -> Result<(), Error> {
        let url = self.build_url(config)?;
        tracing::debug!("pushing revision {} to {}", data.version, url);
        let payload = CompressedPayload {
            compressed: true,
            data: crate::codec::compress(data)?,
            updated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        let request = attach_credential(self.client.put(url), config).json(&payload);
        self.send(request).await?;
        Ok(())
    }
}
