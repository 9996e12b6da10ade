use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use sentinel_core::{Endpoint, OutboundRequest, Outcome};
use sentinel_logging::{sentinel_debug, sentinel_warn};
use serde_json::Value;
use url::Url;

use crate::{BridgeError, OutboundError};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Debug, Clone)]
pub struct OutboundSettings {
    /// Endpoint names are resolved against this URL.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl OutboundSettings {
    /// Settings for the host namespace `https://{resource}/`.
    pub fn for_resource(resource: &str) -> Self {
        Self {
            base_url: format!("https://{resource}/"),
            ..Self::default()
        }
    }
}

impl Default for OutboundSettings {
    fn default() -> Self {
        Self {
            base_url: "https://project-sentinel/".to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` to `endpoint`. `Ok(None)` means the host replied with no body.
    async fn send(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, OutboundError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestTransport {
    pub fn new(settings: &OutboundSettings) -> Result<Self, BridgeError> {
        let mut raw = settings.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|source| BridgeError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BridgeError::Client(err.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, OutboundError> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|err| OutboundError::InvalidUrl(err.to_string()))?;
        let payload =
            serde_json::to_vec(body).map_err(|err| OutboundError::Decode(err.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OutboundError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| OutboundError::Decode(err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> OutboundError {
    if err.is_timeout() {
        return OutboundError::Timeout;
    }
    OutboundError::Network(err.to_string())
}

/// Typed front of a [`Transport`]: one call per [`Endpoint`].
#[derive(Clone)]
pub struct OutboundClient {
    transport: Arc<dyn Transport>,
}

impl OutboundClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fire-and-forget: failures are logged and dropped.
    pub async fn notify(&self, endpoint: Endpoint, body: &Value) {
        if let Err(err) = self.request(endpoint, body).await {
            sentinel_warn!("{} failed: {}", endpoint, err);
        }
    }

    pub async fn request(
        &self,
        endpoint: Endpoint,
        body: &Value,
    ) -> Result<Option<Value>, OutboundError> {
        sentinel_debug!("POST {}", endpoint);
        self.transport.send(endpoint.path(), body).await
    }

    /// Runs `request`; awaited requests yield their [`Outcome`].
    pub async fn send(&self, request: &OutboundRequest) -> Option<Outcome> {
        if request.ticket.is_none() {
            self.notify(request.endpoint, &request.body).await;
            return None;
        }
        let outcome = match self.request(request.endpoint, &request.body).await {
            Ok(reply) => Outcome::Replied(reply),
            Err(err) => {
                sentinel_warn!("{} failed: {}", request.endpoint, err);
                Outcome::Failed(err.to_string())
            }
        };
        Some(outcome)
    }
}
