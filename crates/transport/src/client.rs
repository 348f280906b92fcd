//! The reqwest-backed [`Dispatcher`].

use std::time::Duration;

use async_trait::async_trait;
use chain::{ArgumentVector, Dispatcher, OperationKey};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::endpoint::{Endpoint, EndpointTable};
use crate::template::RenderedRequest;
use crate::{TransportConfig, TransportError};

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
}

impl Response {
    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response body as text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_body(self) -> String {
        self.body
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })
    }
}

/// Executes terminal calls as HTTP requests.
///
/// Each dispatched operation is looked up in the [`EndpointTable`], its
/// merged arguments are bound to the endpoint's parameters, and the rendered
/// request is sent relative to the configured base URL.
#[derive(Debug)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    base_url: Url,
    endpoints: EndpointTable,
}

impl HttpDispatcher {
    /// Validates `config` and builds the HTTP client.
    pub fn new(config: &TransportConfig, endpoints: EndpointTable) -> Result<Self, TransportError> {
        let base_url = config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(config.header_map()?)
            .build()
            .map_err(|e| TransportError::InvalidConfig {
                message: e.to_string(),
            })?;

        tracing::debug!(
            base_url = %base_url,
            endpoints = endpoints.len(),
            "HTTP dispatcher ready"
        );

        Ok(Self {
            client,
            base_url,
            endpoints,
        })
    }

    /// The validated base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The registered endpoints.
    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        request: RenderedRequest,
    ) -> Result<Response, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in endpoint.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            let typed = endpoint
                .headers()
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
            if !typed {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Request failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
                retry_after,
            });
        }

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Request completed");
        Ok(Response {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    type Output = Response;
    type Error = TransportError;

    async fn dispatch(
        &self,
        operation: &OperationKey,
        arguments: ArgumentVector,
    ) -> Result<Response, TransportError> {
        let endpoint = self.endpoints.get(operation).ok_or_else(|| {
            tracing::error!(operation = %operation, "No endpoint mapped for operation");
            TransportError::UnmappedOperation {
                operation: operation.to_string(),
            }
        })?;

        let bindings = endpoint.bind(operation, &arguments)?;
        let request = endpoint.template().render(&self.base_url, &bindings)?;

        let span = tracing::debug_span!(
            "http_request",
            operation = %operation,
            method = %request.method,
            url = %request.url,
            status = tracing::field::Empty,
        );
        self.send(endpoint, request).instrument(span).await
    }
}
