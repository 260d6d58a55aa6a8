//! HTTP access to the scrobbler server.
//!
//! `ScrobblerApi` is the seam the client core is written against; `HttpClient`
//! is the reqwest-backed implementation.  Every call returns a `Result` so a
//! failed request never escapes its call site.

use std::future::Future;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

pub use reqwest::StatusCode;

use crate::config::ServerConfig;
use crate::protocol::{
    CommandResponse, Endpoint, SessionStatus, StartRequest, Station, StationsResponse,
};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, broken body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status without a usable body.
    #[error("server answered HTTP {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

/// Operations the scrobbler server exposes.
pub trait ScrobblerApi: Send + Sync + 'static {
    fn stations(&self) -> impl Future<Output = Result<StationsResponse, ApiError>> + Send;

    fn start(
        &self,
        station: &Station,
    ) -> impl Future<Output = Result<CommandResponse, ApiError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<CommandResponse, ApiError>> + Send;

    fn emergency_stop(&self) -> impl Future<Output = Result<CommandResponse, ApiError>> + Send;

    fn status(&self) -> impl Future<Output = Result<SessionStatus, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("scrobctl/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let response = self.http.get(self.url(endpoint)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST to a command endpoint.  Command endpoints report domain failures
    /// with a non-2xx status *and* a JSON body; the body wins when it parses.
    async fn post_command(
        &self,
        endpoint: Endpoint,
        body: Option<&StartRequest>,
    ) -> Result<CommandResponse, ApiError> {
        let mut request = self.http.post(self.url(endpoint));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<CommandResponse>(&text) {
            Ok(reply) => {
                if !status.is_success() {
                    debug!("{} answered {} with {:?}", endpoint.path(), status, reply);
                }
                Ok(reply)
            }
            Err(e) if status.is_success() => Err(ApiError::Decode(e)),
            Err(_) => Err(ApiError::Status(status)),
        }
    }
}

impl ScrobblerApi for HttpClient {
    async fn stations(&self) -> Result<StationsResponse, ApiError> {
        self.get_json(Endpoint::Stations).await
    }

    async fn start(&self, station: &Station) -> Result<CommandResponse, ApiError> {
        let body = StartRequest {
            station: station.clone(),
        };
        self.post_command(Endpoint::Start, Some(&body)).await
    }

    async fn stop(&self) -> Result<CommandResponse, ApiError> {
        self.post_command(Endpoint::Stop, None).await
    }

    async fn emergency_stop(&self) -> Result<CommandResponse, ApiError> {
        self.post_command(Endpoint::EmergencyStop, None).await
    }

    async fn status(&self) -> Result<SessionStatus, ApiError> {
        self.get_json(Endpoint::Status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ServerConfig {
            base_url: "http://scrobbler.lan:5000/".to_string(),
            ..ServerConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://scrobbler.lan:5000");
        assert_eq!(
            client.url(Endpoint::Start),
            "http://scrobbler.lan:5000/api/start"
        );
    }
}
