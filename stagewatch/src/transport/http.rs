//! HTTP `text/event-stream` source over reqwest.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use std::collections::HashMap;
use tracing::debug;

use super::{EventSource, FrameStream, Principal};
use crate::config::MonitorConfig;
use crate::errors::TransportError;
use crate::protocol::SseDecoder;

/// Opens the server-push stream with a GET request and decodes its frames.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
}

impl HttpEventSource {
    /// Creates a source for the configured endpoint.
    ///
    /// The configuration is validated first.
    pub fn new(config: &MonitorConfig) -> Result<Self, TransportError> {
        config
            .validate()
            .map_err(|e| TransportError::open(&config.endpoint, e.to_string()))?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::open(&config.endpoint, e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            headers: config.headers.clone(),
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn open(&self, principal: &Principal) -> Result<FrameStream, TransportError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(token) = principal.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::open(&self.endpoint, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        debug!(endpoint = %self.endpoint, status = status.as_u16(), "Event stream opened");

        let frames = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let items: Vec<Result<String, TransportError>> = match chunk {
                    Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(TransportError::stream(e.to_string()))],
                };
                futures::future::ready(Some(stream::iter(items)))
            })
            .flatten();

        Ok(frames.boxed())
    }
}
