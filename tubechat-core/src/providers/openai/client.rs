//! HTTP client for OpenAI-compatible chat completion endpoints

use super::streaming::{parse_stream, DeltaStream};
use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::SecretString;
use crate::protocol::Message;
use crate::providers::error::{map_http_error, ProviderResult};
use crate::providers::vendor::{CallMode, ResolvedModel};
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Client bound to one vendor, one model and one API key
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: SecretString,
    target: ResolvedModel,
}

impl LlmClient {
    pub(crate) fn new(http: Client, api_key: SecretString, target: ResolvedModel) -> Self {
        Self {
            http,
            api_key,
            target,
        }
    }

    /// Name of the vendor this client talks to
    pub fn vendor(&self) -> &str {
        &self.target.vendor.name
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.target.vendor.base_url
    }

    /// Model id sent upstream
    pub fn model(&self) -> &str {
        &self.target.model
    }

    /// Call mode supported by the vendor
    pub fn call_mode(&self) -> CallMode {
        self.target.call_mode()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.target.vendor.base_url.trim_end_matches('/')
        )
    }

    async fn post(
        &self,
        messages: &[Message],
        stream: bool,
        request_id: Uuid,
    ) -> ProviderResult<Response> {
        let body = ChatCompletionRequest {
            model: &self.target.model,
            messages,
            stream,
        };

        info!(
            "Calling {} model {} (stream: {}) [request_id: {}]",
            self.vendor(),
            self.model(),
            stream,
            request_id
        );
        debug!("Request URL: {}", self.endpoint());

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Request-ID", request_id.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.ok();
            warn!(
                "Request to {} failed with status {} [request_id: {}]",
                self.vendor(),
                status,
                request_id
            );
            Err(map_http_error(status, body))
        }
    }

    /// Non-streaming chat completion
    pub async fn chat_completion(
        &self,
        messages: &[Message],
        request_id: Uuid,
    ) -> ProviderResult<ChatCompletionResponse> {
        let response = self.post(messages, false, request_id).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Streaming chat completion. Returns once the response headers arrive;
    /// the body is consumed lazily through the returned stream.
    pub async fn chat_completion_stream(
        &self,
        messages: &[Message],
        request_id: Uuid,
    ) -> ProviderResult<DeltaStream> {
        let response = self.post(messages, true, request_id).await?;
        Ok(parse_stream(response.bytes_stream()))
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("vendor", &self.target.vendor.name)
            .field("base_url", &self.target.vendor.base_url)
            .field("model", &self.target.model)
            .field("api_key", &self.api_key)
            .finish()
    }
}
