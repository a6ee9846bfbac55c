use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::retry::RetryPolicy;
use super::types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use super::ModelBackend;
use crate::config::{ModelConfig, RequestConfig};
use crate::error::{LlmError, LlmResult};

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    request_config: RequestConfig,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: &ModelConfig, request_config: RequestConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(LlmError::Http)?;

        let retry = RetryPolicy::from_config(&request_config);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            request_config,
            retry,
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Call `generateContent`, backing off while the provider is overloaded
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> LlmResult<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let url = url.as_str();
        self.retry
            .run("generate_content", move || async move {
                let start = Instant::now();
                match self.execute_request(url, request).await {
                    Ok(response) => {
                        info!(
                            model = %self.model,
                            latency_ms = start.elapsed().as_millis() as u64,
                            "Model call succeeded"
                        );
                        Ok(response)
                    }
                    Err(e) => {
                        error!(
                            model = %self.model,
                            error = %e,
                            latency_ms = start.elapsed().as_millis() as u64,
                            "Model call failed"
                        );
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> LlmResult<GenerateContentResponse> {
        debug!(model = %self.model, "Calling model");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: ApiErrorBody::message_from(&error_body),
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> LlmResult<String> {
        let request = GenerateContentRequest::new(prompt)
            .with_json_output()
            .with_temperature(temperature);

        let response = self.generate_content(&request).await?;

        response.text().ok_or_else(|| LlmError::InvalidResponse {
            message: "Response contained no candidates".to_string(),
        })
    }
}
