use crate::api::{CompletionRequest, CompletionResponse};
use crate::client::Client;
use crate::completion::CompletionService;
use crate::traffic_log;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use super::api::{ChatCompletionRequest, ChatCompletionResponse};

const API_VERSION: &str = "v1";

#[derive(Clone, Debug)]
pub struct OpenAICompletionService {
    client: Client,
    base_url: String,
}

impl OpenAICompletionService {
    pub fn default(api_key: &str) -> anyhow::Result<Self> {
        Self::new("https://api.openai.com", api_key)
    }

    /// Create a service with a custom base URL (e.g., for proxying).
    /// The API version path (/v1) is automatically appended.
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))?,
        );

        let base_url = base_url.trim_end_matches('/');
        Ok(OpenAICompletionService {
            client: Client::with_headers(headers)?,
            base_url: format!("{}/{}", base_url, API_VERSION),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionService for OpenAICompletionService {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        let openai_request = ChatCompletionRequest::from_request(request)?;
        traffic_log::log_request(&request.model, &openai_request);

        let response: ChatCompletionResponse =
            match self.client.post(self.chat_url(), &openai_request).await {
                Ok(response) => response,
                Err(err) => {
                    traffic_log::log_error(&request.model, &err);
                    return Err(err);
                }
            };
        traffic_log::log_response(&request.model, &response);

        Ok(response.into())
    }
}
