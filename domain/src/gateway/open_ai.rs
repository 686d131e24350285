//! OpenAI API client for chat completions.
//!
//! The analysis layer hands this client a fully rendered prompt and expects
//! the raw completion text back. Prompt construction and response parsing
//! both live with the caller, which keeps this adapter swappable for any
//! API with the same chat-completions shape.

use async_trait::async_trait;
use call_ai::traits::completion;
use call_ai::Error;
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// OpenAI API client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given API key, base URL and model
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", api_key);
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&auth_value).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error::Configuration("Invalid API key format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                warn!("Failed to build OpenAI HTTP client: {:?}", e);
                Error::Configuration("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl completion::Provider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, Error> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            // Low temperature keeps the JSON responses parseable.
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call OpenAI: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse OpenAI response: {:?}", e);
                Error::Deserialization("Invalid response from OpenAI".to_string())
            })?;
            completion
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| {
                    Error::Provider("Completion response contained no choices".to_string())
                })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    fn provider_id(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::completion::Provider;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn complete_returns_first_choice_content() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test_key")
            .match_body(Matcher::Json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "Summarize this call."}],
                "temperature": 0.2
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "choices": [
                        {"message": {"role": "assistant", "content": "A short summary."}},
                        {"message": {"role": "assistant", "content": "ignored"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new("test_key", &server.url(), "gpt-4o-mini").unwrap();
        let content = client.complete("Summarize this call.").await.unwrap();

        assert_eq!(content, "A short summary.");
    }

    #[tokio::test]
    async fn complete_with_no_choices_is_a_provider_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new("test_key", &server.url(), "gpt-4o-mini").unwrap();
        let result = client.complete("prompt").await;

        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[tokio::test]
    async fn complete_maps_api_rejection_to_provider_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new("test_key", &server.url(), "gpt-4o-mini").unwrap();
        let result = client.complete("prompt").await;

        assert!(matches!(result, Err(Error::Provider(_))));
    }
}
