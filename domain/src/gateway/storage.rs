//! Media storage service client.
//!
//! Thin client for the internal storage service that fronts the durable
//! object store. The pipeline uses it to mint short-lived signed GET URLs
//! for recording media that another service already uploaded.

use async_trait::async_trait;
use call_ai::traits::storage;
use call_ai::Error;
use log::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The key travels in the body rather than the path so that slashes in
/// object keys need no escaping.
#[derive(Debug, Serialize)]
pub struct SignedUrlRequest {
    pub key: String,
    pub expires_in_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct SignedUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreObjectResponse {
    pub key: String,
}

/// Storage service client
pub struct StorageClient {
    client: reqwest::Client,
    base_url: String,
}

impl StorageClient {
    /// Create a new storage client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
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
                warn!("Failed to build storage HTTP client: {:?}", e);
                Error::Configuration("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl storage::Provider for StorageClient {
    async fn signed_get_url(&self, key: &str, expires_in: Duration) -> Result<String, Error> {
        let request = SignedUrlRequest {
            key: key.to_string(),
            expires_in_seconds: expires_in.as_secs(),
        };

        let response = self
            .client
            .post(format!("{}/signed-urls", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call storage service: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let signed: SignedUrlResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse signed URL response: {:?}", e);
                Error::Deserialization("Invalid response from storage service".to_string())
            })?;
            debug!("Minted signed URL for key: {}", key);
            Ok(signed.url)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Storage service API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    async fn store_object(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, Error> {
        let response = self
            .client
            .post(format!("{}/objects", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call storage service: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let stored: StoreObjectResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse store object response: {:?}", e);
                Error::Deserialization("Invalid response from storage service".to_string())
            })?;
            Ok(stored.key)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Storage service API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    fn provider_id(&self) -> &str {
        "media_service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::storage::Provider;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn signed_get_url_sends_key_and_ttl_in_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/signed-urls")
            .match_header("authorization", "Bearer test_key")
            .match_body(Matcher::Json(serde_json::json!({
                "key": "recordings/2025/rec_42.mp4",
                "expires_in_seconds": 7200
            })))
            .with_status(200)
            .with_body(r#"{"url": "https://cdn.example.com/rec_42.mp4?sig=abc"}"#)
            .create_async()
            .await;

        let client = StorageClient::new("test_key", &server.url()).unwrap();
        let url = client
            .signed_get_url("recordings/2025/rec_42.mp4", Duration::from_secs(7200))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/rec_42.mp4?sig=abc");
    }

    #[tokio::test]
    async fn signed_get_url_maps_rejection_to_provider_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/signed-urls")
            .with_status(403)
            .with_body(r#"{"message": "key not found"}"#)
            .create_async()
            .await;

        let client = StorageClient::new("test_key", &server.url()).unwrap();
        let result = client
            .signed_get_url("missing-key", Duration::from_secs(60))
            .await;

        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[tokio::test]
    async fn store_object_returns_assigned_key() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/objects")
            .match_header("content-type", "audio/mpeg")
            .with_status(201)
            .with_body(r#"{"key": "objects/9f/audio.mp3"}"#)
            .create_async()
            .await;

        let client = StorageClient::new("test_key", &server.url()).unwrap();
        let key = client
            .store_object(vec![1, 2, 3], "audio/mpeg")
            .await
            .unwrap();

        assert_eq!(key, "objects/9f/audio.mp3");
    }
}
