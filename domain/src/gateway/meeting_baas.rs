//! MeetingBaaS API client for retrieving finished meeting recordings.
//!
//! This module provides an HTTP client for the MeetingBaaS capture-agent API.
//! Deploying and stopping bots is owned by the capture collaborator; this
//! client only reads the artifacts of bots that have already left their
//! meetings.

use async_trait::async_trait;
use call_ai::traits::capture;
use call_ai::types::media::RecordingMedia;
use call_ai::Error;
use chrono::{DateTime, Utc};
use log::*;
use serde::Deserialize;

/// Recording payload returned by the bot recording endpoint
#[derive(Debug, Deserialize)]
pub struct RecordingResponse {
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// MeetingBaaS API client
pub struct MeetingBaasClient {
    client: reqwest::Client,
    base_url: String,
}

impl MeetingBaasClient {
    /// Create a new MeetingBaaS client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value = reqwest::header::HeaderValue::from_str(api_key).map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            Error::Configuration("Invalid API key format".to_string())
        })?;
        header_value.set_sensitive(true);
        headers.insert("x-meeting-baas-api-key", header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                warn!("Failed to build MeetingBaaS HTTP client: {:?}", e);
                Error::Configuration("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl capture::Provider for MeetingBaasClient {
    async fn get_recording(&self, bot_id: &str) -> Result<RecordingMedia, Error> {
        let url = format!("{}/bots/{}/recording", self.base_url, bot_id);

        debug!("Fetching MeetingBaaS recording for bot: {bot_id}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to fetch MeetingBaaS recording: {:?}", e);
            Error::Network(e.to_string())
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("No recording for bot {bot_id}")));
        }

        if response.status().is_success() {
            let recording: RecordingResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse MeetingBaaS recording response: {:?}", e);
                Error::Deserialization("Invalid response from MeetingBaaS".to_string())
            })?;

            // Audio preferred over video: a smaller download for the transcriber.
            let media_url = recording.audio_url.or(recording.video_url).ok_or_else(|| {
                Error::NotFound(format!("Recording for bot {bot_id} carries no media URL"))
            })?;

            info!("Resolved MeetingBaaS recording for bot: {bot_id}");
            Ok(RecordingMedia {
                url: media_url,
                expires_at: recording.expires_at,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("MeetingBaaS API error: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    async fn get_bot_status(&self, bot_id: &str) -> Result<serde_json::Value, Error> {
        let url = format!("{}/bots/{}", self.base_url, bot_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to fetch MeetingBaaS bot status: {:?}", e);
            Error::Network(e.to_string())
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("No bot with id {bot_id}")));
        }

        if response.status().is_success() {
            response.json().await.map_err(|e| {
                warn!("Failed to parse MeetingBaaS status response: {:?}", e);
                Error::Deserialization("Invalid response from MeetingBaaS".to_string())
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("MeetingBaaS API error: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    fn provider_id(&self) -> &str {
        "meeting_baas"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::capture::Provider;
    use mockito::Server;

    #[tokio::test]
    async fn get_recording_prefers_audio_over_video() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bots/bot_123/recording")
            .match_header("x-meeting-baas-api-key", "test_key")
            .with_status(200)
            .with_body(
                r#"{
                    "audio_url": "https://media.example.com/bot_123.mp3",
                    "video_url": "https://media.example.com/bot_123.mp4",
                    "expires_at": "2025-06-01T12:00:00Z"
                }"#,
            )
            .create_async()
            .await;

        let client = MeetingBaasClient::new("test_key", &server.url()).unwrap();
        let media = client.get_recording("bot_123").await.unwrap();

        assert_eq!(media.url, "https://media.example.com/bot_123.mp3");
        assert!(media.expires_at.is_some());
    }

    #[tokio::test]
    async fn get_recording_falls_back_to_video_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bots/bot_456/recording")
            .with_status(200)
            .with_body(r#"{"video_url": "https://media.example.com/bot_456.mp4"}"#)
            .create_async()
            .await;

        let client = MeetingBaasClient::new("test_key", &server.url()).unwrap();
        let media = client.get_recording("bot_456").await.unwrap();

        assert_eq!(media.url, "https://media.example.com/bot_456.mp4");
        assert_eq!(media.expires_at, None);
    }

    #[tokio::test]
    async fn get_recording_maps_missing_bot_to_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bots/bot_missing/recording")
            .with_status(404)
            .with_body(r#"{"error": "bot not found"}"#)
            .create_async()
            .await;

        let client = MeetingBaasClient::new("test_key", &server.url()).unwrap();
        let result = client.get_recording("bot_missing").await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn get_recording_with_no_urls_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bots/bot_789/recording")
            .with_status(200)
            .with_body(r#"{"expires_at": null}"#)
            .create_async()
            .await;

        let client = MeetingBaasClient::new("test_key", &server.url()).unwrap();
        let result = client.get_recording("bot_789").await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn get_bot_status_returns_raw_payload() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bots/bot_123")
            .with_status(200)
            .with_body(r#"{"status": "done", "assets": {"video_url": "https://v"}}"#)
            .create_async()
            .await;

        let client = MeetingBaasClient::new("test_key", &server.url()).unwrap();
        let status = client.get_bot_status("bot_123").await.unwrap();

        assert_eq!(status["status"], "done");
        assert_eq!(status["assets"]["video_url"], "https://v");
    }
}
