//! AssemblyAI API client for transcription.
//!
//! This module provides an HTTP client for the AssemblyAI API, driving its
//! asynchronous job model (submit, then poll) behind the synchronous
//! `transcribe` contract. Speaker diarization is always requested; the
//! vendor's letter labels ("A", "B", ...) and millisecond timestamps are
//! normalized before a transcript is returned.

use async_trait::async_trait;
use call_ai::traits::transcription;
use call_ai::types::transcript::{Request, SpeakerIndexer, Transcript};
use call_ai::Error;
use log::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request to create a new transcription job
#[derive(Debug, Serialize)]
pub struct CreateTranscriptRequest {
    pub audio_url: String,
    pub speaker_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speakers_expected: Option<u32>,
}

/// Response from creating or polling a transcription job
#[derive(Debug, Deserialize)]
pub struct TranscriptResponse {
    pub id: String,
    pub status: TranscriptStatus,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub utterances: Option<Vec<Utterance>>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transcription job status
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Utterance (speaker segment) with millisecond timing, as the vendor returns it
#[derive(Debug, Deserialize, Clone)]
pub struct Utterance {
    pub text: String,
    pub start: i64,
    pub end: i64,
    pub confidence: f64,
    pub speaker: String,
}

/// AssemblyAI API client
pub struct AssemblyAiTranscriber {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl AssemblyAiTranscriber {
    /// Create a new AssemblyAI client with the given API key and base URL.
    /// `poll_interval` and `max_poll_attempts` bound how long a submitted job
    /// is polled before the attempt fails with `Error::Timeout`.
    pub fn new(
        api_key: &str,
        base_url: &str,
        poll_interval: Duration,
        max_poll_attempts: u32,
    ) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value = reqwest::header::HeaderValue::from_str(api_key).map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            Error::Configuration("Invalid API key format".to_string())
        })?;
        header_value.set_sensitive(true);
        headers.insert("authorization", header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                warn!("Failed to build AssemblyAI HTTP client: {:?}", e);
                Error::Configuration("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            poll_interval,
            max_poll_attempts,
        })
    }

    /// Submit a new transcription job
    pub async fn create_transcript(
        &self,
        request: CreateTranscriptRequest,
    ) -> Result<TranscriptResponse, Error> {
        let url = format!("{}/transcript", self.base_url);

        debug!(
            "Creating AssemblyAI transcript for audio: {}",
            request.audio_url
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to create AssemblyAI transcript: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let transcript: TranscriptResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse AssemblyAI response: {:?}", e);
                Error::Deserialization("Invalid response from AssemblyAI".to_string())
            })?;
            info!("Created AssemblyAI transcript with ID: {}", transcript.id);
            Ok(transcript)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("AssemblyAI API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    /// Get the current state of a transcription job
    pub async fn get_transcript(&self, transcript_id: &str) -> Result<TranscriptResponse, Error> {
        let url = format!("{}/transcript/{}", self.base_url, transcript_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to get AssemblyAI transcript: {:?}", e);
            Error::Network(e.to_string())
        })?;

        if response.status().is_success() {
            response.json().await.map_err(|e| {
                warn!("Failed to parse AssemblyAI response: {:?}", e);
                Error::Deserialization("Invalid response from AssemblyAI".to_string())
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("AssemblyAI API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }
}

/// Collapse vendor letter labels into dense zero-based indices and
/// millisecond timestamps into seconds.
fn normalize(response: TranscriptResponse) -> Transcript {
    let mut indexer = SpeakerIndexer::new();
    let utterances = response
        .utterances
        .unwrap_or_default()
        .into_iter()
        .map(|u| call_ai::Utterance {
            speaker_index: indexer.index_for(&u.speaker),
            start_seconds: u.start as f64 / 1000.0,
            end_seconds: u.end as f64 / 1000.0,
            text: u.text,
            confidence: Some(u.confidence),
        })
        .collect();

    Transcript {
        utterances,
        text: response.text.filter(|t| !t.is_empty()),
        language_code: response.language_code,
    }
}

#[async_trait]
impl transcription::Provider for AssemblyAiTranscriber {
    async fn transcribe(&self, request: Request) -> Result<Transcript, Error> {
        let job = self
            .create_transcript(CreateTranscriptRequest {
                audio_url: request.media_url.clone(),
                speaker_labels: true,
                language_code: request.language_code.clone(),
                speakers_expected: request.speakers_expected,
            })
            .await?;

        for attempt in 1..=self.max_poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            // Poll errors only consume the time budget. A transient API
            // hiccup must not fail a job that is still running.
            let polled = match self.get_transcript(&job.id).await {
                Ok(polled) => polled,
                Err(e) => {
                    debug!(
                        "Poll attempt {attempt} for AssemblyAI transcript {} failed: {e}",
                        job.id
                    );
                    continue;
                }
            };

            match polled.status {
                TranscriptStatus::Completed => {
                    info!(
                        "AssemblyAI transcript {} completed after {attempt} poll(s)",
                        job.id
                    );
                    return Ok(normalize(polled));
                }
                TranscriptStatus::Error => {
                    let message = polled
                        .error
                        .unwrap_or_else(|| "transcription failed".to_string());
                    warn!("AssemblyAI transcript {} failed: {message}", job.id);
                    return Err(Error::Provider(message));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {}
            }
        }

        Err(Error::Timeout(format!(
            "AssemblyAI transcript {} not completed after {} polls",
            job.id, self.max_poll_attempts
        )))
    }

    fn provider_id(&self) -> &str {
        "assemblyai"
    }
}
