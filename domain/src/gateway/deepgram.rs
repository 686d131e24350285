//! Deepgram API client for transcription.
//!
//! Fallback transcriber. Deepgram's pre-recorded endpoint is synchronous:
//! one POST with the hosted media URL returns the finished transcript, so
//! there is no job polling here. Speakers arrive as numeric ids and are
//! normalized to dense zero-based indices like every other adapter.

use async_trait::async_trait;
use call_ai::traits::transcription;
use call_ai::types::transcript::{Request, SpeakerIndexer, Transcript};
use call_ai::Error;
use log::*;
use serde::{Deserialize, Serialize};

/// Request body for the pre-recorded listen endpoint
#[derive(Debug, Serialize)]
pub struct ListenRequest {
    pub url: String,
}

/// Response from the listen endpoint
#[derive(Debug, Deserialize)]
pub struct ListenResponse {
    pub results: ListenResults,
}

#[derive(Debug, Deserialize)]
pub struct ListenResults {
    #[serde(default)]
    pub utterances: Option<Vec<Utterance>>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Utterance with second-based timing, as the vendor returns it.
/// `speaker` is set when diarization ran; `channel` when the audio was
/// multichannel. Either can serve as the raw speaker label.
#[derive(Debug, Deserialize)]
pub struct Utterance {
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
    pub transcript: String,
    #[serde(default)]
    pub speaker: Option<i64>,
    #[serde(default)]
    pub channel: Option<i64>,
}

/// Deepgram API client
pub struct DeepgramTranscriber {
    client: reqwest::Client,
    base_url: String,
}

impl DeepgramTranscriber {
    /// Create a new Deepgram client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Token {}", api_key);
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
                warn!("Failed to build Deepgram HTTP client: {:?}", e);
                Error::Configuration("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

/// Assign dense indices from the raw numeric labels and pull the rendered
/// text out of the first channel alternative.
fn normalize(response: ListenResponse) -> Transcript {
    let mut indexer = SpeakerIndexer::new();
    let utterances = response
        .results
        .utterances
        .unwrap_or_default()
        .into_iter()
        .map(|u| {
            let label = u.speaker.or(u.channel).unwrap_or(0).to_string();
            call_ai::Utterance {
                speaker_index: indexer.index_for(&label),
                start_seconds: u.start,
                end_seconds: u.end,
                text: u.transcript,
                confidence: Some(u.confidence),
            }
        })
        .collect();

    let text = response
        .results
        .channels
        .first()
        .and_then(|channel| channel.alternatives.first())
        .and_then(|alternative| alternative.transcript.clone())
        .filter(|t| !t.is_empty());
    let language_code = response
        .results
        .channels
        .first()
        .and_then(|channel| channel.detected_language.clone());

    Transcript {
        utterances,
        text,
        language_code,
    }
}

#[async_trait]
impl transcription::Provider for DeepgramTranscriber {
    async fn transcribe(&self, request: Request) -> Result<Transcript, Error> {
        let mut url = format!(
            "{}/listen?punctuate=true&diarize=true&utterances=true",
            self.base_url
        );
        if let Some(language) = &request.language_code {
            url.push_str(&format!("&language={language}"));
        }

        debug!("Submitting Deepgram transcription for: {}", request.media_url);

        let response = self
            .client
            .post(&url)
            .json(&ListenRequest {
                url: request.media_url.clone(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call Deepgram: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let listen: ListenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Deepgram response: {:?}", e);
                Error::Deserialization("Invalid response from Deepgram".to_string())
            })?;
            let transcript = normalize(listen);
            info!(
                "Deepgram returned {} utterance(s) across {} speaker(s)",
                transcript.utterances.len(),
                transcript.speaker_count()
            );
            Ok(transcript)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Deepgram API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    fn provider_id(&self) -> &str {
        "deepgram"
    }
}
