//! Resolution of a playable media URL for a recording.
//!
//! Tiers are attempted strictly in order and the first hit wins:
//!
//! 1. signed GET URL minted from the recording's durable storage key
//! 2. URL supplied by the triggering event
//! 3. the capture agent's finished-recording endpoint
//! 4. URL sniffed out of the capture agent's raw bot status payload
//!
//! A tier whose collaborator is not configured is skipped. Only when every
//! tier comes up empty does resolution fail.

use crate::error::{DomainErrorKind, Error, PipelineErrorKind};
use call_ai::traits::{capture, storage};
use entity::recordings;
use log::*;
use std::sync::Arc;
use std::time::Duration;

/// TTL for signed URLs, matching the storage collaborator's signing ceiling.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Which tier produced the URL. `BotStatus` carries the name of the
/// extraction rule that matched, for the resolution log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Storage,
    Override,
    CaptureRecording,
    BotStatus(&'static str),
}

#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub url: String,
    pub source: MediaSource,
}

/// One named rule for digging a media URL out of a bot status payload.
/// Each location is a path of object keys from the payload root.
struct ExtractionRule {
    name: &'static str,
    locations: &'static [&'static [&'static str]],
}

/// Ordered by media preference. Vendors have shipped the same URL under
/// several field layouts across API versions, so each rule checks every
/// layout seen in the wild.
const EXTRACTION_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "video",
        locations: &[
            &["video_url"],
            &["video", "url"],
            &["assets", "video_url"],
        ],
    },
    ExtractionRule {
        name: "audio",
        locations: &[
            &["audio_url"],
            &["audio", "url"],
            &["assets", "audio_url"],
        ],
    },
    ExtractionRule {
        name: "recording",
        locations: &[&["recording_url"], &["recording", "url"]],
    },
    ExtractionRule {
        name: "output",
        locations: &[&["output_url"], &["output", "url"]],
    },
];

fn lookup<'a>(payload: &'a serde_json::Value, path: &[&str]) -> Option<&'a serde_json::Value> {
    let mut current = payload;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Apply the extraction rules in order and return the first non-empty
/// string URL along with the name of the rule that matched.
pub fn extract_media_url(payload: &serde_json::Value) -> Option<(String, &'static str)> {
    for rule in EXTRACTION_RULES {
        for location in rule.locations {
            if let Some(value) = lookup(payload, location) {
                if let Some(url) = value.as_str() {
                    if !url.is_empty() {
                        return Some((url.to_string(), rule.name));
                    }
                }
            }
        }
    }
    None
}

/// Resolves a playable media URL for a recording, trying each tier in order.
pub struct MediaResolver {
    storage: Option<Arc<dyn storage::Provider>>,
    capture: Option<Arc<dyn capture::Provider>>,
}

impl MediaResolver {
    pub fn new(
        storage: Option<Arc<dyn storage::Provider>>,
        capture: Option<Arc<dyn capture::Provider>>,
    ) -> Self {
        MediaResolver { storage, capture }
    }

    /// Resolve a media URL for `recording`, preferring durable storage, then
    /// the caller-supplied override, then the capture agent.
    ///
    /// A signing failure is logged and resolution falls through to the next
    /// tier; the stored object may still be reachable via the capture agent.
    pub async fn resolve(
        &self,
        recording: &recordings::Model,
        override_url: Option<&str>,
    ) -> Result<ResolvedMedia, Error> {
        if let (Some(storage), Some(key)) = (&self.storage, &recording.storage_key) {
            match storage.signed_get_url(key, SIGNED_URL_TTL).await {
                Ok(url) => {
                    debug!("Resolved media from storage key: {}", key);
                    return Ok(ResolvedMedia {
                        url,
                        source: MediaSource::Storage,
                    });
                }
                Err(e) => {
                    warn!("Failed to sign storage key {key}: {e}");
                }
            }
        }

        if let Some(url) = override_url.filter(|url| !url.is_empty()) {
            debug!("Resolved media from caller-supplied URL");
            return Ok(ResolvedMedia {
                url: url.to_string(),
                source: MediaSource::Override,
            });
        }

        if let (Some(capture), Some(bot_id)) = (&self.capture, &recording.bot_id) {
            match capture.get_recording(bot_id).await {
                Ok(media) => {
                    debug!("Resolved media from capture agent for bot: {}", bot_id);
                    return Ok(ResolvedMedia {
                        url: media.url,
                        source: MediaSource::CaptureRecording,
                    });
                }
                Err(e) => {
                    debug!("Capture agent has no recording for bot {bot_id}: {e}");
                }
            }

            match capture.get_bot_status(bot_id).await {
                Ok(payload) => {
                    if let Some((url, rule)) = extract_media_url(&payload) {
                        info!("Resolved media from bot status ({rule}) for bot: {bot_id}");
                        return Ok(ResolvedMedia {
                            url,
                            source: MediaSource::BotStatus(rule),
                        });
                    }
                }
                Err(e) => {
                    debug!("Failed to fetch bot status for bot {bot_id}: {e}");
                }
            }
        }

        warn!(
            "No media URL could be resolved for recording: {}",
            recording.id
        );
        Err(Error {
            source: None,
            error_kind: DomainErrorKind::Pipeline(PipelineErrorKind::NoMediaAvailable),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::capture::MockProvider as MockCapture;
    use call_ai::traits::storage::MockProvider as MockStorage;
    use call_ai::types::media::RecordingMedia;
    use serde_json::json;

    fn recording_with(storage_key: Option<&str>, bot_id: Option<&str>) -> recordings::Model {
        let now = chrono::Utc::now();
        recordings::Model {
            id: entity::Id::new_v4(),
            organization_id: entity::Id::new_v4(),
            user_id: entity::Id::new_v4(),
            bot_id: bot_id.map(String::from),
            meeting_id: None,
            contact_id: None,
            title: None,
            status: entity::recording_status::RecordingStatus::Queued,
            source_media_url: None,
            storage_key: storage_key.map(String::from),
            storage_url: None,
            attendees: None,
            transcript: None,
            transcript_text: None,
            language_code: None,
            duration_seconds: None,
            word_count: None,
            speaker_count: None,
            summary: None,
            highlights: None,
            action_items: None,
            sentiment_score: None,
            talk_time_rep_pct: None,
            talk_time_customer_pct: None,
            talk_time_judgement: None,
            coach_rating: None,
            coach_summary: None,
            speakers: None,
            hitl_required: false,
            hitl_type: None,
            hitl_data: None,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn storage_key_wins_over_every_other_tier() {
        let mut storage = MockStorage::new();
        storage
            .expect_signed_get_url()
            .withf(|key, expires_in| {
                key == "recordings/rec_1.mp4" && *expires_in == Duration::from_secs(7200)
            })
            .times(1)
            .returning(|_, _| Ok("https://cdn.example.com/rec_1?sig=a".to_string()));

        let mut capture = MockCapture::new();
        capture.expect_get_recording().times(0);
        capture.expect_get_bot_status().times(0);

        let resolver = MediaResolver::new(Some(Arc::new(storage)), Some(Arc::new(capture)));
        let resolved = resolver
            .resolve(
                &recording_with(Some("recordings/rec_1.mp4"), Some("bot_1")),
                Some("https://override.example.com/call.mp3"),
            )
            .await
            .unwrap();

        assert_eq!(resolved.url, "https://cdn.example.com/rec_1?sig=a");
        assert_eq!(resolved.source, MediaSource::Storage);
    }

    #[tokio::test]
    async fn signing_failure_falls_through_to_the_override() {
        let mut storage = MockStorage::new();
        storage
            .expect_signed_get_url()
            .times(1)
            .returning(|_, _| Err(call_ai::Error::Provider("signing outage".to_string())));

        let resolver = MediaResolver::new(Some(Arc::new(storage)), None);
        let resolved = resolver
            .resolve(
                &recording_with(Some("recordings/rec_1.mp4"), None),
                Some("https://override.example.com/call.mp3"),
            )
            .await
            .unwrap();

        assert_eq!(resolved.url, "https://override.example.com/call.mp3");
        assert_eq!(resolved.source, MediaSource::Override);
    }

    #[tokio::test]
    async fn capture_recording_beats_bot_status() {
        let mut capture = MockCapture::new();
        capture.expect_get_recording().times(1).returning(|_| {
            Ok(RecordingMedia {
                url: "https://vendor.example.com/audio.mp3".to_string(),
                expires_at: None,
            })
        });
        capture.expect_get_bot_status().times(0);

        let resolver = MediaResolver::new(None, Some(Arc::new(capture)));
        let resolved = resolver
            .resolve(&recording_with(None, Some("bot_1")), None)
            .await
            .unwrap();

        assert_eq!(resolved.source, MediaSource::CaptureRecording);
    }

    #[tokio::test]
    async fn bot_status_sniffing_reports_the_matched_rule() {
        let mut capture = MockCapture::new();
        capture
            .expect_get_recording()
            .times(1)
            .returning(|_| Err(call_ai::Error::NotFound("no recording".to_string())));
        capture.expect_get_bot_status().times(1).returning(|_| {
            Ok(json!({
                "status": "done",
                "assets": {"video_url": "https://vendor.example.com/video.mp4"}
            }))
        });

        let resolver = MediaResolver::new(None, Some(Arc::new(capture)));
        let resolved = resolver
            .resolve(&recording_with(None, Some("bot_1")), None)
            .await
            .unwrap();

        assert_eq!(resolved.url, "https://vendor.example.com/video.mp4");
        assert_eq!(resolved.source, MediaSource::BotStatus("video"));
    }

    #[tokio::test]
    async fn every_tier_exhausted_is_a_no_media_error() {
        let mut capture = MockCapture::new();
        capture
            .expect_get_recording()
            .times(1)
            .returning(|_| Err(call_ai::Error::NotFound("no recording".to_string())));
        capture
            .expect_get_bot_status()
            .times(1)
            .returning(|_| Ok(json!({"status": "done"})));

        let resolver = MediaResolver::new(None, Some(Arc::new(capture)));
        let result = resolver
            .resolve(&recording_with(None, Some("bot_1")), None)
            .await;

        let error = result.unwrap_err();
        assert!(matches!(
            error.error_kind,
            DomainErrorKind::Pipeline(PipelineErrorKind::NoMediaAvailable)
        ));
    }

    #[test]
    fn extraction_prefers_video_over_audio() {
        let payload = json!({
            "audio_url": "https://vendor.example.com/audio.mp3",
            "video": {"url": "https://vendor.example.com/video.mp4"}
        });

        let (url, rule) = extract_media_url(&payload).unwrap();
        assert_eq!(url, "https://vendor.example.com/video.mp4");
        assert_eq!(rule, "video");
    }

    #[test]
    fn extraction_skips_empty_strings_and_non_strings() {
        let payload = json!({
            "video_url": "",
            "audio": {"url": 42},
            "recording_url": "https://vendor.example.com/rec.mp4"
        });

        let (url, rule) = extract_media_url(&payload).unwrap();
        assert_eq!(url, "https://vendor.example.com/rec.mp4");
        assert_eq!(rule, "recording");
    }

    #[test]
    fn extraction_returns_none_for_payloads_without_media() {
        let payload = json!({"status": "in_call", "participants": 3});
        assert!(extract_media_url(&payload).is_none());
    }
}
