//! Types for recording media retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A downloadable media location for a finished recording.
///
/// URLs from capture agents are pre-signed and short-lived; trigger
/// transcription promptly. `expires_at` is populated when the vendor
/// reports an expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMedia {
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RecordingMedia {
    pub fn new(url: impl Into<String>) -> Self {
        RecordingMedia {
            url: url.into(),
            expires_at: None,
        }
    }
}
