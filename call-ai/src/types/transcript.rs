//! Types for transcription operations.

use serde::{Deserialize, Serialize};

/// Continuous speech segment from a single diarized speaker.
///
/// Speaker indices are dense and zero-based regardless of how the vendor
/// labels speakers (letters, channel numbers); index 0 is always the first
/// speaker heard. Timestamps are seconds from the start of the media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker_index: i32,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
    pub confidence: Option<f64>,
}

/// Parameters for obtaining a transcript.
///
/// Diarization is always requested; `speakers_expected` is an optional hint
/// some vendors use to stabilize diarization on known attendee counts.
#[derive(Debug, Clone)]
pub struct Request {
    pub media_url: String,
    pub language_code: Option<String>,
    pub speakers_expected: Option<u32>,
}

impl Request {
    pub fn new(media_url: impl Into<String>) -> Self {
        Request {
            media_url: media_url.into(),
            language_code: None,
            speakers_expected: None,
        }
    }
}

/// Normalized diarized transcript returned by every provider adapter.
///
/// Utterances keep the vendor's ordering (sorted by start time). `text` is
/// the vendor-rendered full text when the vendor supplies one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub utterances: Vec<Utterance>,
    pub text: Option<String>,
    pub language_code: Option<String>,
}

impl Transcript {
    /// Number of distinct speaker indices present.
    pub fn speaker_count(&self) -> usize {
        let mut seen: Vec<i32> = Vec::new();
        for utterance in &self.utterances {
            if !seen.contains(&utterance.speaker_index) {
                seen.push(utterance.speaker_index);
            }
        }
        seen.len()
    }

    /// Whitespace-delimited word count across all utterances.
    pub fn word_count(&self) -> usize {
        self.utterances
            .iter()
            .map(|u| u.text.split_whitespace().count())
            .sum()
    }

    /// Span from the first utterance start to the last utterance end.
    /// None when there are no utterances.
    pub fn duration_seconds(&self) -> Option<f64> {
        let first = self.utterances.first()?;
        let last = self.utterances.last()?;
        Some(last.end_seconds - first.start_seconds)
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}

/// Assigns dense zero-based indices to raw vendor speaker labels in order of
/// first appearance. Adapters feed labels through one indexer per job so the
/// same label always maps to the same index within a transcript.
#[derive(Debug, Default)]
pub struct SpeakerIndexer {
    labels: Vec<String>,
}

impl SpeakerIndexer {
    pub fn new() -> Self {
        SpeakerIndexer { labels: Vec::new() }
    }

    pub fn index_for(&mut self, label: &str) -> i32 {
        if let Some(position) = self.labels.iter().position(|known| known == label) {
            return position as i32;
        }
        self.labels.push(label.to_string());
        (self.labels.len() - 1) as i32
    }
}
