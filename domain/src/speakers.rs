//! Speaker identification: ties diarized speaker indices to real attendees
//! and computes per-speaker talk time.
//!
//! Pure over its inputs and never fails; with nobody on the calendar every
//! speaker simply stays unknown. Matching is positional: the i-th distinct
//! speaker index (ascending) is paired with the i-th calendar attendee.
//! Diarization order and calendar order correlate only loosely, which is
//! why positional matches carry a fixed mid-scale confidence and flow into
//! human review downstream.

use call_ai::Utterance;
use entity::attendees::Attendee;
use entity::speakers::{IdentificationMethod, SpeakerInfo};

/// Confidence assigned to positional attendee matches.
pub const POSITIONAL_MATCH_CONFIDENCE: f64 = 0.5;

fn is_internal_email(email: &str, internal_domain: Option<&str>) -> bool {
    match (email.rsplit_once('@'), internal_domain) {
        (Some((_, domain)), Some(internal)) => domain.eq_ignore_ascii_case(internal),
        _ => false,
    }
}

/// Attribute each diarized speaker index to an attendee and compute talk
/// time. Output is ordered by ascending speaker index; percentages are of
/// total talk time across all speakers.
///
/// Returns an empty list when total talk time is zero, since percentages
/// would be meaningless.
pub fn identify(
    utterances: &[Utterance],
    attendees: &[Attendee],
    internal_domain: Option<&str>,
) -> Vec<SpeakerInfo> {
    let mut talk_time: Vec<(i32, f64)> = Vec::new();
    for utterance in utterances {
        let span = (utterance.end_seconds - utterance.start_seconds).max(0.0);
        match talk_time
            .iter_mut()
            .find(|(index, _)| *index == utterance.speaker_index)
        {
            Some((_, seconds)) => *seconds += span,
            None => talk_time.push((utterance.speaker_index, span)),
        }
    }
    talk_time.sort_by_key(|(index, _)| *index);

    let total: f64 = talk_time.iter().map(|(_, seconds)| seconds).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    talk_time
        .into_iter()
        .enumerate()
        .map(|(position, (speaker_index, seconds))| match attendees.get(position) {
            Some(attendee) => SpeakerInfo {
                speaker_index,
                email: Some(attendee.email.clone()),
                name: attendee.name.clone(),
                is_internal: is_internal_email(&attendee.email, internal_domain),
                identification_method: IdentificationMethod::EmailMatch,
                confidence: POSITIONAL_MATCH_CONFIDENCE,
                talk_time_seconds: seconds,
                talk_time_percent: seconds / total * 100.0,
            },
            None => SpeakerInfo {
                speaker_index,
                email: None,
                name: None,
                is_internal: false,
                identification_method: IdentificationMethod::Unknown,
                confidence: 0.0,
                talk_time_seconds: seconds,
                talk_time_percent: seconds / total * 100.0,
            },
        })
        .collect()
}

/// Display label for a speaker index: matched name, then email, then a
/// generic placeholder.
pub fn speaker_label(speakers: &[SpeakerInfo], speaker_index: i32) -> String {
    speakers
        .iter()
        .find(|speaker| speaker.speaker_index == speaker_index)
        .and_then(|speaker| speaker.name.clone().or_else(|| speaker.email.clone()))
        .unwrap_or_else(|| format!("Speaker {speaker_index}"))
}
