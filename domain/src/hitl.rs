//! Human-in-the-loop gating for low-confidence speaker attribution.

use entity::attendees::Attendee;
use entity::hitl::{HitlData, HITL_TYPE_SPEAKER_CONFIRMATION};
use entity::speakers::{IdentificationMethod, SpeakerInfo};

/// Speakers matched below this confidence need human confirmation.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// A request for human review, persisted on the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct HitlFlag {
    pub hitl_type: &'static str,
    pub data: HitlData,
}

/// Decide whether speaker attribution needs human confirmation.
///
/// Flags when at least one speaker is unknown or below the confidence
/// threshold, provided there is at least one attendee a reviewer could
/// assign. With an empty attendee list there is nothing to choose between,
/// so no flag is raised no matter how weak the attribution.
pub fn evaluate(speakers: &[SpeakerInfo], attendees: &[Attendee]) -> Option<HitlFlag> {
    if attendees.is_empty() {
        return None;
    }

    let unresolved: Vec<SpeakerInfo> = speakers
        .iter()
        .filter(|speaker| {
            speaker.identification_method == IdentificationMethod::Unknown
                || speaker.confidence < CONFIDENCE_THRESHOLD
        })
        .cloned()
        .collect();

    if unresolved.is_empty() {
        return None;
    }

    Some(HitlFlag {
        hitl_type: HITL_TYPE_SPEAKER_CONFIRMATION,
        data: HitlData {
            unresolved_speakers: unresolved,
            candidates: attendees.to_vec(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker(index: i32, method: IdentificationMethod, confidence: f64) -> SpeakerInfo {
        SpeakerInfo {
            speaker_index: index,
            email: Some(format!("speaker{index}@example.com")),
            name: None,
            is_internal: false,
            identification_method: method,
            confidence,
            talk_time_seconds: 10.0,
            talk_time_percent: 50.0,
        }
    }

    fn attendee(email: &str) -> Attendee {
        Attendee {
            email: email.to_string(),
            name: None,
            is_organizer: None,
        }
    }

    #[test]
    fn low_confidence_alone_raises_the_flag() {
        let speakers = vec![
            speaker(0, IdentificationMethod::EmailMatch, 0.69),
            speaker(1, IdentificationMethod::EmailMatch, 0.71),
        ];
        let attendees = vec![attendee("a@x.com"), attendee("b@x.com")];

        let flag = evaluate(&speakers, &attendees).unwrap();

        assert_eq!(flag.hitl_type, "speaker_confirmation");
        assert_eq!(flag.data.unresolved_speakers.len(), 1);
        assert_eq!(flag.data.unresolved_speakers[0].speaker_index, 0);
        assert_eq!(flag.data.candidates.len(), 2);
    }

    #[test]
    fn unknown_speakers_raise_the_flag_regardless_of_confidence() {
        let speakers = vec![speaker(0, IdentificationMethod::Unknown, 1.0)];
        let attendees = vec![attendee("a@x.com")];

        assert!(evaluate(&speakers, &attendees).is_some());
    }

    #[test]
    fn confident_matches_do_not_raise_the_flag() {
        let speakers = vec![
            speaker(0, IdentificationMethod::Manual, 1.0),
            speaker(1, IdentificationMethod::EmailMatch, 0.7),
        ];
        let attendees = vec![attendee("a@x.com")];

        assert!(evaluate(&speakers, &attendees).is_none());
    }

    #[test]
    fn no_attendees_means_no_flag() {
        let speakers = vec![speaker(0, IdentificationMethod::Unknown, 0.0)];

        assert!(evaluate(&speakers, &[]).is_none());
    }

    #[test]
    fn no_speakers_means_no_flag() {
        let attendees = vec![attendee("a@x.com")];

        assert!(evaluate(&[], &attendees).is_none());
    }
}
