//! Call analysis: summary, highlights, action items, plus the optional
//! enrichment metrics (sentiment, talk-time split, coaching).
//!
//! The primary analysis never fails outward. The LLM path is attempted when
//! a completion provider is configured; any transport or parse problem falls
//! through to a deterministic fallback computed from the transcript alone.
//! Enrichment is a separate completion call and IS allowed to come back
//! empty: a failure there skips enrichment rather than degrading it.

use crate::speakers::speaker_label;
use call_ai::traits::completion;
use call_ai::Transcript;
use entity::action_items::{ActionItem, ActionItems};
use entity::attendees::Attendee;
use entity::highlights::{Highlight, HighlightKind, Highlights};
use entity::speakers::SpeakerInfo;
use entity::talk_time_judgement::TalkTimeJudgement;
use log::*;
use serde::Deserialize;
use std::sync::Arc;

/// Maximum highlights kept from a single analysis.
const MAX_HIGHLIGHTS: usize = 10;

/// Maximum question highlights produced by the deterministic fallback.
const MAX_FALLBACK_HIGHLIGHTS: usize = 5;

/// Primary analysis of a call. Always present on a ready recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub summary: String,
    pub highlights: Highlights,
    pub action_items: ActionItems,
}

/// Optional second-pass metrics. All fields stay unset when enrichment is
/// disabled, not credited, or fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub sentiment_score: Option<f64>,
    pub talk_time_rep_pct: Option<f64>,
    pub talk_time_customer_pct: Option<f64>,
    pub talk_time_judgement: Option<TalkTimeJudgement>,
    pub coach_rating: Option<i32>,
    pub coach_summary: Option<String>,
}

/// Classify how much of the call the rep side dominated.
pub fn judge_talk_time(rep_pct: f64) -> TalkTimeJudgement {
    if rep_pct < 40.0 {
        TalkTimeJudgement::Low
    } else if rep_pct <= 60.0 {
        TalkTimeJudgement::Good
    } else {
        TalkTimeJudgement::High
    }
}

/// Rep/customer talk-time split over identified speakers.
///
/// `None` when no speaker is internal: an all-customer split would be
/// indistinguishable from a call where the rep never joined, so no split or
/// judgement is recorded at all.
pub fn rep_talk_time_split(speakers: &[SpeakerInfo]) -> Option<(f64, f64)> {
    if !speakers.iter().any(|speaker| speaker.is_internal) {
        return None;
    }
    let rep: f64 = speakers
        .iter()
        .filter(|speaker| speaker.is_internal)
        .map(|speaker| speaker.talk_time_percent)
        .sum();
    let customer: f64 = speakers
        .iter()
        .filter(|speaker| !speaker.is_internal)
        .map(|speaker| speaker.talk_time_percent)
        .sum();
    Some((rep, customer))
}

fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as i64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Render the first `limit` utterances as `[M:SS] Name: text` lines.
fn render_excerpt(transcript: &Transcript, speakers: &[SpeakerInfo], limit: usize) -> String {
    transcript
        .utterances
        .iter()
        .take(limit)
        .map(|utterance| {
            format!(
                "[{}] {}: {}",
                format_timestamp(utterance.start_seconds),
                speaker_label(speakers, utterance.speaker_index),
                utterance.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Return the first balanced JSON object substring of `text`.
///
/// Models wrap JSON in markdown fences or prose more often than not. Brace
/// tracking is string- and escape-aware so braces inside JSON string values
/// do not unbalance the scan.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct LlmAnalysisResponse {
    summary: Option<String>,
    #[serde(default)]
    highlights: Vec<LlmHighlight>,
    #[serde(default)]
    action_items: Vec<LlmActionItem>,
}

#[derive(Debug, Deserialize)]
struct LlmHighlight {
    timestamp: Option<f64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlmActionItem {
    text: Option<String>,
    assignee: Option<String>,
    due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlmEnrichmentResponse {
    sentiment_score: Option<f64>,
    coach_rating: Option<i64>,
    coach_summary: Option<String>,
}

/// Parse a completion into an Analysis. Lenient everywhere except the
/// summary, which must be present and non-blank for the response to count.
fn parse_analysis_response(content: &str) -> Option<Analysis> {
    let json = extract_json_object(content)?;
    let response: LlmAnalysisResponse = serde_json::from_str(json).ok()?;

    let summary = response
        .summary
        .map(|summary| summary.trim().to_string())
        .filter(|summary| !summary.is_empty())?;

    let highlights = response
        .highlights
        .into_iter()
        .filter_map(|highlight| {
            let text = highlight.text.filter(|text| !text.trim().is_empty())?;
            Some(Highlight {
                timestamp_seconds: highlight.timestamp.unwrap_or(0.0).max(0.0),
                text,
                kind: HighlightKind::parse_lossy(highlight.kind.as_deref().unwrap_or("")),
            })
        })
        .take(MAX_HIGHLIGHTS)
        .collect();

    let action_items = response
        .action_items
        .into_iter()
        .filter_map(|item| {
            let text = item.text.filter(|text| !text.trim().is_empty())?;
            Some(ActionItem {
                text,
                assignee: item.assignee,
                due_date: item.due_date,
            })
        })
        .collect();

    Some(Analysis {
        summary,
        highlights: Highlights(highlights),
        action_items: ActionItems(action_items),
    })
}

/// Analysis computed from the transcript alone, with no model in the loop.
fn deterministic_analysis(transcript: &Transcript) -> Analysis {
    let minutes = (transcript.duration_seconds().unwrap_or(0.0) / 60.0).round() as i64;
    let summary = format!(
        "Call lasted approximately {} minutes with {} words spoken.",
        minutes,
        transcript.word_count()
    );

    let highlights = transcript
        .utterances
        .iter()
        .filter(|utterance| utterance.text.contains('?') && utterance.text.len() > 20)
        .take(MAX_FALLBACK_HIGHLIGHTS)
        .map(|utterance| Highlight {
            timestamp_seconds: utterance.start_seconds,
            text: utterance.text.clone(),
            kind: HighlightKind::Question,
        })
        .collect();

    Analysis {
        summary,
        highlights: Highlights(highlights),
        action_items: ActionItems::default(),
    }
}

/// Produces the analysis and enrichment for a transcribed call.
pub struct AnalysisGenerator {
    completion: Option<Arc<dyn completion::Provider>>,
    excerpt_utterances: usize,
}

impl AnalysisGenerator {
    pub fn new(
        completion: Option<Arc<dyn completion::Provider>>,
        excerpt_utterances: usize,
    ) -> Self {
        AnalysisGenerator {
            completion,
            excerpt_utterances,
        }
    }

    /// Produce summary, highlights and action items. Never fails: when the
    /// LLM path is unavailable, errors, or returns unusable content, the
    /// deterministic fallback supplies a degraded Analysis instead.
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        speakers: &[SpeakerInfo],
        title: Option<&str>,
        attendees: &[Attendee],
    ) -> Analysis {
        if let Some(completion) = &self.completion {
            let prompt = self.render_analysis_prompt(transcript, speakers, title, attendees);
            match completion.complete(&prompt).await {
                Ok(content) => match parse_analysis_response(&content) {
                    Some(analysis) => return analysis,
                    None => {
                        warn!("Analysis response was not parseable, using fallback");
                    }
                },
                Err(e) => {
                    warn!("Analysis completion failed, using fallback: {e}");
                }
            }
        }
        deterministic_analysis(transcript)
    }

    /// Produce the optional enrichment metrics.
    ///
    /// Returns `None` when no completion provider is configured or when the
    /// call or parse fails; the caller leaves every enrichment field unset
    /// in that case.
    pub async fn enrich(
        &self,
        transcript: &Transcript,
        speakers: &[SpeakerInfo],
        title: Option<&str>,
    ) -> Option<Enrichment> {
        let completion = self.completion.as_ref()?;
        let split = rep_talk_time_split(speakers);
        let prompt = self.render_enrichment_prompt(transcript, speakers, title, split);

        let content = match completion.complete(&prompt).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Enrichment completion failed, skipping enrichment: {e}");
                return None;
            }
        };

        let response = match extract_json_object(&content)
            .and_then(|json| serde_json::from_str::<LlmEnrichmentResponse>(json).ok())
        {
            Some(response) => response,
            None => {
                warn!("Enrichment response was not parseable, skipping enrichment");
                return None;
            }
        };

        let (talk_time_rep_pct, talk_time_customer_pct, talk_time_judgement) = match split {
            Some((rep, customer)) => (Some(rep), Some(customer), Some(judge_talk_time(rep))),
            None => (None, None, None),
        };

        Some(Enrichment {
            sentiment_score: response
                .sentiment_score
                .map(|score| score.clamp(-1.0, 1.0)),
            talk_time_rep_pct,
            talk_time_customer_pct,
            talk_time_judgement,
            coach_rating: response
                .coach_rating
                .map(|rating| rating.clamp(1, 10) as i32),
            coach_summary: response
                .coach_summary
                .map(|summary| summary.trim().to_string())
                .filter(|summary| !summary.is_empty()),
        })
    }

    fn render_analysis_prompt(
        &self,
        transcript: &Transcript,
        speakers: &[SpeakerInfo],
        title: Option<&str>,
        attendees: &[Attendee],
    ) -> String {
        let excerpt = render_excerpt(transcript, speakers, self.excerpt_utterances);
        let attendee_list = attendees
            .iter()
            .map(Attendee::label)
            .collect::<Vec<_>>()
            .join(", ");
        let attendee_line = if attendee_list.is_empty() {
            "unknown".to_string()
        } else {
            attendee_list
        };

        format!(
            "You are a sales call analyst. Analyze this meeting transcript.\n\
             Meeting title: {}\n\
             Attendees: {}\n\n\
             Transcript:\n{}\n\n\
             Return ONLY valid JSON with this shape:\n\
             {{\"summary\": \"2-3 sentence overview\", \
             \"highlights\": [{{\"timestamp\": 0, \"type\": \
             \"key_point|decision|action_item|question|objection\", \"text\": \"...\"}}], \
             \"action_items\": [{{\"text\": \"...\", \"assignee\": \"name or null\", \
             \"due_date\": \"date or null\"}}]}}\n\
             Include at most {} highlights.",
            title.unwrap_or("Untitled meeting"),
            attendee_line,
            excerpt,
            MAX_HIGHLIGHTS
        )
    }

    fn render_enrichment_prompt(
        &self,
        transcript: &Transcript,
        speakers: &[SpeakerInfo],
        title: Option<&str>,
        split: Option<(f64, f64)>,
    ) -> String {
        let excerpt = render_excerpt(transcript, speakers, self.excerpt_utterances);
        let split_line = match split {
            Some((rep, customer)) => format!(
                "The rep spoke {rep:.0}% of the time and the customer {customer:.0}%."
            ),
            None => "No internal rep was identified among the speakers.".to_string(),
        };

        format!(
            "You are a sales coach reviewing a call.\n\
             Meeting title: {}\n\
             {}\n\n\
             Transcript:\n{}\n\n\
             Return ONLY valid JSON with this shape:\n\
             {{\"sentiment_score\": -1.0 to 1.0, \"coach_rating\": 1 to 10, \
             \"coach_summary\": \"2-3 sentences of coaching feedback\"}}",
            title.unwrap_or("Untitled meeting"),
            split_line,
            excerpt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::completion::MockProvider;
    use call_ai::Utterance;
    use entity::speakers::IdentificationMethod;

    fn utterance(speaker_index: i32, start: f64, end: f64, text: &str) -> Utterance {
        Utterance {
            speaker_index,
            start_seconds: start,
            end_seconds: end,
            text: text.to_string(),
            confidence: None,
        }
    }

    fn transcript() -> Transcript {
        Transcript {
            utterances: vec![
                utterance(0, 0.0, 65.0, "Thanks for joining, shall we walk through the renewal pricing today?"),
                utterance(1, 65.0, 80.0, "Yes."),
                utterance(0, 80.0, 120.0, "Great, I'll start with the usage numbers."),
            ],
            text: None,
            language_code: None,
        }
    }

    fn speaker(index: i32, name: Option<&str>, internal: bool, percent: f64) -> SpeakerInfo {
        SpeakerInfo {
            speaker_index: index,
            email: name.map(|n| format!("{}@example.com", n.to_lowercase())),
            name: name.map(String::from),
            is_internal: internal,
            identification_method: IdentificationMethod::EmailMatch,
            confidence: 0.5,
            talk_time_seconds: percent,
            talk_time_percent: percent,
        }
    }

    #[test]
    fn judgement_boundaries() {
        assert_eq!(judge_talk_time(39.9), TalkTimeJudgement::Low);
        assert_eq!(judge_talk_time(40.0), TalkTimeJudgement::Good);
        assert_eq!(judge_talk_time(60.0), TalkTimeJudgement::Good);
        assert_eq!(judge_talk_time(60.1), TalkTimeJudgement::High);
    }

    #[test]
    fn split_requires_an_internal_speaker() {
        let speakers = vec![
            speaker(0, Some("Ana"), true, 70.0),
            speaker(1, Some("Bo"), false, 30.0),
        ];
        assert_eq!(rep_talk_time_split(&speakers), Some((70.0, 30.0)));

        let all_external = vec![
            speaker(0, Some("Ana"), false, 70.0),
            speaker(1, Some("Bo"), false, 30.0),
        ];
        assert_eq!(rep_talk_time_split(&all_external), None);
        assert_eq!(rep_talk_time_split(&[]), None);
    }

    #[test]
    fn extracts_the_first_balanced_json_object() {
        assert_eq!(
            extract_json_object("```json\n{\"a\": 1}\n```"),
            Some("{\"a\": 1}")
        );
        assert_eq!(
            extract_json_object("Here you go: {\"a\": {\"b\": 2}} and more prose"),
            Some("{\"a\": {\"b\": 2}}")
        );
        // Braces inside string values must not unbalance the scan.
        assert_eq!(
            extract_json_object(r#"{"text": "use { and } freely \" here"}"#),
            Some(r#"{"text": "use { and } freely \" here"}"#)
        );
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{\"never\": \"closed\""), None);
    }

    #[test]
    fn parses_a_lenient_analysis_response() {
        let content = r#"Sure! Here is the analysis:
            {"summary": "  A renewal call. ",
             "highlights": [
                {"timestamp": -3, "type": "mystery_kind", "text": "Pricing discussed"},
                {"timestamp": 42.5, "type": "decision", "text": "Renewal approved"},
                {"type": "question", "text": ""}
             ],
             "action_items": [{"text": "Send contract", "assignee": "Ana"}]}
        "#;

        let analysis = parse_analysis_response(content).unwrap();
        assert_eq!(analysis.summary, "A renewal call.");
        assert_eq!(analysis.highlights.0.len(), 2);
        assert_eq!(analysis.highlights.0[0].timestamp_seconds, 0.0);
        assert_eq!(analysis.highlights.0[0].kind, HighlightKind::KeyPoint);
        assert_eq!(analysis.highlights.0[1].kind, HighlightKind::Decision);
        assert_eq!(analysis.action_items.0[0].assignee.as_deref(), Some("Ana"));
        assert_eq!(analysis.action_items.0[0].due_date, None);
    }

    #[test]
    fn analysis_response_without_a_summary_is_rejected() {
        assert!(parse_analysis_response(r#"{"highlights": []}"#).is_none());
        assert!(parse_analysis_response(r#"{"summary": "   "}"#).is_none());
        assert!(parse_analysis_response("not json").is_none());
    }

    #[test]
    fn highlights_are_capped_at_ten() {
        let many: Vec<String> = (0..15)
            .map(|i| format!(r#"{{"timestamp": {i}, "type": "key_point", "text": "h{i}"}}"#))
            .collect();
        let content = format!(
            r#"{{"summary": "s", "highlights": [{}]}}"#,
            many.join(",")
        );

        let analysis = parse_analysis_response(&content).unwrap();
        assert_eq!(analysis.highlights.0.len(), 10);
    }

    #[test]
    fn deterministic_fallback_reports_duration_and_word_count() {
        let analysis = deterministic_analysis(&transcript());

        assert_eq!(
            analysis.summary,
            "Call lasted approximately 2 minutes with 19 words spoken."
        );
        // Only the long question qualifies as a highlight.
        assert_eq!(analysis.highlights.0.len(), 1);
        assert_eq!(analysis.highlights.0[0].kind, HighlightKind::Question);
        assert!(analysis.action_items.0.is_empty());
    }

    #[test]
    fn deterministic_fallback_caps_question_highlights() {
        let long_question = "Could you tell me more about the deployment timeline?";
        let utterances = (0..8)
            .map(|i| utterance(0, i as f64, i as f64 + 1.0, long_question))
            .collect();
        let transcript = Transcript {
            utterances,
            text: None,
            language_code: None,
        };

        let analysis = deterministic_analysis(&transcript);
        assert_eq!(analysis.highlights.0.len(), 5);
    }

    #[test]
    fn timestamps_render_as_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.4), "1:05");
        assert_eq!(format_timestamp(600.0), "10:00");
        assert_eq!(format_timestamp(-5.0), "0:00");
    }

    #[test]
    fn excerpt_substitutes_speaker_names_and_respects_the_limit() {
        let speakers = vec![
            speaker(0, Some("Ana"), true, 70.0),
            speaker(1, None, false, 30.0),
        ];

        let excerpt = render_excerpt(&transcript(), &speakers, 2);

        let lines: Vec<&str> = excerpt.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[0:00] Ana:"));
        assert!(lines[1].starts_with("[1:05] Speaker 1:"));
    }

    #[tokio::test]
    async fn analyze_uses_the_completion_when_it_parses() {
        let mut completion = MockProvider::new();
        completion.expect_complete().times(1).returning(|_| {
            Ok("```json\n{\"summary\": \"Model summary.\"}\n```".to_string())
        });

        let generator = AnalysisGenerator::new(Some(Arc::new(completion)), 60);
        let analysis = generator.analyze(&transcript(), &[], None, &[]).await;

        assert_eq!(analysis.summary, "Model summary.");
    }

    #[tokio::test]
    async fn analyze_falls_back_when_the_completion_errors() {
        let mut completion = MockProvider::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_| Err(call_ai::Error::Network("connection reset".to_string())));

        let generator = AnalysisGenerator::new(Some(Arc::new(completion)), 60);
        let analysis = generator.analyze(&transcript(), &[], None, &[]).await;

        assert!(!analysis.summary.is_empty());
        assert!(analysis.summary.contains("approximately"));
    }

    #[tokio::test]
    async fn analyze_without_a_provider_is_deterministic() {
        let generator = AnalysisGenerator::new(None, 60);
        let analysis = generator.analyze(&transcript(), &[], None, &[]).await;

        assert!(analysis.summary.contains("words spoken"));
    }

    #[tokio::test]
    async fn enrich_clamps_model_values_and_derives_the_judgement() {
        let mut completion = MockProvider::new();
        completion.expect_complete().times(1).returning(|_| {
            Ok(r#"{"sentiment_score": 3.2, "coach_rating": 0, "coach_summary": "Tighten discovery."}"#
                .to_string())
        });

        let speakers = vec![
            speaker(0, Some("Ana"), true, 70.0),
            speaker(1, Some("Bo"), false, 30.0),
        ];
        let generator = AnalysisGenerator::new(Some(Arc::new(completion)), 60);
        let enrichment = generator
            .enrich(&transcript(), &speakers, Some("Renewal"))
            .await
            .unwrap();

        assert_eq!(enrichment.sentiment_score, Some(1.0));
        assert_eq!(enrichment.coach_rating, Some(1));
        assert_eq!(enrichment.talk_time_rep_pct, Some(70.0));
        assert_eq!(enrichment.talk_time_customer_pct, Some(30.0));
        assert_eq!(enrichment.talk_time_judgement, Some(TalkTimeJudgement::High));
        assert_eq!(enrichment.coach_summary.as_deref(), Some("Tighten discovery."));
    }

    #[tokio::test]
    async fn enrich_without_an_internal_speaker_leaves_the_split_unset() {
        let mut completion = MockProvider::new();
        completion.expect_complete().times(1).returning(|_| {
            Ok(r#"{"sentiment_score": -0.4, "coach_rating": 6}"#.to_string())
        });

        let speakers = vec![speaker(0, Some("Bo"), false, 100.0)];
        let generator = AnalysisGenerator::new(Some(Arc::new(completion)), 60);
        let enrichment = generator.enrich(&transcript(), &speakers, None).await.unwrap();

        assert_eq!(enrichment.sentiment_score, Some(-0.4));
        assert_eq!(enrichment.talk_time_rep_pct, None);
        assert_eq!(enrichment.talk_time_customer_pct, None);
        assert_eq!(enrichment.talk_time_judgement, None);
        assert_eq!(enrichment.coach_summary, None);
    }

    #[tokio::test]
    async fn analyze_and_enrich_twice_yield_identical_results() {
        let transcript = transcript();
        let speakers = vec![
            speaker(0, Some("Ana"), true, 70.0),
            speaker(1, Some("Bo"), false, 30.0),
        ];
        let duration = transcript.duration_seconds();

        let generator = AnalysisGenerator::new(None, 60);
        let first = generator
            .analyze(&transcript, &speakers, Some("Renewal"), &[])
            .await;
        let second = generator
            .analyze(&transcript, &speakers, Some("Renewal"), &[])
            .await;
        assert_eq!(first, second);

        let mut completion = MockProvider::new();
        completion.expect_complete().times(2).returning(|_| {
            Ok(r#"{"sentiment_score": 0.2, "coach_rating": 7, "coach_summary": "Ask more."}"#
                .to_string())
        });
        let generator = AnalysisGenerator::new(Some(Arc::new(completion)), 60);
        let first = generator
            .enrich(&transcript, &speakers, Some("Renewal"))
            .await
            .unwrap();
        let second = generator
            .enrich(&transcript, &speakers, Some("Renewal"))
            .await
            .unwrap();
        // Pin the judgement so the equality below cannot pass vacuously.
        assert_eq!(first.talk_time_judgement, Some(TalkTimeJudgement::High));
        assert_eq!(first, second);

        assert_eq!(transcript.duration_seconds(), duration);
    }

    #[tokio::test]
    async fn enrich_failures_skip_enrichment_entirely() {
        let mut failing = MockProvider::new();
        failing
            .expect_complete()
            .times(1)
            .returning(|_| Err(call_ai::Error::Timeout("deadline".to_string())));
        let generator = AnalysisGenerator::new(Some(Arc::new(failing)), 60);
        assert!(generator.enrich(&transcript(), &[], None).await.is_none());

        let mut garbled = MockProvider::new();
        garbled
            .expect_complete()
            .times(1)
            .returning(|_| Ok("The call went well overall.".to_string()));
        let generator = AnalysisGenerator::new(Some(Arc::new(garbled)), 60);
        assert!(generator.enrich(&transcript(), &[], None).await.is_none());

        let generator = AnalysisGenerator::new(None, 60);
        assert!(generator.enrich(&transcript(), &[], None).await.is_none());
    }
}
