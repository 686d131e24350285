//! Pipeline orchestration: drives a recording from queued to ready.
//!
//! Stage order is fixed: resolve media, transcribe, identify speakers,
//! analyze (plus optional enrichment), evaluate the HITL gate. Every
//! derived field lands in one final update; the only intermediate write is
//! the processing status. Downstream events fire after ready and never
//! affect the persisted outcome.

use crate::analysis::{Analysis, AnalysisGenerator, Enrichment};
use crate::error::{
    DomainErrorKind, EntityErrorKind, Error, InternalErrorKind, PipelineErrorKind,
};
use crate::gateway::assembly_ai::AssemblyAiTranscriber;
use crate::gateway::credits::CreditsClient;
use crate::gateway::deepgram::DeepgramTranscriber;
use crate::gateway::meeting_baas::MeetingBaasClient;
use crate::gateway::open_ai::OpenAiClient;
use crate::gateway::storage::StorageClient;
use crate::gateway::transcriber_chain::TranscriberChain;
use crate::hitl::HitlFlag;
use crate::media_resolver::MediaResolver;
use crate::{hitl, speakers};
use async_trait::async_trait;
use call_ai::traits::{capture, completion, credits, storage, transcription};
use call_ai::types::transcript::Request;
use service::config::AnalysisBackend;
use entity::attendees::Attendee;
use entity::recording_status::RecordingStatus;
use entity::recordings;
use entity::speakers::{SpeakerInfo, SpeakerList};
use entity::transcript as transcript_entity;
use entity::Id;
use events::{DomainEvent, EventQueue};
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

/// Persistence seam for the orchestrator. SeaORM-backed in production;
/// tests substitute an in-memory store.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn load(&self, id: Id) -> Result<Option<recordings::Model>, Error>;
    async fn update(&self, id: Id, model: recordings::Model)
        -> Result<recordings::Model, Error>;
    async fn update_status(
        &self,
        id: Id,
        status: RecordingStatus,
        error_message: Option<String>,
    ) -> Result<recordings::Model, Error>;
}

pub struct SeaOrmStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        SeaOrmStore { db }
    }
}

#[async_trait]
impl RecordingStore for SeaOrmStore {
    async fn load(&self, id: Id) -> Result<Option<recordings::Model>, Error> {
        match crate::recording::find_by_id(&self.db, id).await {
            Ok(model) => Ok(Some(model)),
            Err(Error {
                error_kind:
                    DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)),
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        id: Id,
        model: recordings::Model,
    ) -> Result<recordings::Model, Error> {
        crate::recording::update(&self.db, id, model).await
    }

    async fn update_status(
        &self,
        id: Id,
        status: RecordingStatus,
        error_message: Option<String>,
    ) -> Result<recordings::Model, Error> {
        crate::recording::update_status(&self.db, id, status, error_message).await
    }
}

/// Pipeline behavior resolved once at construction, not read from ambient
/// environment inside stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub internal_email_domain: Option<String>,
    pub enrichment_enabled: bool,
    /// Wall-clock budget for the stage sequence of one run.
    pub deadline: Duration,
}

impl PipelineConfig {
    pub fn from_service_config(config: &service::config::Config) -> Self {
        PipelineConfig {
            internal_email_domain: config.internal_email_domain(),
            enrichment_enabled: config.enrichment_enabled,
            deadline: Duration::from_secs(config.pipeline_deadline_secs),
        }
    }
}

/// Everything the stages derive for the single final update.
struct Derived {
    media_url: Option<String>,
    transcript: call_ai::Transcript,
    speakers: Vec<SpeakerInfo>,
    analysis: Analysis,
    enrichment: Option<Enrichment>,
    hitl: Option<HitlFlag>,
}

/// Drives one recording at a time through the pipeline stages.
pub struct Processor {
    store: Arc<dyn RecordingStore>,
    media_resolver: MediaResolver,
    transcriber: Arc<dyn transcription::Provider>,
    analysis: AnalysisGenerator,
    credits: Option<Arc<dyn credits::Provider>>,
    events: EventQueue,
    config: PipelineConfig,
}

impl Processor {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        media_resolver: MediaResolver,
        transcriber: Arc<dyn transcription::Provider>,
        analysis: AnalysisGenerator,
        credits: Option<Arc<dyn credits::Provider>>,
        events: EventQueue,
        config: PipelineConfig,
    ) -> Self {
        Processor {
            store,
            media_resolver,
            transcriber,
            analysis,
            credits,
            events,
            config,
        }
    }

    /// Assemble the production pipeline from service configuration.
    ///
    /// Collaborators are optional by configuration: a missing credential
    /// leaves the matching tier out (no storage signing, no capture agent
    /// lookup, deterministic analysis, no enrichment gate) instead of
    /// failing at startup.
    pub fn from_config(
        config: &service::config::Config,
        db: Arc<DatabaseConnection>,
        events: EventQueue,
    ) -> Result<Self, Error> {
        let mut transcribers: Vec<Arc<dyn transcription::Provider>> = Vec::new();
        if let Some(api_key) = config.assembly_ai_api_key() {
            transcribers.push(Arc::new(AssemblyAiTranscriber::new(
                &api_key,
                config.assembly_ai_base_url(),
                Duration::from_secs(config.transcription_poll_interval_secs),
                config.transcription_max_poll_attempts,
            )?));
        }
        if let Some(api_key) = config.deepgram_api_key() {
            transcribers.push(Arc::new(DeepgramTranscriber::new(
                &api_key,
                config.deepgram_base_url(),
            )?));
        }
        if transcribers.is_empty() {
            warn!("No transcription provider configured; transcription will fail");
        }

        let storage: Option<Arc<dyn storage::Provider>> =
            match (config.storage_base_url(), config.storage_api_key()) {
                (Some(base_url), Some(api_key)) => {
                    Some(Arc::new(StorageClient::new(&api_key, &base_url)?))
                }
                _ => None,
            };

        let capture: Option<Arc<dyn capture::Provider>> = match config.meeting_baas_api_key() {
            Some(api_key) => Some(Arc::new(MeetingBaasClient::new(
                &api_key,
                config.meeting_baas_base_url(),
            )?)),
            None => None,
        };

        let completion: Option<Arc<dyn completion::Provider>> = match config.analysis_backend {
            AnalysisBackend::Llm => match config.openai_api_key() {
                Some(api_key) => Some(Arc::new(OpenAiClient::new(
                    &api_key,
                    config.openai_base_url(),
                    config.openai_model(),
                )?)),
                None => {
                    warn!(
                        "Analysis backend is llm but no OpenAI API key is set; \
                         falling back to deterministic analysis"
                    );
                    None
                }
            },
            AnalysisBackend::Deterministic => None,
        };

        let credits_provider: Option<Arc<dyn credits::Provider>> =
            match (config.credits_base_url(), config.credits_api_key()) {
                (Some(base_url), Some(api_key)) => {
                    Some(Arc::new(CreditsClient::new(&api_key, &base_url)?))
                }
                _ => None,
            };

        Ok(Processor::new(
            Arc::new(SeaOrmStore::new(db)),
            MediaResolver::new(storage, capture),
            Arc::new(TranscriberChain::new(transcribers)),
            AnalysisGenerator::new(completion, config.analysis_excerpt_utterances),
            credits_provider,
            events,
            PipelineConfig::from_service_config(config),
        ))
    }

    /// Drive one recording end to end.
    ///
    /// Returns `Ok(None)` without touching state when the recording does not
    /// exist. On a stage error the failed status and a rendered message are
    /// persisted and the error propagates; downstream events are emitted
    /// only after a successful run.
    pub async fn run(
        &self,
        recording_id: Id,
        override_url: Option<&str>,
    ) -> Result<Option<recordings::Model>, Error> {
        let Some(recording) = self.store.load(recording_id).await? else {
            warn!("Recording not found: {recording_id}");
            return Ok(None);
        };

        info!("Processing recording: {recording_id}");
        self.store
            .update_status(recording_id, RecordingStatus::Processing, None)
            .await?;

        let derived = match tokio::time::timeout(
            self.config.deadline,
            self.derive(&recording, override_url),
        )
        .await
        {
            Ok(Ok(derived)) => derived,
            Ok(Err(e)) => return self.fail(recording_id, e).await,
            Err(_) => {
                let error = Error {
                    source: None,
                    error_kind: DomainErrorKind::Pipeline(PipelineErrorKind::Timeout),
                };
                return self.fail(recording_id, error).await;
            }
        };

        let updated = match self.persist_ready(recording, derived).await {
            Ok(updated) => updated,
            Err(e) => return self.fail(recording_id, e).await,
        };

        self.emit_events(&updated);
        info!("Recording ready: {recording_id}");

        Ok(Some(updated))
    }

    /// Run the derivation stages in order. No state is written from here;
    /// the caller persists the result as a unit.
    async fn derive(
        &self,
        recording: &recordings::Model,
        override_url: Option<&str>,
    ) -> Result<Derived, Error> {
        let attendees: &[Attendee] = recording
            .attendees
            .as_ref()
            .map(|attendees| attendees.as_slice())
            .unwrap_or_default();

        let (transcript, media_url) = match persisted_transcript(recording) {
            Some(transcript) => {
                info!("Reusing persisted transcript for recording: {}", recording.id);
                (transcript, None)
            }
            None => {
                let resolved = self.media_resolver.resolve(recording, override_url).await?;
                debug!("Resolved media via {:?}", resolved.source);

                let mut request = Request::new(resolved.url.clone());
                request.language_code = recording.language_code.clone();
                request.speakers_expected =
                    (!attendees.is_empty()).then(|| attendees.len() as u32);

                let transcript = self
                    .transcriber
                    .transcribe(request)
                    .await
                    .map_err(classify_transcription_error)?;
                (transcript, Some(resolved.url))
            }
        };

        let speakers = speakers::identify(
            &transcript.utterances,
            attendees,
            self.config.internal_email_domain.as_deref(),
        );

        let analysis = self
            .analysis
            .analyze(&transcript, &speakers, recording.title.as_deref(), attendees)
            .await;

        let enrichment = if self.config.enrichment_enabled
            && self.credit_available(recording.organization_id).await
        {
            self.analysis
                .enrich(&transcript, &speakers, recording.title.as_deref())
                .await
        } else {
            None
        };

        let hitl = hitl::evaluate(&speakers, attendees);

        Ok(Derived {
            media_url,
            transcript,
            speakers,
            analysis,
            enrichment,
            hitl,
        })
    }

    /// Credit gate for enrichment. Fails open: the check is advisory rate
    /// limiting, not a correctness invariant.
    async fn credit_available(&self, organization_id: Id) -> bool {
        let Some(credits) = &self.credits else {
            return true;
        };
        match credits.check_balance(organization_id).await {
            Ok(allowed) => {
                if !allowed {
                    info!("Organization {organization_id} has no AI credit, skipping enrichment");
                }
                allowed
            }
            Err(e) => {
                warn!("Credit check failed, proceeding with enrichment: {e}");
                true
            }
        }
    }

    /// Write every derived field in one update and transition to ready.
    async fn persist_ready(
        &self,
        recording: recordings::Model,
        derived: Derived,
    ) -> Result<recordings::Model, Error> {
        let Derived {
            media_url,
            transcript,
            speakers,
            analysis,
            enrichment,
            hitl,
        } = derived;
        let enrichment = enrichment.unwrap_or_default();

        let mut model = recording;
        model.status = RecordingStatus::Ready;
        // On the transcript-reuse path the previously resolved URL stays.
        if let Some(url) = media_url {
            model.source_media_url = Some(url);
        }
        model.language_code = transcript.language_code.clone().or(model.language_code);
        model.duration_seconds = transcript
            .duration_seconds()
            .map(|seconds| seconds.round() as i32);
        model.word_count = Some(transcript.word_count() as i32);
        model.speaker_count = Some(transcript.speaker_count() as i32);
        model.transcript_text = Some(render_transcript_text(&transcript, &speakers));
        model.transcript = Some(to_entity_transcript(&transcript));
        model.speakers = Some(SpeakerList(speakers));
        model.summary = Some(analysis.summary);
        model.highlights = Some(analysis.highlights);
        model.action_items = Some(analysis.action_items);
        model.sentiment_score = enrichment.sentiment_score;
        model.talk_time_rep_pct = enrichment.talk_time_rep_pct;
        model.talk_time_customer_pct = enrichment.talk_time_customer_pct;
        model.talk_time_judgement = enrichment.talk_time_judgement;
        model.coach_rating = enrichment.coach_rating;
        model.coach_summary = enrichment.coach_summary;
        model.error_message = None;
        match hitl {
            Some(flag) => {
                model.hitl_required = true;
                model.hitl_type = Some(flag.hitl_type.to_string());
                model.hitl_data = Some(flag.data);
            }
            None => {
                model.hitl_required = false;
                model.hitl_type = None;
                model.hitl_data = None;
            }
        }

        let id = model.id;
        self.store.update(id, model).await
    }

    /// Fire-and-forget downstream notifications.
    fn emit_events(&self, recording: &recordings::Model) {
        self.events.enqueue(DomainEvent::RecordingReady {
            recording_id: recording.id,
        });
        self.events.enqueue(DomainEvent::CrmSyncRequested {
            recording_id: recording.id,
            organization_id: recording.organization_id,
        });
        if let Some(meeting_id) = &recording.meeting_id {
            self.events.enqueue(DomainEvent::MeetingEnded {
                meeting_id: meeting_id.clone(),
                contact_id: recording.contact_id.clone(),
                title: recording.title.clone().unwrap_or_default(),
                transcript_available: recording.transcript_text.is_some(),
            });
        }
    }

    /// Persist the failure and propagate the original error.
    async fn fail(
        &self,
        recording_id: Id,
        error: Error,
    ) -> Result<Option<recordings::Model>, Error> {
        error!("Pipeline failed for recording {recording_id}: {error}");
        let message = render_error_message(&error);
        if let Err(update_error) = self
            .store
            .update_status(recording_id, RecordingStatus::Failed, Some(message))
            .await
        {
            error!("Failed to persist failure for recording {recording_id}: {update_error}");
        }
        Err(error)
    }
}

/// A transcript persisted by an earlier run, good enough to skip
/// re-transcription: non-blank rendered text plus at least one utterance.
fn persisted_transcript(recording: &recordings::Model) -> Option<call_ai::Transcript> {
    let text = recording
        .transcript_text
        .as_ref()
        .filter(|text| !text.trim().is_empty())?;
    let stored = recording
        .transcript
        .as_ref()
        .filter(|transcript| !transcript.is_empty())?;

    Some(call_ai::Transcript {
        utterances: stored
            .as_slice()
            .iter()
            .map(|utterance| call_ai::Utterance {
                speaker_index: utterance.speaker_index,
                start_seconds: utterance.start_seconds,
                end_seconds: utterance.end_seconds,
                text: utterance.text.clone(),
                confidence: utterance.confidence,
            })
            .collect(),
        text: Some(text.clone()),
        language_code: recording.language_code.clone(),
    })
}

fn to_entity_transcript(transcript: &call_ai::Transcript) -> transcript_entity::Transcript {
    transcript_entity::Transcript(
        transcript
            .utterances
            .iter()
            .map(|utterance| transcript_entity::Utterance {
                speaker_index: utterance.speaker_index,
                start_seconds: utterance.start_seconds,
                end_seconds: utterance.end_seconds,
                text: utterance.text.clone(),
                confidence: utterance.confidence,
            })
            .collect(),
    )
}

/// Render the speaker-labeled transcript, one `Name: text` line per
/// utterance.
pub fn render_transcript_text(
    transcript: &call_ai::Transcript,
    speakers: &[SpeakerInfo],
) -> String {
    transcript
        .utterances
        .iter()
        .map(|utterance| {
            format!(
                "{}: {}",
                speakers::speaker_label(speakers, utterance.speaker_index),
                utterance.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Terminal classification for a transcription failure: a timeout keeps its
/// identity, everything else counts as every provider having failed.
fn classify_transcription_error(error: call_ai::Error) -> Error {
    let kind = match &error {
        call_ai::Error::Timeout(_) => PipelineErrorKind::Timeout,
        _ => PipelineErrorKind::TranscriptionFailed,
    };
    Error {
        source: Some(Box::new(error)),
        error_kind: DomainErrorKind::Pipeline(kind),
    }
}

/// Human-readable message persisted to `error_message` on failure.
pub fn render_error_message(error: &Error) -> String {
    match &error.error_kind {
        DomainErrorKind::Pipeline(kind) => kind.to_string(),
        _ => error.to_string(),
    }
}
