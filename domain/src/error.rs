//! Error types for the `domain` layer.
use call_ai::Error as CallAiError;
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and the worker binary is
/// dependent on `domain`, but the worker should not be dependent, directly, on `entity_api`.
/// Each layer is free to define its own error kinds to whatever richness is needed at that
/// layer. Ultimately the various `error_kind`s are used by the orchestrator to decide what
/// gets persisted as `error_message` and by the worker to pick its exit code.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Pipeline(PipelineErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

/// Terminal pipeline failures. These end the run for the recording being
/// processed and are persisted onto its row as `status = failed` plus a
/// human-readable `error_message` taken from the `Display` rendering.
#[derive(Debug, PartialEq)]
pub enum PipelineErrorKind {
    /// Every media resolution tier was attempted and none yielded a URL
    NoMediaAvailable,
    /// Every configured transcription provider failed for reasons other
    /// than polling exhaustion
    TranscriptionFailed,
    /// The transcription poll budget or the overall pipeline deadline ran out
    Timeout,
}

impl fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineErrorKind::NoMediaAvailable => write!(
                f,
                "no recording URL available from storage, the triggering event, or the capture agent"
            ),
            PipelineErrorKind::TranscriptionFailed => {
                write!(f, "every configured transcription provider failed")
            }
            PipelineErrorKind::Timeout => {
                write!(f, "transcription did not complete within the time budget")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::RecordNotUpdated => {
                EntityErrorKind::Invalid
            }
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

// Context-free translation from provider errors. Stage code that can classify
// a provider failure as a terminal pipeline error builds the `Pipeline` kind
// explicitly instead of going through this conversion.
impl From<CallAiError> for Error {
    fn from(err: CallAiError) -> Self {
        let error_kind = match &err {
            CallAiError::Network(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            CallAiError::Configuration(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            _ => DomainErrorKind::External(ExternalErrorKind::Other(err.to_string())),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
