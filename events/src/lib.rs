//! Event system infrastructure for the callscope pipeline.
//!
//! This crate provides the fire-and-forget event path between the pipeline
//! orchestrator and downstream collaborators (CRM sync, workflow triggers,
//! notification fan-out).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing the downstream events a finished
//!   pipeline emits
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//! - **EventQueue**: Bounded queue decoupling the orchestrator from handler
//!   latency and failures
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies.

use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// Downstream events emitted after a pipeline run reaches ready.
///
/// All of these are best-effort: handler failures are logged and never
/// revert the persisted recording state.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// Emitted when a recording's derived intelligence has been persisted.
    /// Downstream surfaces refetch the recording on receipt.
    RecordingReady {
        recording_id: Id,
    },
    /// Asks the CRM collaborator to sync the recording's analysis onto the
    /// account/contact timeline.
    CrmSyncRequested {
        recording_id: Id,
        organization_id: Id,
    },
    /// Workflow trigger fired once per processed meeting. Only emitted when
    /// the capture collaborator recorded an external meeting id.
    MeetingEnded {
        meeting_id: String,
        contact_id: Option<String>,
        title: String,
        transcript_available: bool,
    },
}

/// Trait for handling domain events.
/// Implementations can perform side effects like calling collaborator
/// services, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    /// Handlers are called sequentially; a failing handler only affects
    /// itself since handlers return nothing.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler that writes every event to the log. Deployments without real
/// downstream collaborators register this one so emitted events remain
/// visible to operators.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::RecordingReady { recording_id } => {
                info!("Event: recording {recording_id} ready");
            }
            DomainEvent::CrmSyncRequested {
                recording_id,
                organization_id,
            } => {
                info!(
                    "Event: CRM sync requested for recording {recording_id} \
                     (organization {organization_id})"
                );
            }
            DomainEvent::MeetingEnded {
                meeting_id,
                title,
                transcript_available,
                ..
            } => {
                info!(
                    "Event: meeting {meeting_id} ended (\"{title}\", transcript \
                     available: {transcript_available})"
                );
            }
        }
    }
}

/// Bounded fire-and-forget queue in front of an EventPublisher.
///
/// The orchestrator enqueues without awaiting handler work; a single
/// consumer task drains the queue. Dropping every queue handle closes the
/// channel, which lets the consumer finish and the process drain cleanly.
#[derive(Clone)]
pub struct EventQueue {
    sender: mpsc::Sender<DomainEvent>,
}

impl EventQueue {
    /// Spawns the consumer task and returns the queue handle plus the task
    /// handle to await during shutdown.
    pub fn start(publisher: EventPublisher, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel(capacity);
        let consumer = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                publisher.publish(event).await;
            }
        });
        (EventQueue { sender }, consumer)
    }

    /// Non-blocking enqueue. A full queue drops the event with a warning
    /// instead of stalling the caller.
    pub fn enqueue(&self, event: DomainEvent) {
        if let Err(err) = self.sender.try_send(event) {
            warn!("Dropping downstream event: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: &DomainEvent) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn publisher_delivers_to_every_handler() {
        let first = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let second = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        publisher
            .publish(DomainEvent::RecordingReady {
                recording_id: Id::new_v4(),
            })
            .await;

        assert_eq!(first.seen.load(Ordering::SeqCst), 1);
        assert_eq!(second.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn queue_forwards_events_until_every_handle_drops() {
        let handler = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let publisher = EventPublisher::new().with_handler(handler.clone());
        let (queue, consumer) = EventQueue::start(publisher, 8);

        queue.enqueue(DomainEvent::RecordingReady {
            recording_id: Id::new_v4(),
        });
        queue.enqueue(DomainEvent::MeetingEnded {
            meeting_id: "meet_1".to_string(),
            contact_id: None,
            title: "Weekly sync".to_string(),
            transcript_available: true,
        });

        drop(queue);
        consumer.await.unwrap();

        assert_eq!(handler.seen.load(Ordering::SeqCst), 2);
    }
}
