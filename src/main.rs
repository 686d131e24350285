use domain::pipeline::Processor;
use events::{EventPublisher, EventQueue, LoggingEventHandler};
use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on waiting for the event consumer to drain after a run.
const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if config.migrate {
        info!("Running pending migrations...");
        if let Err(e) = Migrator::up(db.as_ref(), None).await {
            error!("Failed to run migrations: {e}");
            std::process::exit(1);
        }
    }

    let Some(recording_id) = config.recording_id else {
        error!("No recording to process; pass --recording-id or set RECORDING_ID");
        std::process::exit(2);
    };

    let publisher = EventPublisher::new().with_handler(Arc::new(LoggingEventHandler));
    let (events, consumer) = EventQueue::start(publisher, config.event_queue_capacity);

    let processor = match Processor::from_config(&config, db, events) {
        Ok(processor) => processor,
        Err(e) => {
            error!("Failed to assemble the pipeline: {e}");
            std::process::exit(1);
        }
    };

    let outcome = processor
        .run(recording_id, config.media_url().as_deref())
        .await;

    // The processor holds the last queue handle; dropping it closes the
    // channel so the consumer can finish whatever is still enqueued.
    drop(processor);
    if tokio::time::timeout(EVENT_DRAIN_TIMEOUT, consumer)
        .await
        .is_err()
    {
        warn!("Event consumer did not drain within {EVENT_DRAIN_TIMEOUT:?}");
    }

    match outcome {
        Ok(Some(recording)) => {
            info!(
                "Recording {} finished with status {}",
                recording.id, recording.status
            );
            if recording.hitl_required {
                info!("Human review requested: speaker confirmation is pending");
            }
        }
        Ok(None) => {
            warn!("Recording {recording_id} does not exist; nothing to process");
            std::process::exit(2);
        }
        Err(e) => {
            error!("Pipeline run failed: {e}");
            std::process::exit(1);
        }
    }
}
