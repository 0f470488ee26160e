use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::task::JoinHandle;

use crate::orchestrator::BackgroundOrchestrator;
use crate::repository::ResponseRepository;

/// Spawns a fixed-size pool of polling loops, each claiming and running
/// one queued response at a time. `poll_interval` is the backoff when the
/// queue comes up empty — there's no push notification between
/// `insert` and a worker's next `claim_next_queued`.
pub fn spawn_workers(orchestrator: Arc<BackgroundOrchestrator>, responses: Arc<dyn ResponseRepository>, worker_count: usize, poll_interval: Duration) -> Vec<JoinHandle<()>> {
    (0..worker_count)
        .map(|index| {
            let orchestrator = orchestrator.clone();
            let responses = responses.clone();

            tokio::spawn(async move {
                loop {
                    match responses.claim_next_queued(Timestamp::now()).await {
                        Ok(Some(record)) => {
                            if let Err(err) = orchestrator.execute_background(&record.public_id).await {
                                log::warn!(err:?, response_id = record.public_id, worker = index; "background response failed");
                            }
                        }
                        Ok(None) => tokio::time::sleep(poll_interval).await,
                        Err(err) => {
                            log::warn!(err:?, worker = index; "failed to claim next queued response");
                            tokio::time::sleep(poll_interval).await;
                        }
                    }
                }
            })
        })
        .collect()
}
