use std::time::Duration;

use serde_json::json;

use crate::record::{ResponseRecord, ResponseStatus};

/// Fires a `completed`/`failed` webhook from a detached context with a
/// short timeout, retrying immediately up to `max_attempts` times. No
/// backoff between attempts and no durable redelivery across restarts —
/// a caller that needs that builds it on top of the `error`/`completed`
/// log lines this emits on final failure.
pub async fn deliver(client: &reqwest::Client, timeout: Duration, max_attempts: u32, url: &str, record: &ResponseRecord) {
    let event = match record.status {
        ResponseStatus::Completed => "completed",
        ResponseStatus::Failed => "failed",
        _ => return,
    };

    let body = json!({
        "event": event,
        "response_id": record.public_id,
        "status": status_label(record.status),
        "output_text": record.output_text,
        "error": record.error,
    });

    let attempts = max_attempts.max(1);

    for attempt in 1..=attempts {
        let result = client.post(url).timeout(timeout).json(&body).send().await;

        match result {
            Ok(response) if response.status().is_success() => return,
            Ok(response) if attempt == attempts => {
                log::warn!(status:? = response.status(), response_id = record.public_id, attempt; "webhook delivery rejected, giving up");
            }
            Ok(response) => {
                log::debug!(status:? = response.status(), response_id = record.public_id, attempt; "webhook delivery rejected, retrying");
            }
            Err(err) if attempt == attempts => {
                log::warn!(err:?, response_id = record.public_id, attempt; "webhook delivery failed, giving up");
            }
            Err(err) => {
                log::debug!(err:?, response_id = record.public_id, attempt; "webhook delivery failed, retrying");
            }
        }
    }
}

fn status_label(status: ResponseStatus) -> &'static str {
    match status {
        ResponseStatus::Queued => "queued",
        ResponseStatus::InProgress => "in_progress",
        ResponseStatus::Completed => "completed",
        ResponseStatus::Failed => "failed",
        ResponseStatus::Cancelled => "cancelled",
    }
}
