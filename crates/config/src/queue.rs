use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Configuration for the background response orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Number of worker tasks claiming jobs from the queue.
    pub worker_count: usize,
    /// How often an idle worker polls for newly queued jobs.
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
    /// How long to wait for a webhook delivery before marking it failed.
    #[serde(deserialize_with = "deserialize_duration")]
    pub webhook_timeout: Duration,
    /// Maximum webhook delivery attempts before giving up.
    pub max_webhook_attempts: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            poll_interval: Duration::from_millis(500),
            webhook_timeout: Duration::from_secs(10),
            max_webhook_attempts: 5,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    duration_str::parse(&raw).map_err(serde::de::Error::custom)
}
