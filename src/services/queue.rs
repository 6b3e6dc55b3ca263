use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const QUEUE_KEY: &str = "staffer:screening:jobs";
const PROCESSING_KEY: &str = "staffer:screening:processing";

/// Screening job serialized into Redis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningJob {
    pub verification_id: Uuid,
    pub worker_id: Uuid,
    #[serde(default)]
    pub attempt: u32,
}

impl ScreeningJob {
    pub fn new(verification_id: Uuid, worker_id: Uuid) -> Self {
        Self {
            verification_id,
            worker_id,
            attempt: 0,
        }
    }

    /// True once the job has already been retried `max_retries` times.
    pub fn retries_exhausted(&self, max_retries: u32) -> bool {
        self.attempt >= max_retries
    }

    /// Copy of this job for the next retry.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

/// Redis-backed queue of verification submissions awaiting image screening.
pub struct ScreeningQueue {
    client: redis::Client,
}

impl ScreeningQueue {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    pub async fn enqueue(&self, job: &ScreeningJob) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(job)?;
        conn.lpush::<_, _, ()>(QUEUE_KEY, &payload).await?;
        Ok(())
    }

    /// Pop the oldest job, parking it in the processing list until
    /// [`complete`](Self::complete) is called.
    pub async fn dequeue(&self) -> Result<Option<ScreeningJob>, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: Option<String> = conn.rpoplpush(QUEUE_KEY, PROCESSING_KEY).await?;

        match result {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn complete(&self, job: &ScreeningJob) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(job)?;
        conn.lrem::<_, _, ()>(PROCESSING_KEY, 1, &payload).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let depth: u64 = conn.llen(QUEUE_KEY).await?;
        Ok(depth)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_attempt_keeps_ids() {
        let job = ScreeningJob::new(Uuid::from_u128(1), Uuid::from_u128(2));
        let retry = job.next_attempt().next_attempt();

        assert_eq!(retry.attempt, 2);
        assert_eq!(retry.verification_id, job.verification_id);
        assert_eq!(retry.worker_id, job.worker_id);
    }

    #[test]
    fn test_retries_exhausted_after_max_retries() {
        let first = ScreeningJob::new(Uuid::from_u128(1), Uuid::from_u128(2));
        assert!(!first.retries_exhausted(3));

        let third_retry = first.next_attempt().next_attempt().next_attempt();
        assert_eq!(third_retry.attempt, 3);
        assert!(third_retry.retries_exhausted(3));
        assert!(!first.next_attempt().next_attempt().retries_exhausted(3));
    }

    #[test]
    fn test_payload_without_attempt_defaults_to_zero() {
        let payload = format!(
            r#"{{"verification_id":"{}","worker_id":"{}"}}"#,
            Uuid::from_u128(1),
            Uuid::from_u128(2)
        );
        let job: ScreeningJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(job.attempt, 0);
    }
}
