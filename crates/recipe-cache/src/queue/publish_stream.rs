//! Recipe publish queue on a Redis Stream.
//!
//! The publish flow appends one record per submitted recipe; the moderation
//! consumer claims records through a competing consumer group and
//! acknowledges them once settled. Unacknowledged records stay in the
//! group's pending list and are redelivered on the next read.

use crate::pool::{RedisPool, RedisResult};
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;

/// Stream key holding queued submissions
const STREAM_KEY: &str = "recipe:stream:publish";
/// Consumer group the moderation workers claim records under
const GROUP_NAME: &str = "recipe-moderation";

/// A single claimed stream record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    /// Stream entry id (opaque, ordered)
    pub id: String,
    pub recipe_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Set only on the bootstrap sentinel that created the stream
    pub init: bool,
}

impl QueueRecord {
    /// Extract the required fields, if both are present and parsable
    #[must_use]
    pub fn fields(&self) -> Option<(i64, i64)> {
        Some((self.recipe_id?, self.user_id?))
    }
}

/// Handle on the durable publish queue
#[derive(Clone)]
pub struct PublishQueue {
    pool: RedisPool,
    consumer_name: String,
}

impl PublishQueue {
    /// Create a queue handle claiming records under `consumer_name`
    #[must_use]
    pub fn new(pool: RedisPool, consumer_name: impl Into<String>) -> Self {
        Self {
            pool,
            consumer_name: consumer_name.into(),
        }
    }

    /// Ensure the stream and the consumer group exist.
    ///
    /// Creates the stream with a bootstrap sentinel record if absent, then
    /// creates the group positioned at the start of the log. A group that
    /// already exists (`BUSYGROUP`) is treated as success.
    pub async fn ensure_group(&self) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;

        let exists: bool = conn.exists(STREAM_KEY).await?;
        if !exists {
            conn.xadd::<_, _, _, _, String>(STREAM_KEY, "*", &[("init", "true")])
                .await?;
            tracing::info!(stream = STREAM_KEY, "Created publish stream");
        }

        match conn
            .xgroup_create::<_, _, _, ()>(STREAM_KEY, GROUP_NAME, "0")
            .await
        {
            Ok(()) => {
                tracing::info!(group = GROUP_NAME, "Created consumer group");
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a submission record; returns the stream entry id
    pub async fn enqueue(&self, recipe_id: i64, user_id: i64) -> RedisResult<String> {
        let mut conn = self.pool.get().await?;
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let id: String = conn
            .xadd(
                STREAM_KEY,
                "*",
                &[
                    ("recipeId", recipe_id.to_string()),
                    ("userId", user_id.to_string()),
                    ("timestamp", timestamp),
                ],
            )
            .await?;

        tracing::info!(recipe_id, user_id, entry_id = %id, "Recipe queued for moderation");
        Ok(id)
    }

    /// Read up to `count` records for this consumer, blocking up to
    /// `block_ms` milliseconds when nothing new is ready.
    ///
    /// Records claimed on an earlier poll but never acknowledged come back
    /// first; only the remaining capacity is filled with fresh entries.
    /// This is what turns an omitted ack into a retry on the next cycle.
    pub async fn read_batch(&self, count: usize, block_ms: usize) -> RedisResult<Vec<QueueRecord>> {
        let mut conn = self.pool.get().await?;

        let pending = StreamReadOptions::default()
            .group(GROUP_NAME, &self.consumer_name)
            .count(count);
        let reply: StreamReadReply = conn
            .xread_options(&[STREAM_KEY], &["0"], &pending)
            .await?;
        let mut records = collect_records(reply);

        if records.len() < count {
            let fresh = StreamReadOptions::default()
                .group(GROUP_NAME, &self.consumer_name)
                .count(count - records.len())
                .block(block_ms);
            let reply: StreamReadReply = conn
                .xread_options(&[STREAM_KEY], &[">"], &fresh)
                .await?;
            records.extend(collect_records(reply));
        }

        Ok(records)
    }

    /// Acknowledge a record as settled.
    ///
    /// Idempotent: acknowledging an already-acknowledged id is a no-op.
    pub async fn ack(&self, entry_id: &str) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;
        conn.xack::<_, _, _, i64>(STREAM_KEY, GROUP_NAME, &[entry_id])
            .await?;
        Ok(())
    }
}

fn collect_records(reply: StreamReadReply) -> Vec<QueueRecord> {
    let mut records = Vec::new();
    for key in reply.keys {
        for entry in key.ids {
            records.push(QueueRecord {
                id: entry.id.clone(),
                recipe_id: entry.get("recipeId"),
                user_id: entry.get("userId"),
                init: entry.get::<String>("init").is_some(),
            });
        }
    }
    records
}

impl std::fmt::Debug for PublishQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishQueue")
            .field("consumer_name", &self.consumer_name)
            .finish()
    }
}
