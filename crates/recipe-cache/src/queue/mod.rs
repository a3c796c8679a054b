//! Durable publish queue backed by a Redis Stream

mod publish_stream;

pub use publish_stream::{PublishQueue, QueueRecord};
