//! # recipe-moderation
//!
//! The automated moderation pipeline: a pure content validation gate, the
//! durable-queue consumer that applies it to submitted recipes, and the
//! scheduler loop driving the consumer.

pub mod consumer;
pub mod scheduler;
pub mod validator;

pub use consumer::{ModerationConsumer, RecordOutcome};
pub use scheduler::spawn_consumer_loop;
pub use validator::{ContentValidator, ValidationResult};
