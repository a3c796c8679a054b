//! Wire protocol for the live connection

mod messages;

pub use messages::{Envelope, MessageType};
