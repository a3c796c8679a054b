//! Live connection handling

mod connection;
mod registry;

pub use connection::{Connection, Outbound};
pub use registry::SessionRegistry;
