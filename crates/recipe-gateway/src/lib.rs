//! # recipe-gateway
//!
//! Real-time delivery subsystem: the per-process session registry, the
//! shared presence manager, the notification router, and the WebSocket
//! endpoint that ties them together.

pub mod connection;
pub mod notify;
pub mod presence;
pub mod protocol;
pub mod server;

pub use connection::{Connection, SessionRegistry};
pub use notify::{BroadcastStatusListener, NotificationRouter};
pub use presence::{PresenceManager, UserStatusListener};
pub use protocol::{Envelope, MessageType};
pub use server::{create_app, GatewayState};
