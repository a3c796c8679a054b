//! Shared endpoint dependencies.

use crate::connection::SessionRegistry;
use crate::presence::PresenceManager;
use recipe_common::JwtService;
use std::sync::Arc;

/// Everything the connection handler needs, injected at wiring time rather
/// than reached through process-wide statics
#[derive(Clone)]
pub struct GatewayState {
    registry: Arc<SessionRegistry>,
    presence: Arc<PresenceManager>,
    jwt: Arc<JwtService>,
}

impl GatewayState {
    pub fn new(
        registry: Arc<SessionRegistry>,
        presence: Arc<PresenceManager>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            registry,
            presence,
            jwt,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn presence(&self) -> &PresenceManager {
        &self.presence
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}
