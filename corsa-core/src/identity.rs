use corsa_domain::Actor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity the host application has already authenticated for a
/// request. The engine trusts it as-is and never re-authenticates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub id: Uuid,
    pub role: Actor,
}

impl AuthenticatedActor {
    pub fn rider(id: Uuid) -> Self {
        Self {
            id,
            role: Actor::Rider,
        }
    }

    pub fn driver(id: Uuid) -> Self {
        Self {
            id,
            role: Actor::Driver,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Self {
            id,
            role: Actor::Admin,
        }
    }

    /// Internal actor for engine-driven actions such as expiry sweeps
    pub fn system() -> Self {
        Self {
            id: Uuid::nil(),
            role: Actor::System,
        }
    }
}
