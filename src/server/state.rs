//! Shared server state.

use tokio::sync::Mutex;

use super::registry::ConnectionRegistry;
use super::world::WorldState;

/// Shared application state
///
/// One instance lives behind an `Arc` for the whole process. Every
/// connection task goes through these two mutexes, which serializes all
/// registry and world mutations.
pub struct AppState {
    /// Live connections and their assigned participant identities
    pub registry: Mutex<ConnectionRegistry>,
    /// The authoritative world state shared by all participants
    pub world: Mutex<WorldState>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(ConnectionRegistry::new()),
            world: Mutex::new(WorldState::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
