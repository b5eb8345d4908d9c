//! WebSocket world-state relay server implementation.

mod broadcast;
mod dispatch;
mod handler;
pub mod protocol;
mod registry;
mod runner;
mod signal;
mod state;
mod world;

pub use registry::{ConnectionRegistry, PushError, Recipient};
pub use runner::{app, run_server};
pub use state::AppState;
pub use world::WorldState;
