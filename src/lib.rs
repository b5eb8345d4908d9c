//! Real-time state-synchronization relay for a multiplayer world.
//!
//! This library provides a WebSocket server that assigns each connection a
//! server-side identity, keeps a shared in-memory world state (players,
//! placed blocks, chat history, scores), and broadcasts every state-changing
//! event to all other connected participants.

pub mod server;

// shared library
pub mod common;
