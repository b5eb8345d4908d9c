//! The authoritative in-memory world state shared by all participants.
//!
//! All mutation goes through the methods below; atomicity across concurrent
//! connections comes from the `Mutex` in [`super::state::AppState`]. The
//! payload bags (player attributes, block records, icon records) are opaque
//! to the relay, so they stay as raw JSON maps and are passed through.

use std::collections::{HashMap, VecDeque};

use serde_json::{Map, Number, Value};
use uuid::Uuid;

/// Free-form attribute bag carried in client payloads.
pub type AttrMap = Map<String, Value>;

/// Most recent chat messages retained for newcomers, newest first.
pub const CHAT_HISTORY_LIMIT: usize = 10;

/// Consistent point-in-time copy of the state a newcomer needs to catch up.
#[derive(Debug, Clone)]
pub struct NewcomerSnapshot {
    pub messages: Vec<Value>,
    pub image_scores: HashMap<String, Number>,
    pub blocks: Vec<AttrMap>,
}

/// World state: players, placed blocks, chat history, and scores.
pub struct WorldState {
    /// Participant identity -> player attribute bag. Created on the first
    /// `player_update` from that participant, removed on disconnect.
    players: HashMap<Uuid, AttrMap>,
    /// Append-only placed-block records, in server arrival order.
    blocks: Vec<AttrMap>,
    /// Chat messages, newest first, at most [`CHAT_HISTORY_LIMIT`].
    messages: VecDeque<Value>,
    /// Image identifier -> score. Latest write wins.
    image_scores: HashMap<String, Number>,
    /// Participant identity -> score. Latest write wins, removed on disconnect.
    player_scores: HashMap<Uuid, Number>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            blocks: Vec::new(),
            messages: VecDeque::new(),
            image_scores: HashMap::new(),
            player_scores: HashMap::new(),
        }
    }

    /// Take the catch-up snapshot for a newly connected participant.
    ///
    /// Runs under a single `&self` borrow (and, at runtime, a single lock
    /// hold), so the three collections are mutually consistent.
    pub fn snapshot_for_newcomer(&self) -> NewcomerSnapshot {
        NewcomerSnapshot {
            messages: self.messages.iter().cloned().collect(),
            image_scores: self.image_scores.clone(),
            blocks: self.blocks.clone(),
        }
    }

    /// Replace the full attribute bag for a participant.
    pub fn upsert_player(&mut self, id: Uuid, attributes: AttrMap) {
        self.players.insert(id, attributes);
    }

    /// Append a placed-block record. Blocks are never removed.
    pub fn append_block(&mut self, block: AttrMap) {
        self.blocks.push(block);
    }

    /// Insert a chat message at the front, evicting the oldest beyond the limit.
    pub fn push_chat_message(&mut self, message: Value) {
        self.messages.push_front(message);
        self.messages.truncate(CHAT_HISTORY_LIMIT);
    }

    pub fn set_image_score(&mut self, image_id: String, score: Number) {
        self.image_scores.insert(image_id, score);
    }

    pub fn set_player_score(&mut self, id: Uuid, score: Number) {
        self.player_scores.insert(id, score);
    }

    /// Remove everything keyed by a departing participant. Idempotent.
    pub fn remove_participant(&mut self, id: &Uuid) {
        self.players.remove(id);
        self.player_scores.remove(id);
    }

    pub fn contains_player(&self, id: &Uuid) -> bool {
        self.players.contains_key(id)
    }

    pub fn contains_player_score(&self, id: &Uuid) -> bool {
        self.player_scores.contains_key(id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}
