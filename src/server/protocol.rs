//! Wire protocol: inbound client envelopes and outbound server events.
//!
//! Frames are UTF-8 JSON objects tagged by a `type` field. Field names match
//! what the browser client sends and expects (`imageScore`, `imageScores`,
//! `existing_messages`, `player_id`), so renames here are load-bearing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use uuid::Uuid;

use super::world::{AttrMap, NewcomerSnapshot};

/// A decoded inbound message.
///
/// Anything that does not parse into one of these kinds (unknown `type`,
/// missing tag, malformed JSON) is dropped by the caller; the connection
/// stays open.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEnvelope {
    PlayerUpdate {
        #[serde(default)]
        player: AttrMap,
    },
    PlayerTrail {
        #[serde(default)]
        trail: Value,
    },
    PlaceBlock {
        #[serde(default)]
        block: AttrMap,
    },
    PlaceIcon {
        #[serde(default)]
        icon: AttrMap,
        #[serde(default)]
        message: Option<Value>,
    },
    ImageScoreUpdate {
        #[serde(default, rename = "imageScore")]
        image_score: AttrMap,
    },
    PlayerTextureUpdate {
        #[serde(default)]
        player: AttrMap,
    },
    ScoreUpdate {
        #[serde(default)]
        score: AttrMap,
    },
}

impl ClientEnvelope {
    /// Decode one text frame.
    pub fn parse(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// Normalized image score echoed to other participants.
#[derive(Debug, Clone, Serialize)]
pub struct ImageScore {
    pub id: Value,
    pub score: Number,
}

/// An outbound message derived by the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Catch-up snapshot, sent to a newcomer alone and never broadcast.
    Initialize {
        player_id: Uuid,
        existing_messages: Vec<Value>,
        #[serde(rename = "imageScores")]
        image_scores: HashMap<String, Number>,
        blocks: Vec<AttrMap>,
    },
    PlayerUpdate {
        player: AttrMap,
    },
    PlayerTrail {
        trail: Value,
    },
    PlaceBlock {
        block: AttrMap,
    },
    PlaceIcon {
        icon: AttrMap,
    },
    Message {
        message: Value,
    },
    ImageScoreUpdate {
        #[serde(rename = "imageScore")]
        image_score: ImageScore,
    },
    PlayerTextureUpdate {
        player: AttrMap,
    },
    ScoreUpdate {
        score: AttrMap,
    },
    PlayerDisconnect {
        id: Uuid,
    },
}

impl ServerEvent {
    /// Build the initialize event from a newcomer snapshot.
    pub fn initialize(player_id: Uuid, snapshot: NewcomerSnapshot) -> Self {
        Self::Initialize {
            player_id,
            existing_messages: snapshot.messages,
            image_scores: snapshot.image_scores,
            blocks: snapshot.blocks,
        }
    }

    /// Serialize to the wire representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server events serialize to JSON")
    }
}
