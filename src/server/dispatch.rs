//! Message dispatcher: maps one inbound envelope to a world mutation and the
//! events to fan out to everyone except the sender.

use serde_json::{Number, Value};
use uuid::Uuid;

use super::protocol::{ClientEnvelope, ImageScore, ServerEvent};
use super::world::{AttrMap, WorldState};

/// Overwrite any client-supplied `id` with the authoritative sender identity.
fn stamp_sender(bag: &mut AttrMap, sender: Uuid) {
    bag.insert("id".to_string(), Value::String(sender.to_string()));
}

/// Apply one inbound message and derive the outbound events.
///
/// The returned events are broadcast, in order, to every connection except
/// the sender. An empty vector means the message was absorbed (or dropped by
/// the best-effort validation rules) and nothing goes out.
pub fn dispatch(world: &mut WorldState, sender: Uuid, envelope: ClientEnvelope) -> Vec<ServerEvent> {
    match envelope {
        ClientEnvelope::PlayerUpdate { mut player } => {
            stamp_sender(&mut player, sender);
            world.upsert_player(sender, player.clone());
            vec![ServerEvent::PlayerUpdate { player }]
        }
        // Trails are ephemeral: relayed, never stored.
        ClientEnvelope::PlayerTrail { trail } => {
            vec![ServerEvent::PlayerTrail { trail }]
        }
        ClientEnvelope::PlaceBlock { block } => {
            world.append_block(block.clone());
            tracing::info!("stored new block, total blocks: {}", world.block_count());
            vec![ServerEvent::PlaceBlock { block }]
        }
        ClientEnvelope::PlaceIcon { mut icon, message } => {
            stamp_sender(&mut icon, sender);
            let mut events = vec![ServerEvent::PlaceIcon { icon }];
            if let Some(message) = message {
                world.push_chat_message(message.clone());
                events.push(ServerEvent::Message { message });
            }
            events
        }
        ClientEnvelope::ImageScoreUpdate { image_score } => {
            // Best effort: silently drop unless both id and score are usable.
            let id = match image_score.get("id") {
                Some(id) if !id.is_null() => id.clone(),
                _ => return Vec::new(),
            };
            let score = match image_score.get("score") {
                Some(Value::Number(score)) => score.clone(),
                _ => return Vec::new(),
            };
            // JSON object keys are strings, so a numeric id is stored under
            // its string form; the broadcast echoes the raw value.
            let key = match &id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            world.set_image_score(key, score.clone());
            vec![ServerEvent::ImageScoreUpdate {
                image_score: ImageScore { id, score },
            }]
        }
        ClientEnvelope::PlayerTextureUpdate { mut player } => {
            stamp_sender(&mut player, sender);
            vec![ServerEvent::PlayerTextureUpdate { player }]
        }
        ClientEnvelope::ScoreUpdate { mut score } => {
            stamp_sender(&mut score, sender);
            let value = match score.get("score") {
                Some(Value::Number(n)) => n.clone(),
                _ => Number::from(0),
            };
            world.set_player_score(sender, value);
            vec![ServerEvent::ScoreUpdate { score }]
        }
    }
}
