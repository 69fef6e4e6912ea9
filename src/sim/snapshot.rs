//! Read-only snapshot for the render collaborator
//!
//! Field names are camelCase on the wire so a JS adapter can consume the
//! JSON directly.

use serde::Serialize;

use super::item::ItemKind;
use super::kart::KartState;
use super::ranking::RankingEntry;
use super::state::RaceState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KartView {
    pub id: u32,
    pub name: String,
    pub world_x: f32,
    pub y_percent: f32,
    pub state: KartState,
    pub held_item_type: Option<ItemKind>,
    pub laps: u32,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardView {
    pub id: u32,
    pub world_x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Sprite frame (shells only animate)
    pub frame: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxView {
    pub id: u32,
    pub world_x: f32,
    pub lane: f32,
    pub active: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub time_ms: f64,
    pub generation: u32,
    pub paused: bool,
    /// Camera scroll offset in [0, W), for background mapping only
    pub camera_offset: f32,
    pub track_length: f32,
    pub karts: Vec<KartView>,
    pub hazards: Vec<HazardView>,
    pub boxes: Vec<BoxView>,
    pub ranking: Vec<RankingEntry>,
}

impl Snapshot {
    pub fn capture(state: &RaceState) -> Self {
        Self {
            time_ms: state.now_ms(),
            generation: state.generation(),
            paused: state.is_paused(),
            camera_offset: state.track.camera_offset(),
            track_length: state.track.length,
            karts: state
                .karts
                .iter()
                .map(|k| KartView {
                    id: k.id,
                    name: k.name.clone(),
                    world_x: k.world_x,
                    y_percent: k.y,
                    state: k.state,
                    held_item_type: k.held.map(|h| h.kind),
                    laps: k.laps,
                    score: k.distance,
                })
                .collect(),
            hazards: state
                .hazards
                .iter()
                .filter(|h| h.alive)
                .map(|h| HazardView {
                    id: h.id,
                    world_x: h.world_x,
                    y: h.y,
                    kind: h.kind,
                    frame: h.frame,
                })
                .collect(),
            boxes: state
                .boxes
                .iter()
                .map(|b| BoxView {
                    id: b.id,
                    world_x: b.world_x,
                    lane: b.lane,
                    active: b.active,
                })
                .collect(),
            ranking: state.ranking.entries().to_vec(),
        }
    }

    /// Kart ids in ranking order
    pub fn ranking_order(&self) -> Vec<u32> {
        self.ranking.iter().map(|e| e.kart_id).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BannerConfig;
    use crate::sim::item::HeldItem;

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = RaceState::new(BannerConfig::default(), 5);
        state.karts[2].held = Some(HeldItem::new(ItemKind::Shell, 0.0));
        let snap = state.snapshot();
        assert_eq!(snap.karts.len(), 8);
        assert_eq!(snap.karts[2].held_item_type, Some(ItemKind::Shell));
        assert_eq!(snap.boxes.len(), 4);
        assert!(snap.boxes.iter().all(|b| b.active));
        assert_eq!(snap.ranking_order().len(), 8);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let state = RaceState::new(BannerConfig::default(), 5);
        let json = state.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let kart = &value["karts"][0];
        assert!(kart["worldX"].is_number());
        assert!(kart["yPercent"].is_number());
        assert_eq!(kart["state"], "Pending");
        assert!(kart["heldItemType"].is_null());
        assert!(value["ranking"][0]["kartId"].is_number());
    }
}
