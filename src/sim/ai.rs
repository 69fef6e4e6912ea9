//! AI controller
//!
//! One decision per running kart per tick, resolved in strict priority order:
//!
//! 1. hazard avoidance
//! 2. overtaking
//! 3. item-box seeking
//! 4. wandering
//! 5. cruising / returning to the pre-dodge lane
//!
//! The first rule that matches wins. Every rule only sets `target_vy`; the
//! kart's damped lateral filter turns that into smooth steering.

use rand::Rng;

use super::item::{Hazard, ItemBox};
use super::kart::{AiMode, Kart};
use super::state::{sample_f32, sample_ms};
use super::track::Track;
use crate::config::AiConfig;

/// Lateral direction: +1 up, -1 down
pub type Direction = f32;

/// Outcome of the sensing pass, before any state is touched
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Avoid(Direction),
    Overtake(Direction),
    SeekBox(Direction),
    /// No stimulus: wander or cruise, depending on timers
    Idle,
}

/// Sense the surroundings of `karts[index]` and pick the winning rule
pub fn decide(
    index: usize,
    karts: &[Kart],
    hazards: &[Hazard],
    boxes: &[ItemBox],
    track: &Track,
    ai: &AiConfig,
) -> Decision {
    let kart = &karts[index];

    if let Some(dir) = hazard_ahead(kart, hazards, track, ai) {
        return Decision::Avoid(dir);
    }
    if let Some(dir) = kart_ahead(kart, karts, track, ai) {
        return Decision::Overtake(dir);
    }
    if let Some(dir) = box_ahead(kart, boxes, track, ai) {
        return Decision::SeekBox(dir);
    }
    Decision::Idle
}

/// First live stationary hazard inside the detection cone
fn hazard_ahead(kart: &Kart, hazards: &[Hazard], track: &Track, ai: &AiConfig) -> Option<Direction> {
    let hazard = hazards.iter().find(|h| {
        if !h.alive || h.is_projectile() {
            return false;
        }
        let ahead = track.ahead(kart.world_x, h.world_x);
        ahead > 0.0 && ahead < ai.detection_range && (h.y - kart.y).abs() < ai.lane_tolerance
    })?;

    // Steer away from the hazard's side, unless that runs us off the road
    let natural: Direction = if hazard.y > kart.y { -1.0 } else { 1.0 };
    let dir = if natural > 0.0 {
        if track.near_top(kart.y, ai.dodge_edge_margin) { -1.0 } else { 1.0 }
    } else if track.near_bottom(kart.y, ai.dodge_edge_margin) {
        1.0
    } else {
        -1.0
    };
    Some(dir)
}

fn kart_ahead(kart: &Kart, karts: &[Kart], track: &Track, ai: &AiConfig) -> Option<Direction> {
    let other = karts.iter().find(|o| {
        if o.id == kart.id || !o.is_running() {
            return false;
        }
        let ahead = track.ahead(kart.world_x, o.world_x);
        ahead > 0.0 && ahead < ai.overtake_range && (o.y - kart.y).abs() < ai.overtake_min_distance
    })?;

    let mut dir: Direction = if kart.y > other.y { 1.0 } else { -1.0 };
    if track.near_top(kart.y, ai.overtake_edge_margin) {
        dir = -1.0;
    }
    if track.near_bottom(kart.y, ai.overtake_edge_margin) {
        dir = 1.0;
    }
    Some(dir)
}

fn box_ahead(kart: &Kart, boxes: &[ItemBox], track: &Track, ai: &AiConfig) -> Option<Direction> {
    if kart.held.is_some() || kart.item_pending {
        return None;
    }
    boxes.iter().find_map(|b| {
        if !b.active {
            return None;
        }
        let ahead = track.ahead(kart.world_x, b.world_x);
        if ahead <= 0.0 || ahead >= ai.box_range {
            return None;
        }
        let diff = b.lane - kart.y;
        (diff.abs() > ai.box_deadband).then_some(diff.signum())
    })
}

/// Apply a decision to the kart's AI state and `target_vy`, then run the
/// lateral filter for this tick.
pub fn steer<R: Rng>(
    kart: &mut Kart,
    decision: Decision,
    track: &Track,
    ai: &AiConfig,
    rng: &mut R,
    now_ms: f64,
    dt: f32,
) {
    match decision {
        Decision::Avoid(dir) => {
            if kart.ai != AiMode::Dodging {
                kart.ai = AiMode::Dodging;
                kart.home_lane = kart.y;
                kart.return_pending = true;
                kart.dodge_intensity =
                    sample_f32(rng, ai.dodge_intensity_min, ai.dodge_intensity_max);
            }
            kart.target_vy = dir * kart.dodge_intensity;
        }
        Decision::Overtake(dir) => {
            kart.ai = AiMode::Overtaking;
            kart.target_vy = dir * ai.overtake_side_speed;
            // Overtaking settles on a new line
            kart.home_lane = kart.y;
            kart.return_pending = false;
        }
        Decision::SeekBox(dir) => {
            kart.ai = AiMode::SeekingBox;
            kart.target_vy = dir * ai.box_seek_intensity;
        }
        Decision::Idle => idle(kart, track, ai, rng, now_ms),
    }

    log::trace!(
        "kart {} ({}) {:?} target_vy={:.1}",
        kart.id,
        kart.name,
        kart.ai,
        kart.target_vy
    );
    kart.apply_lateral_filter(ai.smoothing, dt);
}

/// Rules 4 and 5: wander on a random cadence, otherwise settle
fn idle<R: Rng>(kart: &mut Kart, track: &Track, ai: &AiConfig, rng: &mut R, now_ms: f64) {
    if now_ms > kart.next_wander_ms {
        kart.next_wander_ms =
            now_ms + sample_ms(rng, ai.wander_interval_min_ms, ai.wander_interval_max_ms);
        kart.wander_until_ms =
            now_ms + sample_ms(rng, ai.wander_duration_min_ms, ai.wander_duration_max_ms);

        let mut dir: Direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        if track.near_top(kart.y, ai.wander_edge_margin) {
            dir = -1.0;
        }
        if track.near_bottom(kart.y, ai.wander_edge_margin) {
            dir = 1.0;
        }
        kart.wander_vy = dir * ai.wander_speed;
        kart.ai = AiMode::Wandering;
    }

    if now_ms < kart.wander_until_ms {
        kart.target_vy = kart.wander_vy;
        // Don't drift back once the wander is over
        kart.home_lane = kart.y;
        return;
    }

    if kart.ai == AiMode::Dodging {
        kart.ai = AiMode::Returning;
    }

    if kart.ai == AiMode::Returning && kart.return_pending {
        let diff = kart.home_lane - kart.y;
        if diff.abs() < ai.return_snap_distance {
            kart.target_vy = 0.0;
            kart.set_lane(kart.home_lane, track);
            kart.return_pending = false;
            kart.ai = AiMode::Cruising;
        } else {
            kart.target_vy = diff.signum() * ai.return_lane_speed;
        }
        return;
    }

    kart.target_vy = 0.0;
    kart.ai = AiMode::Cruising;
    kart.return_pending = false;
    kart.home_lane = kart.y;
}
