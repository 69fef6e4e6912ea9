//! Collision resolver
//!
//! One ordered pass per tick:
//!
//! 1. hazards vs held items, then karts ramming a held item
//! 2. hazards vs karts
//! 3. projectiles vs stationary hazards
//! 4. karts vs item boxes
//! 5. kart vs kart pushing
//!
//! A hazard consumed in an earlier phase is dead for every later one, so a kart
//! can never lose its held item and be struck by the same hazard in one tick.
//! All contacts are rectangular tolerances measured with ring distance.

use glam::Vec2;

use super::kart::{AiMode, Kart};
use super::schedule::EventKind;
use super::state::RaceState;
use super::track::Track;

/// What the pass did, for logging and tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Karts whose held item was destroyed
    pub items_lost: Vec<u32>,
    /// Karts stunned this tick
    pub karts_hit: Vec<u32>,
    /// Projectile/stationary pairs destroyed
    pub hazard_pairs: u32,
    /// Karts that touched a box
    pub boxes_collected: Vec<u32>,
    /// Kart pairs pushed apart
    pub pushes: u32,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.items_lost.is_empty()
            && self.karts_hit.is_empty()
            && self.hazard_pairs == 0
            && self.boxes_collected.is_empty()
            && self.pushes == 0
    }
}

/// Rectangular overlap on the ring: `extent.x` longitudinal, `extent.y` lateral
#[inline]
pub fn overlaps(track: &Track, a: (f32, f32), b: (f32, f32), extent: Vec2) -> bool {
    track.separation(a.0, b.0) < extent.x && (a.1 - b.1).abs() < extent.y
}

/// Run every contact phase for this tick and drop dead hazards
pub fn resolve(state: &mut RaceState, now_ms: f64) -> CollisionReport {
    let mut report = CollisionReport::default();
    held_item_contacts(state, now_ms, &mut report);
    hazard_kart_contacts(state, now_ms, &mut report);
    hazard_hazard_contacts(state, &mut report);
    box_contacts(state, now_ms, &mut report);
    kart_kart_contacts(state, &mut report);
    state.hazards.retain(|h| h.alive);
    report
}

fn held_item_contacts(state: &mut RaceState, now_ms: f64, report: &mut CollisionReport) {
    let RaceState {
        config,
        track,
        karts,
        hazards,
        ..
    } = state;
    let extent = config.hitboxes.item_vs_kart;
    let offset = config.items.held_offset;
    let immunity = config.delays.self_immunity_ms;

    // Loose hazards knock carried items out of a kart's hands
    for hazard in hazards.iter_mut().filter(|h| h.alive) {
        let victim = karts.iter_mut().find(|k| {
            k.held.is_some()
                && k.is_on_track()
                && !hazard.ignores(k.id, now_ms, immunity)
                && overlaps(
                    track,
                    (hazard.world_x, hazard.y),
                    (k.held_item_x(track, offset), k.y),
                    extent,
                )
        });
        if let Some(kart) = victim {
            kart.held = None;
            hazard.alive = false;
            report.items_lost.push(kart.id);
            log::debug!("Hazard {} destroyed kart {}'s held item", hazard.id, kart.id);
        }
    }

    // Driving into someone else's trailing item stuns the driver
    for holder in 0..karts.len() {
        let (holder_id, held_x, held_y) = {
            let k = &karts[holder];
            if k.held.is_none() || !k.is_on_track() {
                continue;
            }
            (k.id, k.held_item_x(track, offset), k.y)
        };
        let crasher = karts.iter().position(|k| {
            k.id != holder_id
                && k.is_running()
                && overlaps(track, (k.world_x, k.y), (held_x, held_y), extent)
        });
        if let Some(c) = crasher {
            karts[c].stun(now_ms, config.delays.stun_ms, config.delays.hit_grace_ms);
            karts[holder].held = None;
            report.items_lost.push(holder_id);
            report.karts_hit.push(karts[c].id);
            log::debug!(
                "Kart {} rammed kart {}'s held item",
                karts[c].id,
                holder_id
            );
        }
    }
}

fn hazard_kart_contacts(state: &mut RaceState, now_ms: f64, report: &mut CollisionReport) {
    let RaceState {
        config,
        track,
        karts,
        hazards,
        ..
    } = state;
    let extent = config.hitboxes.item_vs_kart;
    let immunity = config.delays.self_immunity_ms;

    for hazard in hazards.iter_mut().filter(|h| h.alive) {
        let victim = karts.iter_mut().find(|k| {
            k.is_running()
                && !hazard.ignores(k.id, now_ms, immunity)
                && overlaps(track, (hazard.world_x, hazard.y), (k.world_x, k.y), extent)
        });
        if let Some(kart) = victim {
            kart.stun(now_ms, config.delays.stun_ms, config.delays.hit_grace_ms);
            hazard.alive = false;
            report.karts_hit.push(kart.id);
            log::debug!(
                "Kart {} ({}) hit by {:?} {}",
                kart.id,
                kart.name,
                hazard.kind,
                hazard.id
            );
        }
    }
}

fn hazard_hazard_contacts(state: &mut RaceState, report: &mut CollisionReport) {
    let extent = state.config.hitboxes.item_vs_kart;
    let track = &state.track;
    let hazards = &mut state.hazards;

    for i in 0..hazards.len() {
        if !hazards[i].alive || !hazards[i].is_projectile() {
            continue;
        }
        let shell = (hazards[i].world_x, hazards[i].y);
        let target = (0..hazards.len()).find(|&j| {
            j != i
                && hazards[j].alive
                && !hazards[j].is_projectile()
                && overlaps(track, shell, (hazards[j].world_x, hazards[j].y), extent)
        });
        if let Some(j) = target {
            hazards[i].alive = false;
            hazards[j].alive = false;
            report.hazard_pairs += 1;
            log::debug!("Hazards {} and {} destroyed each other", hazards[i].id, hazards[j].id);
        }
    }
}

fn box_contacts(state: &mut RaceState, now_ms: f64, report: &mut CollisionReport) {
    let RaceState {
        config,
        track,
        karts,
        boxes,
        schedule,
        ..
    } = state;
    let extent = config.hitboxes.item_box;

    for item_box in boxes.iter_mut().filter(|b| b.active) {
        let collector = karts.iter_mut().find(|k| {
            k.wants_item()
                && (overlaps(
                    track,
                    (item_box.world_x, item_box.lane),
                    (k.world_x, k.y),
                    extent,
                ) || (k.swept_past(track, item_box.world_x)
                    && (k.y - item_box.lane).abs() < extent.y))
        });
        if let Some(kart) = collector {
            item_box.consume(now_ms, config.delays.box_respawn_ms);
            kart.item_pending = true;
            schedule.push(
                now_ms + config.delays.item_grant_ms,
                EventKind::GrantItem { kart_id: kart.id },
            );
            report.boxes_collected.push(kart.id);
            log::debug!("Kart {} collected box {}", kart.id, item_box.id);
        }
    }
}

fn push(kart: &mut Kart, dir: f32, distance: f32, velocity: f32, track: &Track) {
    kart.vy = dir * velocity;
    kart.set_lane(kart.y + dir * distance, track);
    kart.target_vy = 0.0;
    kart.ai = AiMode::Cruising;
    kart.return_pending = false;
    kart.home_lane = kart.y;
}

fn kart_kart_contacts(state: &mut RaceState, report: &mut CollisionReport) {
    let extent = state.config.hitboxes.kart_vs_kart;
    let distance = state.config.karts.push_distance;
    let velocity = state.config.karts.push_velocity;
    let track = &state.track;
    let karts = &mut state.karts;

    for i in 0..karts.len() {
        for j in (i + 1)..karts.len() {
            let (a, b) = (&karts[i], &karts[j]);
            if !a.is_running() || !b.is_running() {
                continue;
            }
            if !overlaps(track, (a.world_x, a.y), (b.world_x, b.y), extent) {
                continue;
            }
            // Equal lanes send the later kart up
            let (upper, lower) = if a.y > b.y { (i, j) } else { (j, i) };
            push(&mut karts[upper], 1.0, distance, velocity, track);
            push(&mut karts[lower], -1.0, distance, velocity, track);
            report.pushes += 1;
        }
    }
}
