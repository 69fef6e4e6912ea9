//! Item subsystem: boxes, held items and thrown hazards
//!
//! Boxes never die, they cycle active/inactive. Hazards are born when a kart
//! throws its held item and die on collision or expiry.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::kart::Kart;
use super::track::Track;
use crate::config::{BoxPlacement, DelayConfig, ItemConfig};

/// Item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Stationary hazard, dropped behind the kart
    Banana,
    /// Projectile hazard, fired ahead of the kart
    Shell,
}

impl ItemKind {
    pub fn is_projectile(self) -> bool {
        self == ItemKind::Shell
    }
}

/// An item carried by a kart, trailing at a fixed offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeldItem {
    pub kind: ItemKind,
    pub granted_at_ms: f64,
}

impl HeldItem {
    pub fn new(kind: ItemKind, granted_at_ms: f64) -> Self {
        Self {
            kind,
            granted_at_ms,
        }
    }
}

/// A thrown item loose on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub kind: ItemKind,
    pub world_x: f32,
    pub y: f32,
    /// (longitudinal, lateral) velocity
    pub vel: Vec2,
    /// Kart that threw it
    pub owner: u32,
    pub created_at_ms: f64,
    pub alive: bool,
    /// Longitudinal distance covered so far
    pub traveled: f32,
    /// Sprite frame, 1-based; presentational only
    pub frame: u8,
    frame_at_ms: f64,
}

impl Hazard {
    pub fn new(
        id: u32,
        kind: ItemKind,
        owner: u32,
        world_x: f32,
        y: f32,
        vel: Vec2,
        now_ms: f64,
    ) -> Self {
        Self {
            id,
            kind,
            world_x,
            y,
            vel,
            owner,
            created_at_ms: now_ms,
            alive: true,
            traveled: 0.0,
            frame: 1,
            frame_at_ms: now_ms,
        }
    }

    #[inline]
    pub fn is_projectile(&self) -> bool {
        self.kind.is_projectile()
    }

    /// Still inside the thrower's grace window?
    #[inline]
    pub fn ignores(&self, kart_id: u32, now_ms: f64, immunity_ms: f64) -> bool {
        self.owner == kart_id && now_ms - self.created_at_ms < immunity_ms
    }

    /// Move one step. Bananas are fixed in world coordinates; shells fly
    /// forward and bounce off the lane edges.
    pub fn advance(&mut self, track: &Track, dt: f32) {
        if !self.is_projectile() {
            return;
        }
        let dx = self.vel.x * dt;
        self.world_x = track.wrap(self.world_x + dx);
        self.traveled += dx.abs();

        let y = self.y + self.vel.y * dt;
        if y > track.lane_max {
            self.y = (2.0 * track.lane_max - y).max(track.lane_min);
            self.vel.y = -self.vel.y;
        } else if y < track.lane_min {
            self.y = (2.0 * track.lane_min - y).min(track.lane_max);
            self.vel.y = -self.vel.y;
        } else {
            self.y = y;
        }
    }

    /// Cycle the sprite frame; has no effect on collisions
    pub fn animate(&mut self, now_ms: f64, frame_ms: f64, frames: u8) {
        if !self.is_projectile() || now_ms - self.frame_at_ms < frame_ms {
            return;
        }
        self.frame = if self.frame >= frames { 1 } else { self.frame + 1 };
        self.frame_at_ms = now_ms;
    }

    /// Lifetime exceeded or out of range
    pub fn expired(&self, now_ms: f64, delays: &DelayConfig, items: &ItemConfig) -> bool {
        let age = now_ms - self.created_at_ms;
        match self.kind {
            ItemKind::Banana => age >= delays.banana_life_ms,
            ItemKind::Shell => {
                age >= delays.projectile_life_ms || self.traveled >= items.projectile_max_travel
            }
        }
    }
}

/// A fixed item box on the ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBox {
    pub id: u32,
    pub world_x: f32,
    pub lane: f32,
    pub active: bool,
    pub reactivate_at_ms: f64,
}

impl ItemBox {
    pub fn new(id: u32, placement: BoxPlacement) -> Self {
        Self {
            id,
            world_x: placement.world_x,
            lane: placement.lane,
            active: true,
            reactivate_at_ms: 0.0,
        }
    }

    /// Deactivate after a kart touched it
    pub fn consume(&mut self, now_ms: f64, respawn_ms: f64) {
        self.active = false;
        self.reactivate_at_ms = now_ms + respawn_ms;
    }

    /// Reactivate once the cooldown is over. Returns true on reactivation.
    pub fn refresh(&mut self, now_ms: f64) -> bool {
        if !self.active && now_ms >= self.reactivate_at_ms {
            self.active = true;
            return true;
        }
        false
    }
}

/// Pick a random item for a grant
pub fn roll_item<R: Rng>(rng: &mut R, banana_chance: f64) -> ItemKind {
    if rng.random_bool(banana_chance) {
        ItemKind::Banana
    } else {
        ItemKind::Shell
    }
}

/// Put an item in a kart's hands. Silent no-op if it already holds one.
pub fn grant(kart: &mut Kart, kind: ItemKind, now_ms: f64, throw_at_ms: f64) -> bool {
    kart.item_pending = false;
    if kart.held.is_some() {
        return false;
    }
    kart.held = Some(HeldItem::new(kind, now_ms));
    kart.throw_at_ms = throw_at_ms;
    true
}

/// Release the kart's held item onto the track.
/// Returns `None` (and does nothing) when the kart holds nothing.
pub fn throw_held<R: Rng>(
    kart: &mut Kart,
    id: u32,
    track: &Track,
    items: &ItemConfig,
    rng: &mut R,
    now_ms: f64,
) -> Option<Hazard> {
    let held = kart.held.take()?;
    let hazard = match held.kind {
        ItemKind::Banana => Hazard::new(
            id,
            ItemKind::Banana,
            kart.id,
            kart.held_item_x(track, items.held_offset),
            kart.y,
            Vec2::ZERO,
            now_ms,
        ),
        ItemKind::Shell => {
            let drift = if items.projectile_drift > 0.0 {
                rng.random_range(-items.projectile_drift..=items.projectile_drift)
            } else {
                0.0
            };
            Hazard::new(
                id,
                ItemKind::Shell,
                kart.id,
                track.wrap(kart.world_x + items.shell_launch_offset),
                kart.y,
                Vec2::new(items.projectile_speed, drift),
                now_ms,
            )
        }
    };
    Some(hazard)
}
