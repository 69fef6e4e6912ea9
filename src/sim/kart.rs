//! Kart agent: physical state and lifecycle state machine
//!
//! `Pending -> Running -> Hit -> Running -> ...`. Karts are created once per
//! world generation and never destroyed individually.

use serde::{Deserialize, Serialize};

use super::item::HeldItem;
use super::track::Track;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KartState {
    /// Waiting for the staggered spawn scheduler
    Pending,
    /// Racing under AI control
    Running,
    /// Stunned: AI disabled, reduced speed
    Hit,
}

/// AI sub-state, mostly informational except for dodge/return bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiMode {
    #[default]
    Cruising,
    Dodging,
    Overtaking,
    SeekingBox,
    Wandering,
    /// Easing back to the lane held before a dodge
    Returning,
}

/// What happened to a kart during one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Passed the ring seam (`W -> 0`)
    pub wrapped: bool,
    /// Passed the finish line
    pub crossed_finish: bool,
}

/// A racing kart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kart {
    pub id: u32,
    /// Character from the roster
    pub name: String,
    /// Track-relative longitudinal position, always in [0, W)
    pub world_x: f32,
    /// Lateral lane position, always in [lane_min, lane_max]
    pub y: f32,
    /// Longitudinal speed (units/s)
    pub speed: f32,
    pub vy: f32,
    pub target_vy: f32,
    pub state: KartState,
    pub ai: AiMode,
    /// Lane to return to once a dodge is over
    pub home_lane: f32,
    pub return_pending: bool,
    /// Lateral speed for the current dodge episode
    pub dodge_intensity: f32,
    pub held: Option<HeldItem>,
    /// A box was touched and the item has not been granted yet
    pub item_pending: bool,
    /// Virtual time after which the held item is thrown
    pub throw_at_ms: f64,
    pub stun_until_ms: f64,
    pub next_wander_ms: f64,
    pub wander_until_ms: f64,
    pub wander_vy: f32,
    /// Cumulative distance travelled; the ranking score
    pub distance: f64,
    pub laps: u32,
    /// Longitudinal distance covered by the last integration step
    pub last_move: f32,
}

impl Kart {
    pub fn new(id: u32, name: impl Into<String>, lane: f32, start_x: f32) -> Self {
        Self {
            id,
            name: name.into(),
            world_x: start_x,
            y: lane,
            speed: 0.0,
            vy: 0.0,
            target_vy: 0.0,
            state: KartState::Pending,
            ai: AiMode::Cruising,
            home_lane: lane,
            return_pending: false,
            dodge_intensity: 30.0,
            held: None,
            item_pending: false,
            throw_at_ms: 0.0,
            stun_until_ms: 0.0,
            next_wander_ms: 0.0,
            wander_until_ms: 0.0,
            wander_vy: 0.0,
            distance: 0.0,
            laps: 0,
            last_move: 0.0,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == KartState::Running
    }

    /// Running or stunned: physically present on the ring
    #[inline]
    pub fn is_on_track(&self) -> bool {
        matches!(self.state, KartState::Running | KartState::Hit)
    }

    /// Can this kart collect an item box right now?
    #[inline]
    pub fn wants_item(&self) -> bool {
        self.is_running() && self.held.is_none() && !self.item_pending
    }

    /// Blend a fresh speed sample with the current one so laps don't jump
    pub fn blend_speed(&mut self, sample: f32) {
        self.speed = if self.speed > 0.0 {
            (self.speed + sample) / 2.0
        } else {
            sample
        };
    }

    /// `Pending -> Running`. No-op for karts already released.
    pub fn release(&mut self, sampled_speed: f32) -> bool {
        if self.state != KartState::Pending {
            return false;
        }
        self.blend_speed(sampled_speed);
        self.state = KartState::Running;
        self.vy = 0.0;
        self.target_vy = 0.0;
        self.ai = AiMode::Cruising;
        true
    }

    /// `Running -> Hit`. A held item is kept but its throw is pushed past the stun.
    pub fn stun(&mut self, now_ms: f64, stun_ms: f64, grace_ms: f64) {
        self.state = KartState::Hit;
        self.vy = 0.0;
        self.target_vy = 0.0;
        self.ai = AiMode::Cruising;
        self.return_pending = false;
        self.stun_until_ms = now_ms + stun_ms;
        if self.held.is_some() {
            self.throw_at_ms = self.stun_until_ms + grace_ms;
        }
    }

    /// `Hit -> Running` with a freshly sampled speed
    pub fn recover(&mut self, sampled_speed: f32) {
        self.state = KartState::Running;
        self.speed = sampled_speed;
        self.home_lane = self.y;
    }

    /// First-order damped lateral filter toward `target_vy`
    pub fn apply_lateral_filter(&mut self, smoothing: f32, dt: f32) {
        self.vy += (self.target_vy - self.vy) * smoothing * dt;
    }

    /// Set the lateral position, clamping to the lanes and killing `vy` on clamp
    pub fn set_lane(&mut self, y: f32, track: &Track) {
        let (clamped, hit_edge) = track.clamp_lane(y);
        self.y = clamped;
        if hit_edge {
            self.vy = 0.0;
        }
    }

    /// Integrate one step. Stunned karts crawl at `stun_factor` of their speed
    /// and drift no further laterally.
    pub fn integrate(&mut self, track: &Track, dt: f32, stun_factor: f32) -> Motion {
        let speed = match self.state {
            KartState::Running => self.speed,
            KartState::Hit => self.speed * stun_factor,
            KartState::Pending => {
                self.last_move = 0.0;
                return Motion::default();
            }
        };
        let moved = speed * dt;
        let from = self.world_x;
        let raw = from + moved;

        self.world_x = track.wrap(raw);
        self.distance += moved as f64;
        self.last_move = moved;

        if self.state == KartState::Running {
            self.set_lane(self.y + self.vy * dt, track);
        }

        Motion {
            wrapped: raw >= track.length,
            crossed_finish: track.crosses_finish(from, moved),
        }
    }

    /// Did the last step carry the kart over longitudinal position `x`?
    pub fn swept_past(&self, track: &Track, x: f32) -> bool {
        if self.last_move <= 0.0 {
            return false;
        }
        let from = track.wrap(self.world_x - self.last_move);
        track.ahead(from, x) <= self.last_move
    }

    /// Where this kart's trailing held item sits on the ring
    pub fn held_item_x(&self, track: &Track, held_offset: f32) -> f32 {
        track.wrap(self.world_x + held_offset)
    }
}
