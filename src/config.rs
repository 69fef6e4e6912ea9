//! Banner configuration
//!
//! Every tunable the simulation reads, grouped the way the banner's designers
//! think about them. Values are assumed sane; [`BannerConfig::sanitized`] only
//! fixes physically impossible combinations (inverted bands, empty track).

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Ring geometry and camera scroll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Lap length in world units
    pub length: f32,
    /// Finish line position on the ring (laps count when crossed)
    pub finish_line: f32,
    /// Lowest lateral lane position
    pub lane_min: f32,
    /// Highest lateral lane position
    pub lane_max: f32,
    /// Camera scroll speed (units/s), purely presentational
    pub scroll_speed: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            length: TRACK_LENGTH,
            finish_line: 0.0,
            lane_min: LANE_MIN,
            lane_max: LANE_MAX,
            scroll_speed: ROAD_SCROLL_SPEED,
        }
    }
}

/// Kart roster and physical behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KartConfig {
    pub count: usize,
    /// Cruise speed band, resampled on release, recovery and lap wrap
    pub speed_min: f32,
    pub speed_max: f32,
    /// Speed multiplier while stunned
    pub stun_speed_factor: f32,
    /// Delay band between two staggered releases (ms)
    pub spawn_delay_min_ms: f64,
    pub spawn_delay_max_ms: f64,
    /// Lateral nudge applied to each kart of a touching pair
    pub push_distance: f32,
    /// Lateral velocity given to each kart of a touching pair
    pub push_velocity: f32,
}

impl Default for KartConfig {
    fn default() -> Self {
        Self {
            count: ROSTER.len(),
            speed_min: KART_SPEED_MIN,
            speed_max: KART_SPEED_MAX,
            stun_speed_factor: 0.25,
            spawn_delay_min_ms: 500.0,
            spawn_delay_max_ms: 2000.0,
            push_distance: 0.5,
            push_velocity: 10.0,
        }
    }
}

/// Durations, all in virtual milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub stun_ms: f64,
    /// Extra wait after a stun before a held item may be thrown
    pub hit_grace_ms: f64,
    pub box_respawn_ms: f64,
    /// Wait between touching a box and the item appearing
    pub item_grant_ms: f64,
    pub banana_life_ms: f64,
    pub projectile_life_ms: f64,
    /// Window during which a hazard ignores its own thrower
    pub self_immunity_ms: f64,
    /// Fresh throw delay band after recovering with an overdue item
    pub recover_throw_min_ms: f64,
    pub recover_throw_max_ms: f64,
    /// How long a rank change stays flagged
    pub rank_trend_ms: f64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            stun_ms: 2000.0,
            hit_grace_ms: 1000.0,
            box_respawn_ms: 2000.0,
            item_grant_ms: 3000.0,
            banana_life_ms: 40_000.0,
            projectile_life_ms: 8000.0,
            self_immunity_ms: 2000.0,
            recover_throw_min_ms: 1000.0,
            recover_throw_max_ms: 3000.0,
            rank_trend_ms: 1500.0,
        }
    }
}

/// AI steering parameters, listed by rule priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Hold band before an item is thrown (ms)
    pub hold_min_ms: f64,
    pub hold_max_ms: f64,

    // Hazard avoidance
    pub detection_range: f32,
    pub lane_tolerance: f32,
    pub dodge_intensity_min: f32,
    pub dodge_intensity_max: f32,
    pub dodge_edge_margin: f32,

    // Overtaking
    pub overtake_range: f32,
    pub overtake_min_distance: f32,
    pub overtake_side_speed: f32,
    pub overtake_edge_margin: f32,

    // Item seeking
    pub box_range: f32,
    pub box_seek_intensity: f32,
    pub box_deadband: f32,

    // Wandering
    pub wander_interval_min_ms: f64,
    pub wander_interval_max_ms: f64,
    pub wander_duration_min_ms: f64,
    pub wander_duration_max_ms: f64,
    pub wander_speed: f32,
    pub wander_edge_margin: f32,
    /// Band for the very first wander after world init (ms)
    pub first_wander_min_ms: f64,
    pub first_wander_max_ms: f64,

    // Cruising / return
    pub return_lane_speed: f32,
    pub return_snap_distance: f32,

    /// Gain of the lateral filter `vy += (target - vy) * k * dt`
    pub smoothing: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            hold_min_ms: 500.0,
            hold_max_ms: 8000.0,

            detection_range: 250.0,
            lane_tolerance: 12.0,
            dodge_intensity_min: 20.0,
            dodge_intensity_max: 50.0,
            dodge_edge_margin: 2.0,

            overtake_range: 120.0,
            overtake_min_distance: 12.0,
            overtake_side_speed: 10.0,
            overtake_edge_margin: 5.0,

            box_range: 400.0,
            box_seek_intensity: 25.0,
            box_deadband: 2.0,

            wander_interval_min_ms: 2000.0,
            wander_interval_max_ms: 6000.0,
            wander_duration_min_ms: 500.0,
            wander_duration_max_ms: 1500.0,
            wander_speed: 4.0,
            wander_edge_margin: 8.0,
            first_wander_min_ms: 1000.0,
            first_wander_max_ms: 5000.0,

            return_lane_speed: 20.0,
            return_snap_distance: 1.0,

            smoothing: 5.0,
        }
    }
}

/// Contact tolerances: `x` is longitudinal, `y` lateral (full half-extents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxConfig {
    pub kart_vs_kart: Vec2,
    pub item_vs_kart: Vec2,
    pub item_box: Vec2,
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            kart_vs_kart: Vec2::new(60.0, 5.0),
            item_vs_kart: Vec2::new(40.0, 5.0),
            item_box: Vec2::new(10.0, 8.0),
        }
    }
}

/// Where an item box sits on the ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlacement {
    pub world_x: f32,
    pub lane: f32,
}

/// Item boxes, held items and thrown hazards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub boxes: Vec<BoxPlacement>,
    /// Chance a granted item is a banana rather than a shell
    pub banana_chance: f64,
    /// Longitudinal offset of a held item relative to its kart (trails behind)
    pub held_offset: f32,
    /// Offset ahead of the kart where a shell is launched
    pub shell_launch_offset: f32,
    pub projectile_speed: f32,
    /// Lateral drift band for shells is `[-drift, drift]`
    pub projectile_drift: f32,
    /// Shells vanish after travelling this far
    pub projectile_max_travel: f32,
    /// Shell sprite frame period (ms) and frame count
    pub anim_frame_ms: f64,
    pub anim_frames: u8,
}

impl Default for ItemConfig {
    fn default() -> Self {
        let lane_span = LANE_MAX - LANE_MIN;
        let boxes = (0..4)
            .map(|i| BoxPlacement {
                world_x: TRACK_LENGTH / 2.0,
                lane: LANE_MIN + i as f32 * lane_span / 3.0,
            })
            .collect();
        Self {
            boxes,
            banana_chance: 0.5,
            held_offset: -50.0,
            shell_launch_offset: 50.0,
            projectile_speed: PROJECTILE_SPEED,
            projectile_drift: 1.5,
            projectile_max_travel: TRACK_LENGTH * PROJECTILE_TRAVEL_FRACTION,
            anim_frame_ms: 100.0,
            anim_frames: 3,
        }
    }
}

/// Clock behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Per-tick delta clamp (seconds)
    pub max_dt: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_dt: MAX_TICK_DT }
    }
}

/// Complete configuration record consumed by [`crate::sim::RaceState`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub track: TrackConfig,
    pub karts: KartConfig,
    pub delays: DelayConfig,
    pub ai: AiConfig,
    pub hitboxes: HitboxConfig,
    pub items: ItemConfig,
    pub clock: ClockConfig,
}

impl BannerConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded banner config from {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Banner config saved to {}", path.display());
        Ok(())
    }

    /// Physical clamping only: bands ordered, lengths positive
    pub fn sanitized(mut self) -> Self {
        fn order_f32(a: &mut f32, b: &mut f32) {
            if *a > *b {
                std::mem::swap(a, b);
            }
        }
        fn order_f64(a: &mut f64, b: &mut f64) {
            if *a > *b {
                std::mem::swap(a, b);
            }
        }

        let t = &mut self.track;
        t.length = t.length.max(1.0);
        t.finish_line = crate::wrap_position(t.finish_line, t.length);
        order_f32(&mut t.lane_min, &mut t.lane_max);

        let k = &mut self.karts;
        order_f32(&mut k.speed_min, &mut k.speed_max);
        order_f64(&mut k.spawn_delay_min_ms, &mut k.spawn_delay_max_ms);
        k.stun_speed_factor = k.stun_speed_factor.clamp(0.0, 1.0);

        let d = &mut self.delays;
        order_f64(&mut d.recover_throw_min_ms, &mut d.recover_throw_max_ms);

        let a = &mut self.ai;
        order_f64(&mut a.hold_min_ms, &mut a.hold_max_ms);
        order_f32(&mut a.dodge_intensity_min, &mut a.dodge_intensity_max);
        order_f64(&mut a.wander_interval_min_ms, &mut a.wander_interval_max_ms);
        order_f64(&mut a.wander_duration_min_ms, &mut a.wander_duration_max_ms);
        order_f64(&mut a.first_wander_min_ms, &mut a.first_wander_max_ms);

        let i = &mut self.items;
        i.banana_chance = i.banana_chance.clamp(0.0, 1.0);
        i.anim_frames = i.anim_frames.max(1);
        // A shell must never come back around the ring to its thrower
        i.projectile_max_travel = i
            .projectile_max_travel
            .clamp(0.0, t.length * PROJECTILE_TRAVEL_FRACTION);
        let (length, lane_min, lane_max) = (t.length, t.lane_min, t.lane_max);
        for placement in &mut i.boxes {
            placement.world_x = crate::wrap_position(placement.world_x, length);
            placement.lane = placement.lane.clamp(lane_min, lane_max);
        }

        if self.clock.max_dt.is_nan() || self.clock.max_dt <= 0.0 {
            self.clock.max_dt = MAX_TICK_DT;
        }

        self
    }
}
