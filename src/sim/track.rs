//! Track / world model
//!
//! The track is a ring of length `W`. Every longitudinal comparison goes
//! through the ring helpers here, never through plain subtraction.

use serde::{Deserialize, Serialize};

use crate::config::TrackConfig;
use crate::{forward_distance, ring_distance, wrap_position};

/// Ring geometry plus the presentational camera scroll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub length: f32,
    pub finish_line: f32,
    pub lane_min: f32,
    pub lane_max: f32,
    pub scroll_speed: f32,
    /// Accumulated scroll modulo `length` (read-only for renderers)
    camera_offset: f32,
}

impl Track {
    pub fn new(config: &TrackConfig) -> Self {
        Self {
            length: config.length,
            finish_line: wrap_position(config.finish_line, config.length),
            lane_min: config.lane_min,
            lane_max: config.lane_max,
            scroll_speed: config.scroll_speed,
            camera_offset: 0.0,
        }
    }

    #[inline]
    pub fn wrap(&self, x: f32) -> f32 {
        wrap_position(x, self.length)
    }

    /// How far ahead `to` is when travelling forward from `from`
    #[inline]
    pub fn ahead(&self, from: f32, to: f32) -> f32 {
        forward_distance(from, to, self.length)
    }

    /// Shortest longitudinal separation between two positions
    #[inline]
    pub fn separation(&self, a: f32, b: f32) -> f32 {
        ring_distance(a, b, self.length)
    }

    /// Clamp a lateral position into the lane bounds.
    /// Returns the clamped value and whether clamping occurred.
    pub fn clamp_lane(&self, y: f32) -> (f32, bool) {
        if y > self.lane_max {
            (self.lane_max, true)
        } else if y < self.lane_min {
            (self.lane_min, true)
        } else {
            (y, false)
        }
    }

    /// Is `y` within `margin` of the top lane edge?
    #[inline]
    pub fn near_top(&self, y: f32, margin: f32) -> bool {
        y > self.lane_max - margin
    }

    /// Is `y` within `margin` of the bottom lane edge?
    #[inline]
    pub fn near_bottom(&self, y: f32, margin: f32) -> bool {
        y < self.lane_min + margin
    }

    /// Did a move of `moved` units starting at `from` cross the finish line?
    pub fn crosses_finish(&self, from: f32, moved: f32) -> bool {
        if moved <= 0.0 {
            return false;
        }
        let to_line = self.ahead(from, self.finish_line);
        to_line > 0.0 && to_line <= moved
    }

    pub fn camera_offset(&self) -> f32 {
        self.camera_offset
    }

    pub fn advance_camera(&mut self, dt: f32) {
        self.camera_offset = self.wrap(self.camera_offset + self.scroll_speed * dt);
    }

    pub fn reset_camera(&mut self) {
        self.camera_offset = 0.0;
    }
}
