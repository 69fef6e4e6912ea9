//! Simulation clock
//!
//! Virtual time is wall time minus every suspended interval. The clock only
//! moves forward through [`SimClock::advance`], one clamped tick at a time, so
//! a stall or a long suspension can never make scheduled events fire in a burst.

/// Virtual time source with pause accounting
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current virtual time (ms)
    now_ms: f64,
    /// Per-tick delta clamp (seconds)
    max_dt: f32,
    /// Wall timestamp at which the current suspension began
    paused_at_wall_ms: Option<f64>,
    /// Total wall time spent suspended (ms)
    paused_total_ms: f64,
}

impl SimClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            now_ms: 0.0,
            max_dt,
            paused_at_wall_ms: None,
            paused_total_ms: 0.0,
        }
    }

    /// Current virtual time in milliseconds
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at_wall_ms.is_some()
    }

    /// Accumulated suspended wall time (ms)
    pub fn paused_total_ms(&self) -> f64 {
        self.paused_total_ms
    }

    /// Freeze virtual time. Repeated calls keep the first timestamp.
    pub fn pause(&mut self, wall_ms: f64) {
        if self.paused_at_wall_ms.is_none() {
            self.paused_at_wall_ms = Some(wall_ms);
        }
    }

    /// Unfreeze, folding the suspended interval into the offset.
    /// Returns how long the clock was suspended.
    pub fn resume(&mut self, wall_ms: f64) -> f64 {
        match self.paused_at_wall_ms.take() {
            Some(since) => {
                let suspended = (wall_ms - since).max(0.0);
                self.paused_total_ms += suspended;
                suspended
            }
            None => 0.0,
        }
    }

    /// Clamp a raw frame delta to a safe integration step
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }

    /// Advance virtual time by one tick. Returns the step actually taken,
    /// or `None` while suspended.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if self.is_paused() {
            return None;
        }
        let dt = self.clamp_dt(dt);
        self.now_ms += dt as f64 * 1000.0;
        Some(dt)
    }
}
