//! Platform abstraction layer
//!
//! Turns host wall-clock frames and visibility changes into simulation ticks:
//! - [`FrameDriver`]: wall timestamps to per-frame deltas, suspension aware
//! - [`BannerDriver`]: owns a [`RaceState`] and feeds it one tick per frame
//! - `web` (wasm32 only): `wasm-bindgen` adapter for a browser host

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::config::BannerConfig;
use crate::sim::{RaceState, Snapshot, tick};

/// Converts monotonic wall timestamps (ms) into frame deltas (seconds)
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    last_wall_ms: Option<f64>,
    suspended: bool,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Raw delta since the previous frame. The first frame after construction
    /// or resume yields zero; nothing is yielded while suspended.
    pub fn frame(&mut self, wall_ms: f64) -> Option<f32> {
        if self.suspended {
            return None;
        }
        let dt = match self.last_wall_ms {
            Some(last) => ((wall_ms - last).max(0.0) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_wall_ms = Some(wall_ms);
        Some(dt)
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Restart timing from `wall_ms` so the suspended gap is never integrated
    pub fn resume(&mut self, wall_ms: f64) {
        self.suspended = false;
        self.last_wall_ms = Some(wall_ms);
    }
}

/// A race plus its frame timing: what a host event loop drives
#[derive(Debug, Clone)]
pub struct BannerDriver {
    pub state: RaceState,
    frames: FrameDriver,
}

impl BannerDriver {
    pub fn new(config: BannerConfig, seed: u64) -> Self {
        Self {
            state: RaceState::new(config, seed),
            frames: FrameDriver::new(),
        }
    }

    /// Run one tick for a host frame at `wall_ms`. Returns false while hidden.
    pub fn frame(&mut self, wall_ms: f64) -> bool {
        match self.frames.frame(wall_ms) {
            Some(dt) => {
                tick(&mut self.state, dt);
                true
            }
            None => false,
        }
    }

    /// Host visibility changed. Hiding freezes the whole world.
    pub fn set_hidden(&mut self, hidden: bool, wall_ms: f64) {
        if hidden == self.frames.is_suspended() {
            return;
        }
        if hidden {
            self.frames.suspend();
            self.state.pause(wall_ms);
        } else {
            self.frames.resume(wall_ms);
            self.state.resume(wall_ms);
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.frames.is_suspended()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }
}
