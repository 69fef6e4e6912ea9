//! Race state: the single world object
//!
//! Everything the simulation mutates lives here. External code drives it with
//! [`super::tick`] and reads it through [`RaceState::snapshot`].

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::clock::SimClock;
use super::item::{Hazard, ItemBox};
use super::kart::Kart;
use super::ranking::Ranking;
use super::schedule::{EventKind, Schedule};
use super::snapshot::Snapshot;
use super::track::Track;
use crate::config::BannerConfig;
use crate::consts::ROSTER;

/// Uniform sample in `[min, max)`, or `min` for an empty band
pub(crate) fn sample_f32<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min { rng.random_range(min..max) } else { min }
}

/// Uniform duration sample in `[min, max)` ms, or `min` for an empty band
pub(crate) fn sample_ms<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min { rng.random_range(min..max) } else { min }
}

/// Complete race world
#[derive(Debug, Clone)]
pub struct RaceState {
    /// Seed for reproducibility
    pub seed: u64,
    pub config: BannerConfig,
    pub track: Track,
    pub clock: SimClock,
    /// Karts, indexed by id
    pub karts: Vec<Kart>,
    /// Live hazards (sorted by id)
    pub hazards: Vec<Hazard>,
    pub boxes: Vec<ItemBox>,
    pub ranking: Ranking,
    pub schedule: Schedule,
    /// Simulation tick counter (ticks actually executed)
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl RaceState {
    /// Build a world from a config and a seed. Karts start pending; the first
    /// release is due immediately.
    pub fn new(config: BannerConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let mut state = Self {
            seed,
            track: Track::new(&config.track),
            clock: SimClock::new(config.clock.max_dt),
            karts: Vec::new(),
            hazards: Vec::new(),
            boxes: Vec::new(),
            ranking: Ranking::new(),
            schedule: Schedule::new(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            config,
        };
        state.populate();
        state
    }

    /// Discard every kart, hazard and pending event in one step and start a
    /// fresh world generation. Virtual time keeps running.
    pub fn reset(&mut self) {
        self.schedule.reset();
        self.track.reset_camera();
        self.populate();
    }

    fn populate(&mut self) {
        let now = self.clock.now_ms();
        let cfg = &self.config;

        let mut names = ROSTER.to_vec();
        names.shuffle(&mut self.rng);

        let count = cfg.karts.count;
        let step = if count > 1 {
            (self.track.lane_max - self.track.lane_min) / (count - 1) as f32
        } else {
            0.0
        };

        let mut karts = Vec::with_capacity(count);
        for i in 0..count {
            let base = names[i % names.len()];
            let name = if i < names.len() {
                base.to_string()
            } else {
                format!("{}-{}", base, i / names.len() + 1)
            };
            let lane = self.track.lane_min + i as f32 * step;
            let mut kart = Kart::new(i as u32, name, lane, self.track.finish_line);
            kart.next_wander_ms = now
                + sample_ms(
                    &mut self.rng,
                    cfg.ai.first_wander_min_ms,
                    cfg.ai.first_wander_max_ms,
                );
            karts.push(kart);
        }
        self.karts = karts;

        self.boxes = cfg
            .items
            .boxes
            .iter()
            .enumerate()
            .map(|(i, placement)| ItemBox::new(i as u32, *placement))
            .collect();
        self.hazards.clear();

        if !self.karts.is_empty() {
            self.schedule.push(now, EventKind::ReleaseKart { index: 0 });
        }

        self.ranking.clear();
        self.ranking.recompute(
            self.karts.iter().map(|k| (k.id, k.distance)),
            now,
            self.config.delays.rank_trend_ms,
        );

        log::info!(
            "World generation {}: {} karts, {} boxes, track length {}",
            self.schedule.generation(),
            self.karts.len(),
            self.boxes.len(),
            self.track.length
        );
    }

    /// Allocate a new hazard ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// World generation; bumps on every reset
    pub fn generation(&self) -> u32 {
        self.schedule.generation()
    }

    /// Current virtual time (ms)
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Suspend the whole simulation (host hidden or explicit pause)
    pub fn pause(&mut self, wall_ms: f64) {
        if !self.clock.is_paused() {
            log::info!("Simulation paused at {:.0} ms", self.clock.now_ms());
        }
        self.clock.pause(wall_ms);
    }

    /// Resume; the suspended interval never reaches any timer
    pub fn resume(&mut self, wall_ms: f64) {
        if self.clock.is_paused() {
            let suspended = self.clock.resume(wall_ms);
            log::info!("Simulation resumed after {:.0} ms suspended", suspended);
        }
    }

    pub fn kart(&self, id: u32) -> Option<&Kart> {
        self.karts.iter().find(|k| k.id == id)
    }

    pub fn kart_mut(&mut self, id: u32) -> Option<&mut Kart> {
        self.karts.iter_mut().find(|k| k.id == id)
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kart::KartState;

    #[test]
    fn test_new_world_layout() {
        let state = RaceState::new(BannerConfig::default(), 12345);
        assert_eq!(state.karts.len(), 8);
        assert!(state.karts.iter().all(|k| k.state == KartState::Pending));
        assert_eq!(state.karts[0].y, 0.0);
        assert!((state.karts[7].y - 30.0).abs() < 1e-4);
        assert_eq!(state.boxes.len(), 4);
        assert!(state.hazards.is_empty());
        assert_eq!(state.schedule.len(), 1);
        assert_eq!(state.ranking.entries().len(), 8);

        let mut names: Vec<&str> = state.karts.iter().map(|k| k.name.as_str()).collect();
        names.sort_unstable();
        let mut roster = ROSTER.to_vec();
        roster.sort_unstable();
        assert_eq!(names, roster);
    }

    #[test]
    fn test_same_seed_same_roster() {
        let a = RaceState::new(BannerConfig::default(), 7);
        let b = RaceState::new(BannerConfig::default(), 7);
        let names_a: Vec<_> = a.karts.iter().map(|k| k.name.clone()).collect();
        let names_b: Vec<_> = b.karts.iter().map(|k| k.name.clone()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn test_large_roster_gets_unique_names() {
        let mut config = BannerConfig::default();
        config.karts.count = 10;
        let state = RaceState::new(config, 1);
        let mut names: Vec<_> = state.karts.iter().map(|k| k.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_reset_bumps_generation_and_clears_world() {
        let mut state = RaceState::new(BannerConfig::default(), 1);
        state.karts[0].state = KartState::Running;
        state.karts[0].distance = 500.0;
        let id = state.next_entity_id();
        state.hazards.push(Hazard::new(
            id,
            crate::sim::item::ItemKind::Banana,
            0,
            10.0,
            10.0,
            glam::Vec2::ZERO,
            0.0,
        ));
        let before = state.generation();

        state.reset();
        assert_eq!(state.generation(), before + 1);
        assert!(state.hazards.is_empty());
        assert!(state.karts.iter().all(|k| k.state == KartState::Pending && k.distance == 0.0));
        assert_eq!(state.schedule.len(), 1);
    }
}
