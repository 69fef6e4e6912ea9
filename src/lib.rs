//! Kart Banner - looping kart race simulation for a promotional banner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track, karts, AI, items, collisions, ranking)
//! - `config`: Data-driven tuning record
//! - `platform`: Host drivers (wall clock to ticks, visibility, wasm adapter)
//!
//! Nothing here renders. A host maps [`sim::Snapshot`] values to pixels.

pub mod config;
pub mod error;
pub mod platform;
pub mod sim;

pub use config::BannerConfig;
pub use error::ConfigError;

/// Default tuning constants (the banner's shipped values)
pub mod consts {
    /// Track length in world units (one lap)
    pub const TRACK_LENGTH: f32 = 4000.0;
    /// Lateral lane bounds (percent of banner height)
    pub const LANE_MIN: f32 = 0.0;
    pub const LANE_MAX: f32 = 30.0;
    /// Road scroll speed used for the camera offset (units/s)
    pub const ROAD_SCROLL_SPEED: f32 = 182.0;

    /// Kart cruise speed band (units/s)
    pub const KART_SPEED_MIN: f32 = 223.0;
    pub const KART_SPEED_MAX: f32 = 257.0;
    /// Projectile speed (units/s), roughly twice a kart
    pub const PROJECTILE_SPEED: f32 = 480.0;
    /// Furthest a projectile may fly, as a share of the lap
    pub const PROJECTILE_TRAVEL_FRACTION: f32 = 0.75;

    /// Largest step a single tick may integrate (seconds)
    pub const MAX_TICK_DT: f32 = 0.1;
    /// Step used by headless runners (60 Hz)
    pub const HEADLESS_DT: f32 = 1.0 / 60.0;

    /// Character roster, one per kart
    pub const ROSTER: [&str; 8] = [
        "mario", "luigi", "peach", "toad", "yoshi", "bowser", "dk", "koopa",
    ];
}

/// Wrap a longitudinal position into [0, length)
#[inline]
pub fn wrap_position(x: f32, length: f32) -> f32 {
    let wrapped = x.rem_euclid(length);
    // rem_euclid can round up to `length` for tiny negative inputs
    if wrapped >= length { 0.0 } else { wrapped }
}

/// Distance travelling forward from `from` to reach `to`, in [0, length)
#[inline]
pub fn forward_distance(from: f32, to: f32, length: f32) -> f32 {
    wrap_position(to - from, length)
}

/// Shortest unsigned distance between two ring positions, in [0, length/2]
#[inline]
pub fn ring_distance(a: f32, b: f32, length: f32) -> f32 {
    let d = forward_distance(a, b, length);
    d.min(length - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_position() {
        assert_eq!(wrap_position(4100.0, 4000.0), 100.0);
        assert_eq!(wrap_position(-100.0, 4000.0), 3900.0);
        assert_eq!(wrap_position(0.0, 4000.0), 0.0);
        assert_eq!(wrap_position(4000.0, 4000.0), 0.0);
    }

    #[test]
    fn test_forward_distance_across_seam() {
        assert!((forward_distance(3950.0, 50.0, 4000.0) - 100.0).abs() < 1e-3);
        assert!((forward_distance(50.0, 3950.0, 4000.0) - 3900.0).abs() < 1e-3);
    }

    #[test]
    fn test_ring_distance_is_shortest_path() {
        assert!((ring_distance(3990.0, 10.0, 4000.0) - 20.0).abs() < 1e-3);
        assert!((ring_distance(10.0, 3990.0, 4000.0) - 20.0).abs() < 1e-3);
        assert!((ring_distance(1000.0, 1200.0, 4000.0) - 200.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn wrap_stays_in_range(x in -1.0e6f32..1.0e6, len in 1.0f32..10_000.0) {
            let w = wrap_position(x, len);
            prop_assert!(w >= 0.0 && w < len);
        }

        #[test]
        fn ring_distance_is_symmetric(a in 0.0f32..3000.0, b in 0.0f32..3000.0) {
            let ab = ring_distance(a, b, 3000.0);
            let ba = ring_distance(b, a, 3000.0);
            prop_assert!((ab - ba).abs() < 1e-2);
            prop_assert!(ab <= 1500.0 + 1e-3);
        }
    }
}
