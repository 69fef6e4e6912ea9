//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Virtual time only, advanced by clamped ticks
//! - Seeded RNG only
//! - Stable iteration order (by kart index and hazard id)
//! - No rendering or platform dependencies

pub mod ai;
pub mod clock;
pub mod collision;
pub mod item;
pub mod kart;
pub mod ranking;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod track;

pub use clock::SimClock;
pub use collision::CollisionReport;
pub use item::{Hazard, HeldItem, ItemBox, ItemKind};
pub use kart::{AiMode, Kart, KartState};
pub use ranking::{Ranking, RankingEntry, Trend};
pub use schedule::{EventKind, Schedule};
pub use snapshot::{BoxView, HazardView, KartView, Snapshot};
pub use state::RaceState;
pub use tick::tick;
pub use track::Track;
