//! Ranking engine
//!
//! Score is cumulative distance, so a kart wrapping past the seam never loses
//! places. Order is a stable descending sort with ties broken by kart id.
//! The up/down trend flag is presentational and never feeds back into the race.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Recent movement in the standings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Trend {
    #[default]
    Steady,
    /// Moved to a lower (better) index
    Advancing,
    /// Moved to a higher (worse) index
    Dropping,
}

/// One row of the standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub kart_id: u32,
    pub score: f64,
    /// 0-based position
    pub rank: usize,
    pub trend: Trend,
    /// Virtual time when the trend flag lapses
    #[serde(skip)]
    pub trend_until_ms: f64,
}

/// Current standings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ranking {
    entries: Vec<RankingEntry>,
}

impl Ranking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in rank order
    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// Kart ids in rank order
    pub fn order(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.kart_id).collect()
    }

    pub fn rank_of(&self, kart_id: u32) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.kart_id == kart_id)
            .map(|e| e.rank)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rebuild the standings from `(kart_id, score)` pairs
    pub fn recompute(
        &mut self,
        scores: impl IntoIterator<Item = (u32, f64)>,
        now_ms: f64,
        trend_ms: f64,
    ) {
        let mut sorted: Vec<(u32, f64)> = scores.into_iter().collect();
        sorted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let previous = std::mem::take(&mut self.entries);
        self.entries = sorted
            .into_iter()
            .enumerate()
            .map(|(rank, (kart_id, score))| {
                let prior = previous.iter().find(|e| e.kart_id == kart_id);
                let (trend, trend_until_ms) = match prior {
                    Some(p) if rank < p.rank => (Trend::Advancing, now_ms + trend_ms),
                    Some(p) if rank > p.rank => (Trend::Dropping, now_ms + trend_ms),
                    Some(p) if now_ms < p.trend_until_ms => (p.trend, p.trend_until_ms),
                    _ => (Trend::Steady, now_ms),
                };
                RankingEntry {
                    kart_id,
                    score,
                    rank,
                    trend,
                    trend_until_ms,
                }
            })
            .collect();
    }
}
