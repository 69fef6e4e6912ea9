//! Per-tick simulation pipeline
//!
//! Advances the world deterministically by one clamped step:
//! clock, due events, karts (AI, throws, motion), hazards, collisions,
//! expiry, box cooldowns, ranking.

use super::ai;
use super::collision;
use super::item;
use super::kart::KartState;
use super::schedule::EventKind;
use super::state::{RaceState, sample_f32, sample_ms};

/// Advance the race by one step of `dt` seconds (clamped).
/// A suspended world is left untouched.
pub fn tick(state: &mut RaceState, dt: f32) {
    let Some(dt) = state.clock.advance(dt) else {
        return;
    };
    let now = state.clock.now_ms();
    state.time_ticks += 1;
    state.track.advance_camera(dt);

    for event in state.schedule.drain_due(now) {
        match event {
            EventKind::ReleaseKart { index } => release_kart(state, index, now),
            EventKind::GrantItem { kart_id } => grant_item(state, kart_id, now),
        }
    }

    for i in 0..state.karts.len() {
        drive_kart(state, i, now, dt);
    }

    let (frame_ms, frames) = (state.config.items.anim_frame_ms, state.config.items.anim_frames);
    for hazard in &mut state.hazards {
        hazard.advance(&state.track, dt);
        hazard.animate(now, frame_ms, frames);
    }

    let report = collision::resolve(state, now);
    if !report.is_empty() {
        log::debug!("Tick {} collisions: {:?}", state.time_ticks, report);
    }

    let RaceState {
        config, hazards, ..
    } = state;
    hazards.retain(|h| {
        let expired = h.expired(now, &config.delays, &config.items);
        if expired {
            log::debug!("{:?} {} expired", h.kind, h.id);
        }
        !expired
    });

    for item_box in &mut state.boxes {
        if item_box.refresh(now) {
            log::debug!("Box {} active again", item_box.id);
        }
    }

    state.ranking.recompute(
        state.karts.iter().map(|k| (k.id, k.distance)),
        now,
        state.config.delays.rank_trend_ms,
    );
}

/// Release the kart at `index` and queue the next one
fn release_kart(state: &mut RaceState, index: usize, now: f64) {
    let speed = sample_f32(
        &mut state.rng,
        state.config.karts.speed_min,
        state.config.karts.speed_max,
    );
    if let Some(kart) = state.karts.get_mut(index) {
        if kart.release(speed) {
            log::info!(
                "Kart {} ({}) released at {:.0} ms, speed {:.0}",
                kart.id,
                kart.name,
                now,
                kart.speed
            );
        }
    }

    if index + 1 < state.karts.len() {
        let delay = sample_ms(
            &mut state.rng,
            state.config.karts.spawn_delay_min_ms,
            state.config.karts.spawn_delay_max_ms,
        );
        state
            .schedule
            .push(now + delay, EventKind::ReleaseKart { index: index + 1 });
    }
}

/// Deliver the item promised by a box contact
fn grant_item(state: &mut RaceState, kart_id: u32, now: f64) {
    let kind = item::roll_item(&mut state.rng, state.config.items.banana_chance);
    let hold = sample_ms(
        &mut state.rng,
        state.config.ai.hold_min_ms,
        state.config.ai.hold_max_ms,
    );
    let grace = state.config.delays.hit_grace_ms;
    let Some(kart) = state.kart_mut(kart_id) else {
        return;
    };

    let mut throw_at = now + hold;
    if kart.state == KartState::Hit {
        throw_at = throw_at.max(kart.stun_until_ms + grace);
    }
    if item::grant(kart, kind, now, throw_at) {
        log::debug!(
            "Kart {} ({}) got a {:?}, throw at {:.0} ms",
            kart.id,
            kart.name,
            kind,
            throw_at
        );
    }
}

fn drive_kart(state: &mut RaceState, i: usize, now: f64, dt: f32) {
    let (kart_state, stun_until) = (state.karts[i].state, state.karts[i].stun_until_ms);
    match kart_state {
        KartState::Pending => return,
        KartState::Hit if now >= stun_until => recover_kart(state, i, now),
        _ => {}
    }

    if state.karts[i].is_running() {
        throw_if_due(state, i, now);
        let decision = ai::decide(
            i,
            &state.karts,
            &state.hazards,
            &state.boxes,
            &state.track,
            &state.config.ai,
        );
        let RaceState {
            config,
            track,
            karts,
            rng,
            ..
        } = state;
        ai::steer(&mut karts[i], decision, track, &config.ai, rng, now, dt);
    }

    let stun_factor = state.config.karts.stun_speed_factor;
    let motion = state.karts[i].integrate(&state.track, dt, stun_factor);

    if motion.crossed_finish {
        let kart = &mut state.karts[i];
        kart.laps += 1;
        log::debug!("Kart {} ({}) completed lap {}", kart.id, kart.name, kart.laps);
    }
    if motion.wrapped && state.karts[i].is_running() {
        let sample = sample_f32(
            &mut state.rng,
            state.config.karts.speed_min,
            state.config.karts.speed_max,
        );
        state.karts[i].blend_speed(sample);
    }
}

/// `Hit -> Running` once the stun is over
fn recover_kart(state: &mut RaceState, i: usize, now: f64) {
    let speed = sample_f32(
        &mut state.rng,
        state.config.karts.speed_min,
        state.config.karts.speed_max,
    );
    let delay = sample_ms(
        &mut state.rng,
        state.config.delays.recover_throw_min_ms,
        state.config.delays.recover_throw_max_ms,
    );
    let kart = &mut state.karts[i];
    kart.recover(speed);
    if kart.held.is_some() {
        kart.throw_at_ms = kart.throw_at_ms.max(now + delay);
    }
    log::debug!("Kart {} ({}) recovered", kart.id, kart.name);
}

fn throw_if_due(state: &mut RaceState, i: usize, now: f64) {
    let kart = &state.karts[i];
    if kart.held.is_none() || now < kart.throw_at_ms {
        return;
    }
    let id = state.next_entity_id();
    let RaceState {
        config,
        track,
        karts,
        hazards,
        rng,
        ..
    } = state;
    if let Some(hazard) = item::throw_held(&mut karts[i], id, track, &config.items, rng, now) {
        log::debug!(
            "Kart {} threw {:?} {} at x={:.0} y={:.1}",
            karts[i].id,
            hazard.kind,
            hazard.id,
            hazard.world_x,
            hazard.y
        );
        hazards.push(hazard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BannerConfig;
    use crate::consts::HEADLESS_DT;
    use crate::sim::item::{HeldItem, ItemKind};
    use proptest::prelude::*;

    fn run(state: &mut RaceState, seconds: f32) {
        let steps = (seconds / HEADLESS_DT).round() as usize;
        for _ in 0..steps {
            tick(state, HEADLESS_DT);
        }
    }

    #[test]
    fn test_first_kart_released_on_first_tick() {
        let mut state = RaceState::new(BannerConfig::default(), 12345);
        tick(&mut state, HEADLESS_DT);
        assert_eq!(state.karts[0].state, KartState::Running);
        assert!(state.karts[1..].iter().all(|k| k.state == KartState::Pending));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_all_karts_eventually_released() {
        let mut state = RaceState::new(BannerConfig::default(), 12345);
        // 7 gaps of at most 2 s
        run(&mut state, 15.0);
        assert!(state.karts.iter().all(|k| k.state != KartState::Pending));
    }

    #[test]
    fn test_same_seed_same_race() {
        let mut a = RaceState::new(BannerConfig::default(), 777);
        let mut b = RaceState::new(BannerConfig::default(), 777);
        run(&mut a, 30.0);
        run(&mut b, 30.0);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        run(&mut state, 2.0);
        let before = state.snapshot();
        let ticks = state.time_ticks;

        state.pause(2_000.0);
        for _ in 0..120 {
            tick(&mut state, HEADLESS_DT);
        }
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        tick(&mut state, 5.0);
        assert!((state.now_ms() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_due_item_is_thrown() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        tick(&mut state, HEADLESS_DT);
        state.karts[0].held = Some(HeldItem::new(ItemKind::Banana, 0.0));
        state.karts[0].throw_at_ms = 0.0;
        tick(&mut state, HEADLESS_DT);
        assert!(state.karts[0].held.is_none());
        assert_eq!(state.hazards.len(), 1);
        assert_eq!(state.hazards[0].owner, state.karts[0].id);
    }

    #[test]
    fn test_stunned_kart_cannot_throw_and_recovers() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        tick(&mut state, HEADLESS_DT);
        let now = state.now_ms();
        state.karts[0].held = Some(HeldItem::new(ItemKind::Shell, 0.0));
        state.karts[0].throw_at_ms = now;
        state.karts[0].stun(now, 2_000.0, 1_000.0);

        run(&mut state, 1.0);
        assert_eq!(state.karts[0].state, KartState::Hit);
        assert!(state.karts[0].held.is_some());

        run(&mut state, 1.5);
        assert_eq!(state.karts[0].state, KartState::Running);
        assert!(state.karts[0].throw_at_ms >= now + 3_000.0);
    }

    #[test]
    fn test_grant_while_stunned_waits_for_recovery() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        tick(&mut state, HEADLESS_DT);
        let now = state.now_ms();
        let id = state.karts[0].id;
        state.karts[0].stun(now, 2_000.0, 1_000.0);
        state.karts[0].item_pending = true;

        grant_item(&mut state, id, now);
        let kart = &state.karts[0];
        assert!(kart.held.is_some());
        assert!(!kart.item_pending);
        assert!(kart.throw_at_ms >= now + 3_000.0);
    }

    #[test]
    fn test_reset_drops_pending_grant() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        tick(&mut state, HEADLESS_DT);
        let id = state.karts[0].id;
        let now = state.now_ms();
        state.karts[0].item_pending = true;
        state
            .schedule
            .push(now + 50.0, EventKind::GrantItem { kart_id: id });

        state.reset();
        run(&mut state, 0.5);
        assert!(state.karts.iter().all(|k| k.held.is_none()));
    }

    #[test]
    fn test_laps_counted() {
        let mut state = RaceState::new(BannerConfig::default(), 3);
        // Keep the field clear so nothing stuns the leader
        state.config.karts.count = 1;
        state.reset();
        run(&mut state, 20.0);
        let kart = &state.karts[0];
        let expected = (kart.distance / state.track.length as f64).floor() as u32;
        assert!(kart.laps >= expected.saturating_sub(1) && kart.laps <= expected + 1);
        assert!(kart.laps >= 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn world_stays_in_bounds(seed in 0u64..10_000, seconds in 1u32..40) {
            let mut state = RaceState::new(BannerConfig::default(), seed);
            let length = state.track.length;
            let mut last: Vec<f64> = state.karts.iter().map(|k| k.distance).collect();

            for _ in 0..(seconds * 60) {
                tick(&mut state, HEADLESS_DT);
                for (kart, prev) in state.karts.iter().zip(last.iter_mut()) {
                    prop_assert!(kart.world_x >= 0.0 && kart.world_x < length);
                    prop_assert!(kart.y >= 0.0 && kart.y <= 30.0);
                    prop_assert!(kart.distance >= *prev);
                    *prev = kart.distance;
                }
                for hazard in &state.hazards {
                    prop_assert!(hazard.world_x >= 0.0 && hazard.world_x < length);
                    prop_assert!(hazard.y >= 0.0 && hazard.y <= 30.0);
                }
            }

            let order = state.ranking.order();
            prop_assert_eq!(order.len(), state.karts.len());
            let scores: Vec<f64> = state.ranking.entries().iter().map(|e| e.score).collect();
            prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
