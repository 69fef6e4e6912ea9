//! End-to-end race scenarios driven through the public API

use glam::Vec2;
use kart_banner::config::{BannerConfig, BoxPlacement};
use kart_banner::consts::HEADLESS_DT;
use kart_banner::platform::BannerDriver;
use kart_banner::sim::{Hazard, HeldItem, ItemKind, KartState, RaceState, tick};

fn run(state: &mut RaceState, seconds: f32) {
    let steps = (seconds / HEADLESS_DT).round() as usize;
    for _ in 0..steps {
        tick(state, HEADLESS_DT);
    }
}

/// Tick until `done` holds, giving up after `seconds`. Returns virtual time.
fn run_until(state: &mut RaceState, seconds: f32, done: impl Fn(&RaceState) -> bool) -> Option<f64> {
    let steps = (seconds / HEADLESS_DT).round() as usize;
    for _ in 0..steps {
        tick(state, HEADLESS_DT);
        if done(state) {
            return Some(state.now_ms());
        }
    }
    None
}

/// Pin kart `index` at a spot, running, with wandering switched off
fn place(state: &mut RaceState, index: usize, x: f32, y: f32, speed: f32) {
    let kart = &mut state.karts[index];
    if kart.state == KartState::Pending {
        kart.release(speed);
    }
    kart.speed = speed;
    kart.world_x = x;
    kart.y = y;
    kart.home_lane = y;
    kart.vy = 0.0;
    kart.target_vy = 0.0;
    kart.next_wander_ms = f64::MAX;
}

#[test]
fn kart_collects_box_and_gets_item_after_grant_delay() {
    let mut config = BannerConfig::default();
    config.track.length = 3000.0;
    config.items.boxes = vec![BoxPlacement {
        world_x: 1500.0,
        lane: 15.0,
    }];
    let mut state = RaceState::new(config, 2024);
    tick(&mut state, HEADLESS_DT);
    place(&mut state, 0, 1400.0, 15.0, 240.0);

    let touched_at = run_until(&mut state, 2.0, |s| !s.boxes[0].active).expect("box never touched");
    assert!(state.karts[0].item_pending);
    assert!(state.karts[0].held.is_none());

    let granted_at = run_until(&mut state, 4.0, |s| s.karts[0].held.is_some()).expect("item never granted");
    let waited = granted_at - touched_at;
    assert!(waited >= 3_000.0 - 1e-6, "granted after {waited} ms");
    assert!(waited < 3_000.0 + 2.0 * HEADLESS_DT as f64 * 1000.0);
    assert!(!state.karts[0].item_pending);
}

#[test]
fn fast_kart_collects_box_at_clamped_step() {
    let mut config = BannerConfig::default();
    config.track.length = 3000.0;
    config.items.boxes = vec![BoxPlacement {
        world_x: 1500.0,
        lane: 15.0,
    }];
    let mut state = RaceState::new(config, 2024);
    tick(&mut state, HEADLESS_DT);
    // 25.7 units per 100 ms step, wider than the box window
    place(&mut state, 0, 1385.0, 15.0, 257.0);

    for _ in 0..10 {
        tick(&mut state, 0.1);
    }
    assert!(state.karts[0].world_x > 1500.0);
    assert!(!state.boxes[0].active);
    assert!(state.karts[0].item_pending);
}

#[test]
fn shell_never_laps_back_to_thrower_on_short_track() {
    let mut config = BannerConfig::default();
    config.track.length = 1000.0;
    config.karts.count = 1;
    config.items.boxes.clear();
    config.items.projectile_drift = 0.0;
    let mut state = RaceState::new(config, 13);
    assert_eq!(state.config.items.projectile_max_travel, 750.0);

    tick(&mut state, HEADLESS_DT);
    place(&mut state, 0, 100.0, 15.0, 240.0);
    let now = state.now_ms();
    state.karts[0].held = Some(HeldItem::new(ItemKind::Shell, now));
    state.karts[0].throw_at_ms = now;
    tick(&mut state, HEADLESS_DT);
    assert_eq!(state.hazards.len(), 1);

    for _ in 0..(10 * 60) {
        tick(&mut state, HEADLESS_DT);
        assert_eq!(state.karts[0].state, KartState::Running);
    }
    assert!(state.hazards.is_empty());
}

#[test]
fn projectile_stuns_kart_ahead() {
    let mut state = RaceState::new(BannerConfig::default(), 77);
    tick(&mut state, HEADLESS_DT);
    place(&mut state, 0, 1000.0, 10.0, 240.0);
    place(&mut state, 1, 1300.0, 10.0, 0.0);
    let now = state.now_ms();
    state.karts[0].held = Some(HeldItem::new(ItemKind::Shell, now));
    state.karts[0].throw_at_ms = now;

    tick(&mut state, HEADLESS_DT);
    assert!(state.karts[0].held.is_none());
    assert_eq!(state.hazards.len(), 1);
    let shell = state.hazards[0].id;

    run_until(&mut state, 1.0, |s| s.karts[1].state == KartState::Hit).expect("shell missed");
    assert_eq!(state.karts[0].state, KartState::Running);
    assert!(state.hazards.iter().all(|h| h.id != shell));
}

#[test]
fn projectile_and_banana_destroy_each_other() {
    let mut state = RaceState::new(BannerConfig::default(), 5);
    let banana_id = state.next_entity_id();
    state.hazards.push(Hazard::new(
        banana_id,
        ItemKind::Banana,
        3,
        2000.0,
        20.0,
        Vec2::ZERO,
        0.0,
    ));
    let shell_id = state.next_entity_id();
    state.hazards.push(Hazard::new(
        shell_id,
        ItemKind::Shell,
        4,
        1980.0,
        20.0,
        Vec2::new(480.0, 0.0),
        0.0,
    ));

    tick(&mut state, HEADLESS_DT);
    assert!(state.hazards.is_empty());
}

#[test]
fn thrower_is_immune_to_own_hazard() {
    let mut state = RaceState::new(BannerConfig::default(), 11);
    tick(&mut state, HEADLESS_DT);
    place(&mut state, 0, 1000.0, 10.0, 240.0);
    let now = state.now_ms();
    let id = state.next_entity_id();
    let owner = state.karts[0].id;
    state.hazards.push(Hazard::new(
        id,
        ItemKind::Banana,
        owner,
        1005.0,
        10.0,
        Vec2::ZERO,
        now,
    ));

    tick(&mut state, HEADLESS_DT);
    assert_eq!(state.karts[0].state, KartState::Running);
    assert_eq!(state.hazards.len(), 1);

    // Someone else's banana does hit
    let id = state.next_entity_id();
    let x = state.karts[0].world_x + 10.0;
    state.hazards.push(Hazard::new(
        id,
        ItemKind::Banana,
        owner + 1,
        x,
        10.0,
        Vec2::ZERO,
        now,
    ));
    tick(&mut state, HEADLESS_DT);
    assert_eq!(state.karts[0].state, KartState::Hit);
}

#[test]
fn pause_freezes_every_timer() {
    let mut driver = BannerDriver::new(BannerConfig::default(), 31);
    let frame_ms = 16.0;
    let mut wall = 0.0;
    while wall < 5_000.0 {
        driver.frame(wall);
        wall += frame_ms;
    }

    let now = driver.state.now_ms();
    driver.state.karts[0].stun(now, 2_000.0, 1_000.0);
    let stun_until = driver.state.karts[0].stun_until_ms;
    let boxes_before: Vec<f64> = driver.state.boxes.iter().map(|b| b.reactivate_at_ms).collect();
    let pending_events = driver.state.schedule.len();

    driver.set_hidden(true, wall);
    let hidden_at = wall;
    while wall < hidden_at + 10_000.0 {
        assert!(!driver.frame(wall));
        wall += frame_ms;
    }
    driver.set_hidden(false, wall);

    assert_eq!(driver.state.now_ms(), now);
    assert_eq!(driver.state.karts[0].stun_until_ms, stun_until);
    assert_eq!(driver.state.karts[0].state, KartState::Hit);
    assert_eq!(driver.state.schedule.len(), pending_events);
    let boxes_after: Vec<f64> = driver.state.boxes.iter().map(|b| b.reactivate_at_ms).collect();
    assert_eq!(boxes_before, boxes_after);

    // The stun still runs its full two seconds of virtual time
    let resumed_wall = wall;
    while wall < resumed_wall + 1_500.0 {
        driver.frame(wall);
        wall += frame_ms;
    }
    assert_eq!(driver.state.karts[0].state, KartState::Hit);
    let mut recovered_at = None;
    while wall < resumed_wall + 2_200.0 {
        driver.frame(wall);
        wall += frame_ms;
        if recovered_at.is_none() && driver.state.karts[0].state == KartState::Running {
            recovered_at = Some(driver.state.now_ms());
        }
    }
    let recovered_at = recovered_at.expect("stun never ended after resume");
    assert!(recovered_at >= stun_until);
    assert!(recovered_at - stun_until < 2.0 * frame_ms);
}

#[test]
fn seam_crossing_keeps_the_lead() {
    let mut state = RaceState::new(BannerConfig::default(), 8);
    run(&mut state, 3.0);
    let length = state.track.length;
    place(&mut state, 0, length - 1.0, 5.0, 240.0);
    state.karts[0].distance = 1.0e6;

    run(&mut state, 0.5);
    assert!(state.karts[0].world_x < 200.0);
    assert_eq!(state.ranking.order()[0], state.karts[0].id);
    assert_eq!(state.ranking.rank_of(state.karts[0].id), Some(0));
}

#[test]
fn reset_starts_a_clean_generation() {
    let mut driver = BannerDriver::new(BannerConfig::default(), 4);
    let mut wall = 0.0;
    for _ in 0..600 {
        driver.frame(wall);
        wall += 16.0;
    }
    let generation = driver.state.generation();
    driver.reset();
    let snap = driver.snapshot();
    assert_eq!(snap.generation, generation + 1);
    assert!(snap.hazards.is_empty());
    assert!(snap.karts.iter().all(|k| k.state == KartState::Pending && k.score == 0.0));
    assert!(snap.boxes.iter().all(|b| b.active));

    driver.frame(wall);
    assert_eq!(driver.state.karts[0].state, KartState::Running);
}
