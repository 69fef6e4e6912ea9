//! Kart Banner headless runner
//!
//! Runs the race without a renderer and logs the standings.
//!
//! ```text
//! kart-banner [CONFIG.json | -] [SECONDS] [SEED]
//! kart-banner --write-config PATH
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use kart_banner::BannerConfig;
    use kart_banner::consts::HEADLESS_DT;
    use kart_banner::platform::BannerDriver;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("--write-config") {
        let Some(path) = args.get(1) else {
            log::error!("--write-config needs a path");
            std::process::exit(2);
        };
        if let Err(e) = BannerConfig::default().save(path) {
            log::error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match args.first().map(String::as_str) {
        None | Some("-") => BannerConfig::default(),
        Some(path) => BannerConfig::load(path).unwrap_or_else(|e| {
            log::error!("{}; using defaults", e);
            BannerConfig::default()
        }),
    };
    let seconds: f64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(60.0);
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);

    log::info!("Kart Banner (native) starting: {}s, seed {}", seconds, seed);

    let mut driver = BannerDriver::new(config, seed);
    let frame_ms = HEADLESS_DT as f64 * 1000.0;
    let frames = (seconds * 1000.0 / frame_ms).ceil() as u64;

    for frame in 0..=frames {
        driver.frame(frame as f64 * frame_ms);
        if frame > 0 && frame % 300 == 0 {
            log_standings(&driver);
        }
    }

    match driver.snapshot().to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Snapshot serialization failed: {}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn log_standings(driver: &kart_banner::platform::BannerDriver) {
    let state = &driver.state;
    let line: Vec<String> = state
        .ranking
        .entries()
        .iter()
        .filter_map(|e| {
            let kart = state.kart(e.kart_id)?;
            Some(format!("{}. {} ({:.0})", e.rank + 1, kart.name, e.score))
        })
        .collect();
    log::info!("t={:.1}s {}", state.now_ms() / 1000.0, line.join("  "));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
