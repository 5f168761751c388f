//! Flamewatch bring-up tool.
//!
//! Exercises each device end-to-end on real hardware:
//!
//! ```text
//! flamewatch alarm          sound the alarm once
//! flamewatch fan            run one full fan sweep
//! flamewatch fan-stop-demo  start a sweep, stop it after 2 s
//! flamewatch flame          poll the flame monitor for 10 s
//! flamewatch all            all of the above, in order
//! ```
//!
//! Environment:
//! - `FLAMEWATCH_BACKEND` — `cdev` (default) or `mmap`
//! - `FLAMEWATCH_CONFIG`  — path to a JSON [`NodeConfig`] override

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use log::info;

use flamewatch::config::NodeConfig;
use flamewatch::gpio::LineProvider;
use flamewatch::gpio::cdev::CdevGpio;
use flamewatch::gpio::mmap::MmapGpio;
use flamewatch::pins;
use flamewatch::service::NodeService;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exercise = std::env::args().nth(1).unwrap_or_else(|| "all".into());
    let config = load_config()?;

    let backend = std::env::var("FLAMEWATCH_BACKEND").unwrap_or_else(|_| "cdev".into());
    info!("flamewatch v{} ({} backend)", env!("CARGO_PKG_VERSION"), backend);

    match backend.as_str() {
        "cdev" => run_exercise(
            Arc::new(CdevGpio::new(pins::GPIO_CHIP, pins::CONSUMER)),
            config,
            &exercise,
        ),
        "mmap" => run_exercise(Arc::new(MmapGpio::new()), config, &exercise),
        other => bail!("unknown backend '{other}' (expected cdev or mmap)"),
    }
}

fn load_config() -> Result<NodeConfig> {
    let Ok(path) = std::env::var("FLAMEWATCH_CONFIG") else {
        return Ok(NodeConfig::default());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config: NodeConfig =
        serde_json::from_str(&raw).with_context(|| format!("parsing config {path}"))?;
    config.validate()?;
    info!("config loaded from {path}");
    Ok(config)
}

fn run_exercise<P: LineProvider>(provider: Arc<P>, config: NodeConfig, exercise: &str) -> Result<()> {
    let mut service = NodeService::new(provider, config);
    service.start();

    match exercise {
        "alarm" => exercise_alarm(&service),
        "fan" => exercise_fan(&service),
        "fan-stop-demo" => exercise_fan_stop(&service),
        "flame" => exercise_flame(&service),
        "all" => {
            exercise_alarm(&service);
            exercise_fan(&service);
            exercise_fan_stop(&service);
            exercise_flame(&service);
        }
        other => bail!("unknown exercise '{other}' (expected alarm, fan, fan-stop-demo, flame or all)"),
    }

    service.shutdown();
    Ok(())
}

fn exercise_alarm<P: LineProvider>(service: &NodeService<P>) {
    info!("exercise: alarm → {:?}", service.activate_alarm());
    wait_while(|| service.alarm_active());
}

fn exercise_fan<P: LineProvider>(service: &NodeService<P>) {
    info!("exercise: fan → {:?}", service.activate_fan());
    wait_while(|| service.fan_active());
}

fn exercise_fan_stop<P: LineProvider>(service: &NodeService<P>) {
    info!("exercise: fan (with stop) → {:?}", service.activate_fan());
    std::thread::sleep(Duration::from_secs(2));
    info!("exercise: stop_fan → {:?}", service.stop_fan());
    wait_while(|| service.fan_active());
}

fn exercise_flame<P: LineProvider>(service: &NodeService<P>) {
    info!("exercise: polling flame status for 10s");
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        info!("flame detected in window: {}", service.flame_status());
        std::thread::sleep(Duration::from_secs(1));
    }
}

/// Poll until the condition clears, with a generous safety bound.
fn wait_while(mut active: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while active() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(100));
    }
}
