//! Integration tests for the full control path: operations on
//! [`NodeService`] down to pin transitions on the simulated GPIO
//! backend, without any real hardware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use flamewatch::config::{AlarmSpec, MonitorSpec, NodeConfig, SweepSpec};
use flamewatch::gpio::sim::SimGpio;
use flamewatch::pins;
use flamewatch::service::{ControlOutcome, NodeService};

fn fast_config() -> NodeConfig {
    NodeConfig {
        alarm: AlarmSpec {
            half_period_us: 200,
            duration_ms: 40,
            cancellable: false,
        },
        sweep: SweepSpec {
            min_pulse_us: 100,
            max_pulse_us: 300,
            neutral_pulse_us: 200,
            settle_us: 200,
            burst_pulses: 3,
            park_pulses: 5,
            duration_ms: 40,
        },
        monitor: MonitorSpec {
            sample_interval_ms: 2,
        },
    }
}

fn make_service(config: NodeConfig) -> (NodeService<SimGpio>, SimGpio) {
    let sim = SimGpio::new();
    let service = NodeService::new(Arc::new(sim.clone()), config);
    (service, sim)
}

fn wait_for(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

// ── Activation exclusivity ───────────────────────────────────

#[test]
fn second_activation_conflicts_until_sequence_completes() {
    let (service, _sim) = make_service(fast_config());

    assert_eq!(service.activate_alarm(), ControlOutcome::Accepted);
    assert_eq!(service.activate_alarm(), ControlOutcome::Conflict);

    assert!(
        wait_for(Duration::from_secs(2), || !service.alarm_active()),
        "alarm sequence never finished"
    );
    assert_eq!(service.activate_alarm(), ControlOutcome::Accepted);
}

#[test]
fn alarm_and_fan_gates_are_independent() {
    let (service, _sim) = make_service(fast_config());

    assert_eq!(service.activate_alarm(), ControlOutcome::Accepted);
    assert_eq!(service.activate_fan(), ControlOutcome::Accepted);

    assert!(wait_for(Duration::from_secs(2), || {
        !service.alarm_active() && !service.fan_active()
    }));
}

#[test]
fn alarm_ends_with_line_low() {
    let (service, sim) = make_service(fast_config());

    assert_eq!(service.activate_alarm(), ControlOutcome::Accepted);
    assert!(wait_for(Duration::from_secs(2), || !service.alarm_active()));

    assert_eq!(
        sim.last_level(pins::ALARM_LINE),
        Some(flamewatch::gpio::Level::Low)
    );
}

// ── Fan stop semantics ───────────────────────────────────────

#[test]
fn stop_fan_shortens_the_sweep_and_parks() {
    let mut config = fast_config();
    config.sweep.duration_ms = 5_000;
    let (service, sim) = make_service(config);

    assert_eq!(service.activate_fan(), ControlOutcome::Accepted);
    std::thread::sleep(Duration::from_millis(10));

    let stopped_at = Instant::now();
    assert_eq!(service.stop_fan(), ControlOutcome::Accepted);

    assert!(
        wait_for(Duration::from_secs(2), || !service.fan_active()),
        "fan did not stop cooperatively"
    );
    assert!(
        stopped_at.elapsed() < Duration::from_secs(2),
        "stop did not shorten the 5s sweep"
    );

    // The park pulses land after the stop; the line ends low.
    assert_eq!(
        sim.last_level(pins::FAN_SERVO_LINE),
        Some(flamewatch::gpio::Level::Low)
    );
    assert!(!sim.transitions().is_empty());
}

#[test]
fn stop_fan_when_idle_is_inactive() {
    let (service, _sim) = make_service(fast_config());
    assert_eq!(service.stop_fan(), ControlOutcome::Inactive);

    // Also once a completed sweep has released the gate.
    assert_eq!(service.activate_fan(), ControlOutcome::Accepted);
    assert!(wait_for(Duration::from_secs(2), || !service.fan_active()));
    assert_eq!(service.stop_fan(), ControlOutcome::Inactive);
}

// ── Flame monitor ────────────────────────────────────────────

#[test]
fn flame_status_reflects_window_history() {
    let (mut service, sim) = make_service(fast_config());
    service.start();
    assert!(service.monitor_running());
    assert!(!service.flame_status());

    sim.set_input_high(true);
    assert!(
        wait_for(Duration::from_secs(2), || service.flame_status()),
        "flame never reported"
    );

    // Quiet line: the positive sample is still inside the 300-sample
    // window, so the status holds.
    sim.set_input_high(false);
    std::thread::sleep(Duration::from_millis(20));
    assert!(service.flame_status());

    service.shutdown();
    assert!(!service.monitor_running());
}

#[test]
fn monitor_start_is_idempotent() {
    let (mut service, sim) = make_service(fast_config());
    service.start();
    service.start();

    assert!(wait_for(Duration::from_secs(2), || sim.input_claims() >= 1));
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(sim.input_claims(), 1, "double start must not spawn a second sampler");

    service.shutdown();
}

// ── Failure path ─────────────────────────────────────────────

#[test]
fn claim_failure_is_not_fatal_and_gate_recovers() {
    let (service, sim) = make_service(fast_config());
    sim.fail_claims(true);

    assert_eq!(service.activate_fan(), ControlOutcome::Accepted);
    assert!(
        wait_for(Duration::from_secs(2), || !service.fan_active()),
        "gate not released after claim failure"
    );
    assert!(sim.transitions().is_empty());

    // The next activation is the retry mechanism.
    sim.fail_claims(false);
    assert_eq!(service.activate_fan(), ControlOutcome::Accepted);
    assert!(wait_for(Duration::from_secs(2), || !service.fan_active()));
    assert!(!sim.transitions().is_empty());
}

// ── Shutdown ─────────────────────────────────────────────────

#[test]
fn shutdown_stops_a_long_sweep() {
    let mut config = fast_config();
    config.sweep.duration_ms = 5_000;
    let (mut service, _sim) = make_service(config);
    service.start();

    assert_eq!(service.activate_fan(), ControlOutcome::Accepted);
    std::thread::sleep(Duration::from_millis(10));

    let started = Instant::now();
    service.shutdown();
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "shutdown had to wait out the full sweep"
    );
    assert!(!service.fan_active());
    assert!(!service.monitor_running());
}
