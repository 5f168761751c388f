//! Continuous flame monitoring.
//!
//! A sampler thread reads the sensor line at a fixed cadence and
//! appends each reading to the guarded detection window; status queries
//! scan the window under the same guard. The guard's critical sections
//! hold no I/O and no sleeps — the pin read happens before the lock,
//! the detection log line after it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::config::MonitorSpec;
use crate::exec;
use crate::gpio::{InputLine, LineProvider};
use crate::sensors::window::DetectionWindow;

/// Samples retained in the sliding window.
pub const WINDOW_CAPACITY: usize = 300;

struct MonitorShared {
    window: Mutex<DetectionWindow<WINDOW_CAPACITY>>,
    running: AtomicBool,
}

/// Continuously running flame sensor monitor.
pub struct FlameMonitor {
    shared: Arc<MonitorShared>,
    sample_interval: Duration,
    sampler: Option<JoinHandle<()>>,
}

impl FlameMonitor {
    pub fn new(spec: &MonitorSpec) -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                window: Mutex::new(DetectionWindow::new()),
                running: AtomicBool::new(false),
            }),
            sample_interval: Duration::from_millis(spec.sample_interval_ms),
            sampler: None,
        }
    }

    /// Start the sampler thread. Idempotent; a no-op while running.
    ///
    /// The thread claims the sensor line itself; on claim failure it
    /// logs, clears the running flag and exits without sampling. There
    /// is no retry — the next `start()` call is the retry.
    pub fn start<P: LineProvider>(&mut self, provider: &Arc<P>, offset: u32) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            debug!("flame: monitor already running");
            return;
        }

        // Reap a sampler that previously exited on its own (claim
        // failure) before installing the new handle.
        if let Some(old) = self.sampler.take() {
            let _ = old.join();
        }

        let shared = Arc::clone(&self.shared);
        let provider = Arc::clone(provider);
        let interval = self.sample_interval;
        self.sampler = Some(exec::spawn_named("flame-sampler", move || {
            sample_loop(&shared, provider.as_ref(), offset, interval);
        }));
    }

    /// Stop the sampler and wait for it to finish its current
    /// iteration. Idempotent.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.sampler.take() {
            if handle.join().is_err() {
                warn!("flame: sampler thread panicked");
            }
        }
    }

    /// Whether any sample in the current window was positive.
    pub fn was_flame_detected(&self) -> bool {
        self.shared
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .any_positive()
    }

    /// Whether the sampler is currently running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

impl Drop for FlameMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sample_loop<P: LineProvider>(
    shared: &MonitorShared,
    provider: &P,
    offset: u32,
    interval: Duration,
) {
    let mut line = match provider.claim_input(offset) {
        Ok(line) => line,
        Err(e) => {
            error!("flame: cannot claim input line {}: {}", offset, e);
            shared.running.store(false, Ordering::SeqCst);
            return;
        }
    };

    info!(
        "flame: monitoring started ({}ms cadence, {} sample window)",
        interval.as_millis(),
        WINDOW_CAPACITY
    );

    while shared.running.load(Ordering::SeqCst) {
        let positive = line.level().is_high();
        shared
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(positive);
        if positive {
            info!("flame: flame detected");
        }
        std::thread::sleep(interval);
    }

    info!("flame: monitoring stopped");
}
