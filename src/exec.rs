//! Named worker-thread spawning.
//!
//! Every background sequence and the flame sampler run on a dedicated
//! named thread so they are identifiable in process listings and panics
//! carry a useful thread name.

use std::thread::JoinHandle;

/// Spawn a named worker thread.
pub fn spawn_named(name: &'static str, f: impl FnOnce() + Send + 'static) -> JoinHandle<()> {
    log::debug!("spawning '{}' worker", name);

    std::thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .expect("spawn_named: thread creation failed")
}
