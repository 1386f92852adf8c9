use notifying::{KeyPath, Listener, Registry};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// Listener that accumulates `(path, value)` notifications for later inspection
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<(String, String)>>>);

impl Recorder {
    /// Drain everything received since the last call
    pub fn take(&self) -> Vec<(String, String)> { self.0.lock().unwrap().drain(..).collect() }
}

impl Listener for Recorder {
    fn receive(&self, path: &KeyPath, value: &str) { self.0.lock().unwrap().push((path.to_string(), value.to_string())); }
}

/// A fresh registry wired to a recorder
#[allow(unused)]
pub fn recording_registry() -> (Registry, Recorder) {
    let recorder = Recorder::default();
    (Registry::with_listener(recorder.clone()), recorder)
}

/// Shorthand for building expected notifications
#[allow(unused)]
pub fn n(path: &str, value: &str) -> (String, String) { (path.to_string(), value.to_string()) }
