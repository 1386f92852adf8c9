use crate::KeyPath;

/// Receives every value change routed through a [`crate::Registry`]
pub trait Listener: Send + Sync {
    fn receive(&self, path: &KeyPath, value: &str);
}

/// Writes each change to stdout as `<path> updated, new value: <value>`
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleListener;

impl Listener for ConsoleListener {
    fn receive(&self, path: &KeyPath, value: &str) {
        println!("{path} updated, new value: {value}");
    }
}

impl<F> Listener for F
where F: Fn(&KeyPath, &str) + Send + Sync
{
    fn receive(&self, path: &KeyPath, value: &str) { self(path, value) }
}
