use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

use crate::{CellValue, NodeId, Observable, Registry, Scope, error::UpdateError};

/// A single value that notifies its registry on every assignment.
///
/// Reads never notify. Clones are handles to the same cell.
pub struct ScalarCell<T>(Arc<Inner<T>>);

struct Inner<T> {
    id: NodeId,
    registry: Registry,
    value: RwLock<T>,
    // set for whole-array elements: the array notifies on their behalf
    owner: Option<Weak<dyn Observable>>,
}

impl<T> Clone for ScalarCell<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: CellValue> ScalarCell<T> {
    /// A cell holding `T::default()`
    pub fn new(scope: Scope<'_>, key: impl Into<String>) -> Self
    where T: Default {
        Self::with_value(scope, key, T::default())
    }

    pub fn with_value(scope: Scope<'_>, key: impl Into<String>, value: T) -> Self { Self::build(scope, key.into(), value, None) }

    pub(crate) fn build(scope: Scope<'_>, key: String, value: T, owner: Option<Weak<dyn Observable>>) -> Self {
        Self(Arc::new_cyclic(|weak: &Weak<Inner<T>>| {
            let observable: Weak<dyn Observable> = weak.clone();
            let id = scope.register(key, observable);
            Inner { id, registry: scope.registry().clone(), value: RwLock::new(value), owner }
        }))
    }

    /// Store `value`, then emit exactly one notification carrying it
    pub fn set(&self, value: T) {
        let text = {
            let mut current = self.0.value.write().expect("value lock is poisoned");
            *current = value;
            current.format_text()
        };
        self.0.changed(&text);
    }

    /// Calls a closure with a borrow of the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.0.value.read().expect("value lock is poisoned");
        f(&*guard)
    }

    /// Store without notifying
    pub(crate) fn store(&self, value: T) { *self.0.value.write().expect("value lock is poisoned") = value; }
}

impl<T: CellValue + Clone> ScalarCell<T> {
    pub fn get(&self) -> T { self.0.value.read().expect("value lock is poisoned").clone() }

    /// Modify a copy of the value, store it, then emit exactly one notification carrying the result.
    /// `f` runs without any lock held; if it panics the cell keeps its previous value.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.get();
        let result = f(&mut value);
        self.set(value);
        result
    }
}

impl<T: CellValue> Inner<T> {
    fn changed(&self, text: &str) {
        match &self.owner {
            Some(owner) => {
                if let Some(owner) = owner.upgrade() {
                    owner.send_update();
                }
            }
            None => self.registry.dispatch(self.id, text),
        }
    }
}

impl<T: CellValue> Observable for Inner<T> {
    fn node_id(&self) -> NodeId { self.id }

    fn registry(&self) -> &Registry { &self.registry }

    fn send_update(&self) {
        if self.owner.is_some() {
            return;
        }
        let text = self.value.read().expect("value lock is poisoned").format_text();
        self.registry.dispatch(self.id, &text);
    }

    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError> {
        let value = T::parse_text(text)?;
        debug!(id = %self.id, text, "storing inbound value");
        *self.value.write().expect("value lock is poisoned") = value;
        Ok(())
    }
}

impl<T: CellValue> Observable for ScalarCell<T> {
    fn node_id(&self) -> NodeId { self.0.id }

    fn registry(&self) -> &Registry { &self.0.registry }

    fn send_update(&self) { self.0.send_update() }

    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError> { self.0.apply_text_update(text) }
}

impl<T: CellValue + PartialEq> PartialEq<T> for ScalarCell<T> {
    fn eq(&self, other: &T) -> bool { self.with(|value| value == other) }
}

impl<T: CellValue + std::fmt::Display> std::fmt::Display for ScalarCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.with(|v| write!(f, "{}", v)) }
}

impl<T: CellValue + std::fmt::Debug> std::fmt::Debug for ScalarCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| f.debug_struct("ScalarCell").field("id", &self.0.id).field("value", value).finish())
    }
}
