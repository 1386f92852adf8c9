use std::sync::Weak;

use crate::{KeyPath, NodeId, Registry, error::UpdateError};

/// Anything registered with a [`Registry`] that can report its key and parent,
/// emit its current value, and accept an inbound textual update.
///
/// Must stay dyn safe: the registry stores every node as `Weak<dyn Observable>`.
pub trait Observable: Send + Sync {
    fn node_id(&self) -> NodeId;

    fn registry(&self) -> &Registry;

    /// Emit the current value to the registry's listener. Nodes that delegate
    /// notification to their children (or to their parent) do nothing here.
    fn send_update(&self);

    /// Store a value parsed from `text` without emitting a notification.
    /// On failure the held value is left unchanged.
    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError>;

    fn key(&self) -> String { self.registry().key(self.node_id()).unwrap_or_default() }

    fn parent(&self) -> Option<NodeId> { self.registry().parent(self.node_id()) }

    /// Dotted path from the outermost ancestor to this node
    fn path(&self) -> KeyPath { self.registry().path(self.node_id()) }
}

/// Where a new observable is attached: a registry plus an optional parent node.
///
/// Obtain one from [`Registry::root`] for top-level values, or from
/// [`crate::Composite::scope`] for fields nested inside a composite.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    registry: &'a Registry,
    parent: Option<NodeId>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(registry: &'a Registry, parent: Option<NodeId>) -> Self { Self { registry, parent } }

    pub fn registry(&self) -> &'a Registry { self.registry }

    pub fn parent(&self) -> Option<NodeId> { self.parent }

    /// Register an observable under `key` within this scope
    pub fn register(&self, key: impl Into<String>, observable: Weak<dyn Observable>) -> NodeId {
        self.registry.register(key, self.parent, observable)
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope").field("parent", &self.parent).finish()
    }
}
