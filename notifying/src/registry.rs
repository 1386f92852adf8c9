use std::sync::{Arc, RwLock, Weak};

use tracing::{debug, trace, warn};

use crate::{
    ConsoleListener, KeyPath, Listener, NodeId, Observable, Scope,
    error::UpdateError,
};

/// Routes value-change notifications to the active [`Listener`] and inbound
/// textual updates to the addressed observable.
///
/// Cloning a `Registry` yields another handle to the same arena. Every cell
/// keeps a handle to the registry it was constructed in.
#[derive(Clone)]
pub struct Registry(Arc<Inner>);

struct Inner {
    state: RwLock<State>,
    listener: RwLock<Arc<dyn Listener>>,
}

#[derive(Default)]
struct State {
    // append-only, indexed by NodeId
    records: Vec<Record>,
    roots: Vec<NodeId>,
}

struct Record {
    key: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    observable: Weak<dyn Observable>,
}

impl State {
    fn record(&self, id: NodeId) -> Option<&Record> { self.records.get(id.0) }

    fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent.and_then(|p| self.record(p)) {
            Some(parent) => &parent.children,
            None => &self.roots,
        }
    }

    /// Node at `segments` below `parent`. A key may itself contain dots, so each
    /// level tries the shortest run of segments first and earlier siblings before later ones.
    fn resolve(&self, parent: Option<NodeId>, segments: &[String]) -> Option<NodeId> {
        if segments.is_empty() {
            return parent;
        }
        for take in 1..=segments.len() {
            let key = segments[..take].join(".");
            for &id in self.siblings(parent).iter().filter(|id| self.records[id.0].key == key) {
                if let Some(found) = self.resolve(Some(id), &segments[take..]) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Earliest-registered sibling with the given key
    fn find(&self, parent: Option<NodeId>, key: &str) -> Option<NodeId> {
        self.siblings(parent).iter().copied().find(|id| self.records[id.0].key == key)
    }

    fn path(&self, id: NodeId) -> KeyPath {
        let mut keys = Vec::new();
        let mut current = self.record(id);
        while let Some(record) = current {
            keys.push(record.key.clone());
            current = record.parent.and_then(|p| self.record(p));
        }
        keys.reverse();
        KeyPath::new(keys)
    }
}

impl Default for Registry {
    fn default() -> Self { Self::new() }
}

impl Registry {
    /// A registry that reports changes through [`ConsoleListener`]
    pub fn new() -> Self { Self::with_listener(ConsoleListener) }

    pub fn with_listener(listener: impl Listener + 'static) -> Self {
        Self(Arc::new(Inner { state: RwLock::new(State::default()), listener: RwLock::new(Arc::new(listener)) }))
    }

    /// Scope for top-level observables
    pub fn root(&self) -> Scope<'_> { Scope::new(self, None) }

    /// Append an observable to the arena. Never fails and never deduplicates;
    /// a repeated sibling key is shadowed by the earlier registration for path lookups.
    pub fn register(&self, key: impl Into<String>, parent: Option<NodeId>, observable: Weak<dyn Observable>) -> NodeId {
        let key = key.into();
        let mut state = self.0.state.write().expect("registry lock is poisoned");
        let id = NodeId(state.records.len());

        let parent = match parent {
            Some(p) if state.record(p).is_none() => {
                warn!(%p, key = %key, "parent is not registered here, attaching at the root");
                None
            }
            other => other,
        };
        if state.find(parent, &key).is_some() {
            warn!(key = %key, ?parent, "duplicate sibling key");
        }
        if key.contains('.') {
            warn!(key = %key, "key contains the path separator; its paths are ambiguous");
        }

        match parent {
            Some(p) => state.records[p.0].children.push(id),
            None => state.roots.push(id),
        }
        state.records.push(Record { key, parent, children: Vec::new(), observable });
        debug!(%id, path = %state.path(id), "registered observable");
        id
    }

    /// Ask every registered observable, in registration order, to emit its current value.
    /// Composites and nodes whose notifications are delegated stay silent.
    pub fn notify_all(&self) {
        let observables: Vec<_> = {
            let state = self.0.state.read().expect("registry lock is poisoned");
            state.records.iter().map(|r| r.observable.clone()).collect()
        };
        debug!(count = observables.len(), "notifying all observables");
        for observable in observables {
            if let Some(observable) = observable.upgrade() {
                observable.send_update();
            }
        }
    }

    /// Like [`Registry::notify_all`], restricted to `id` and its descendants in declaration order
    pub fn notify_from(&self, id: NodeId) {
        let observables = {
            let state = self.0.state.read().expect("registry lock is poisoned");
            let mut observables = Vec::new();
            let mut stack = vec![id];
            while let Some(next) = stack.pop() {
                let Some(record) = state.record(next) else { continue };
                observables.push(record.observable.clone());
                stack.extend(record.children.iter().rev());
            }
            observables
        };
        for observable in observables {
            if let Some(observable) = observable.upgrade() {
                observable.send_update();
            }
        }
    }

    /// Forward a change of `id` to the active listener, addressed by its full dotted path
    pub fn dispatch(&self, id: NodeId, value: &str) {
        let path = self.path(id);
        // clone the listener so none of our locks are held while it runs
        let listener = self.0.listener.read().expect("listener lock is poisoned").clone();
        trace!(%path, value, "dispatching change");
        listener.receive(&path, value);
    }

    /// Apply `value` to the observable at the dotted `path`, without notifying.
    ///
    /// Returns `Ok(false)` when nothing lives at `path`.
    pub fn update(&self, path: impl Into<KeyPath>, value: &str) -> Result<bool, UpdateError> {
        let path = path.into();
        let Some(observable) = self.resolve(&path).and_then(|id| self.observable(id)) else {
            warn!(%path, "update addressed to unknown path");
            return Ok(false);
        };
        debug!(%path, value, "applying inbound update");
        observable.apply_text_update(value).inspect_err(|err| warn!(%path, %err, "inbound update rejected"))?;
        Ok(true)
    }

    /// Apply `value` to the first registered observable whose own key is `key`,
    /// regardless of where it is nested. Same-named fields in different
    /// subtrees are indistinguishable here; prefer [`Registry::update`].
    ///
    /// Array elements are registered under their index keys (`"0"`, `"1"`, ...),
    /// so a numeric `key` matches element `key` of the first array constructed.
    pub fn update_by_key(&self, key: &str, value: &str) -> Result<bool, UpdateError> {
        let candidates: Vec<_> = {
            let state = self.0.state.read().expect("registry lock is poisoned");
            state.records.iter().filter(|r| r.key == key).map(|r| r.observable.clone()).collect()
        };
        let Some(observable) = candidates.iter().find_map(Weak::upgrade) else {
            warn!(key, "update addressed to unknown key");
            return Ok(false);
        };
        debug!(key, value, "applying inbound update by key");
        observable.apply_text_update(value).inspect_err(|err| warn!(key, %err, "inbound update rejected"))?;
        Ok(true)
    }

    /// Find the node at a dotted path, matching segments against the children of the previous node
    pub fn resolve(&self, path: &KeyPath) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }
        self.0.state.read().expect("registry lock is poisoned").resolve(None, path.segments())
    }

    /// The live observable behind `id`, if its owner has not dropped it
    pub fn observable(&self, id: NodeId) -> Option<Arc<dyn Observable>> {
        self.0.state.read().expect("registry lock is poisoned").record(id)?.observable.upgrade()
    }

    pub fn path(&self, id: NodeId) -> KeyPath { self.0.state.read().expect("registry lock is poisoned").path(id) }

    pub fn key(&self, id: NodeId) -> Option<String> {
        self.0.state.read().expect("registry lock is poisoned").record(id).map(|r| r.key.clone())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.0.state.read().expect("registry lock is poisoned").record(id)?.parent
    }

    /// Children of `id` in declaration order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.0.state.read().expect("registry lock is poisoned").record(id).map(|r| r.children.clone()).unwrap_or_default()
    }

    /// Number of observables ever registered
    pub fn len(&self) -> usize { self.0.state.read().expect("registry lock is poisoned").records.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Replace the active listener. Subsequent notifications go to `listener` only.
    pub fn set_listener(&self, listener: impl Listener + 'static) {
        *self.0.listener.write().expect("listener lock is poisoned") = Arc::new(listener);
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("observables", &self.len()).finish()
    }
}
