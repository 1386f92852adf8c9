use std::sync::{Arc, Weak};

use crate::{
    KeyPath, NodeId, Observable, Registry, Scope,
    error::{IndexOutOfRange, UpdateError},
};

/// Registry node for a grouping that holds no value of its own.
/// Its children carry all notification responsibility.
struct Branch {
    id: NodeId,
    registry: Registry,
}

impl Branch {
    fn new(scope: Scope<'_>, key: String) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Branch>| {
            let observable: Weak<dyn Observable> = weak.clone();
            Branch { id: scope.register(key, observable), registry: scope.registry().clone() }
        })
    }

    fn scope(&self) -> Scope<'_> { Scope::new(&self.registry, Some(self.id)) }
}

impl Observable for Branch {
    fn node_id(&self) -> NodeId { self.id }

    fn registry(&self) -> &Registry { &self.registry }

    fn send_update(&self) {}

    fn apply_text_update(&self, _text: &str) -> Result<(), UpdateError> {
        // structured text for a whole subtree is not supported; address the leaves instead
        Err(UpdateError::Unsupported { path: self.path() })
    }
}

/// A named node grouping child observables, e.g. a nested struct.
///
/// ```
/// use notifying::{ArrayCell, Composite, Registry, ScalarCell, Scope};
///
/// struct Position {
///     node: Composite,
///     x: ScalarCell<f64>,
///     history: ArrayCell<f64, 3>,
/// }
///
/// impl Position {
///     fn new(scope: Scope<'_>, key: &str) -> Self {
///         let node = Composite::new(scope, key);
///         let x = ScalarCell::new(node.scope(), "x");
///         let history = ArrayCell::new(node.scope(), "history");
///         Position { node, x, history }
///     }
/// }
///
/// let registry = Registry::new();
/// let position = Position::new(registry.root(), "position");
/// position.x.set(1.5); // prints "position.x updated, new value: 1.5"
/// assert_eq!(position.node.children().len(), 2);
/// ```
#[derive(Clone)]
pub struct Composite(Arc<Branch>);

impl Composite {
    pub fn new(scope: Scope<'_>, key: impl Into<String>) -> Self { Self(Branch::new(scope, key.into())) }

    /// Scope for constructing this composite's children
    pub fn scope(&self) -> Scope<'_> { self.0.scope() }

    /// Child nodes in declaration order
    pub fn children(&self) -> Vec<NodeId> { self.0.registry.children(self.0.id) }

    /// Emit the current value of every value-bearing node beneath this one
    pub fn notify_all(&self) { self.0.registry.notify_from(self.0.id) }
}

impl Observable for Composite {
    fn node_id(&self) -> NodeId { self.0.id }

    fn registry(&self) -> &Registry { &self.0.registry }

    fn send_update(&self) {}

    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError> { self.0.apply_text_update(text) }
}

impl std::fmt::Display for Composite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "<Struct {} updated>", self.key()) }
}

impl std::fmt::Debug for Composite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composite").field("id", &self.0.id).field("path", &self.path()).finish()
    }
}

/// Fixed-size sequence of nested observables (typically composites), keyed by index.
/// Elements notify on their own; the array never does.
pub struct NodeArray<E, const N: usize> {
    branch: Arc<Branch>,
    elements: [E; N],
}

impl<E, const N: usize> NodeArray<E, N> {
    /// Build each element from its scope (parented to the array) and its index key
    pub fn new(scope: Scope<'_>, key: impl Into<String>, mut build: impl FnMut(Scope<'_>, &str) -> E) -> Self {
        let branch = Branch::new(scope, key.into());
        let elements = std::array::from_fn(|i| build(branch.scope(), &i.to_string()));
        Self { branch, elements }
    }

    pub fn element(&self, index: usize) -> Result<&E, IndexOutOfRange> { self.elements.get(index).ok_or(IndexOutOfRange { index, len: N }) }

    pub fn iter(&self) -> std::slice::Iter<'_, E> { self.elements.iter() }

    pub fn len(&self) -> usize { N }

    pub fn is_empty(&self) -> bool { N == 0 }
}

impl<E: Send + Sync, const N: usize> Observable for NodeArray<E, N> {
    fn node_id(&self) -> NodeId { self.branch.id }

    fn registry(&self) -> &Registry { &self.branch.registry }

    fn send_update(&self) {}

    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError> { self.branch.apply_text_update(text) }
}

impl<E, const N: usize> std::ops::Index<usize> for NodeArray<E, N> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        match self.element(index) {
            Ok(element) => element,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<E, const N: usize> std::fmt::Debug for NodeArray<E, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path: KeyPath = self.branch.path();
        f.debug_struct("NodeArray").field("path", &path).field("len", &N).finish()
    }
}
