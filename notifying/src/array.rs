use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::{
    CellValue, NodeId, Observable, Registry, ScalarCell, Scope,
    error::{IndexOutOfRange, UpdateError},
};

/// How an [`ArrayCell`] reports element changes. Fixed per array type.
pub trait ArrayMode: Send + Sync + 'static {
    const WHOLE_ARRAY: bool;
}

/// Any element change emits one notification for the whole array, keyed by the
/// array and rendered as `[v0 v1 ... ]`. Elements never notify on their own.
pub struct WholeArray;

/// Each element notifies independently under `<array>.<index>`. The array itself never notifies.
pub struct PerElement;

impl ArrayMode for WholeArray {
    const WHOLE_ARRAY: bool = true;
}

impl ArrayMode for PerElement {
    const WHOLE_ARRAY: bool = false;
}

/// Fixed-size sequence of `N` scalar cells keyed `"0"`, `"1"`, ... and parented to the array.
pub struct ArrayCell<T, const N: usize, M = WholeArray>(Arc<Inner<T, N, M>>);

struct Inner<T, const N: usize, M> {
    id: NodeId,
    registry: Registry,
    elements: [ScalarCell<T>; N],
    mode: PhantomData<M>,
}

impl<T, const N: usize, M> Clone for ArrayCell<T, N, M> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: CellValue, const N: usize, M: ArrayMode> ArrayCell<T, N, M> {
    /// An array with every element at `T::default()`
    pub fn new(scope: Scope<'_>, key: impl Into<String>) -> Self
    where T: Default {
        Self::with_values(scope, key, std::array::from_fn(|_| T::default()))
    }

    pub fn with_values(scope: Scope<'_>, key: impl Into<String>, values: [T; N]) -> Self {
        let key = key.into();
        Self(Arc::new_cyclic(|weak: &Weak<Inner<T, N, M>>| {
            let observable: Weak<dyn Observable> = weak.clone();
            let id = scope.register(key, observable.clone());
            let registry = scope.registry().clone();
            let elements = {
                let element_scope = Scope::new(&registry, Some(id));
                let mut index = 0usize;
                values.map(|value| {
                    let owner = M::WHOLE_ARRAY.then(|| observable.clone());
                    let element = ScalarCell::build(element_scope, index.to_string(), value, owner);
                    index += 1;
                    element
                })
            };
            Inner { id, registry, elements, mode: PhantomData }
        }))
    }

    pub fn element(&self, index: usize) -> Result<&ScalarCell<T>, IndexOutOfRange> {
        self.0.elements.get(index).ok_or(IndexOutOfRange { index, len: N })
    }

    /// Assign one element. Notifies according to the array's mode.
    pub fn set(&self, index: usize, value: T) -> Result<(), IndexOutOfRange> {
        self.element(index)?.set(value);
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScalarCell<T>> { self.0.elements.iter() }

    pub fn len(&self) -> usize { N }

    pub fn is_empty(&self) -> bool { N == 0 }
}

impl<T: CellValue + Clone, const N: usize, M: ArrayMode> ArrayCell<T, N, M> {
    pub fn get(&self, index: usize) -> Result<T, IndexOutOfRange> { Ok(self.element(index)?.get()) }

    pub fn values(&self) -> [T; N] { std::array::from_fn(|i| self.0.elements[i].get()) }
}

impl<T: CellValue, const N: usize, M> Inner<T, N, M> {
    fn render(&self) -> String {
        let mut text = String::from("[");
        for element in &self.elements {
            element.with(|value| text.push_str(&value.format_text()));
            text.push(' ');
        }
        text.push(']');
        text
    }
}

/// Split inbound array text into tokens.
///
/// The rendered form (`[1 2 3 ]`) splits on whitespace. Anything else is the
/// comma-separated update form (`1,2,3`), where a single trailing empty field is
/// dropped so `1,2,` carries two tokens.
fn tokens(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if let Some(body) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return if body.contains(',') { split_fields(body) } else { body.split_whitespace().collect() };
    }
    split_fields(text)
}

fn split_fields(text: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = text.split(',').collect();
    if fields.len() > 1 && fields.last().is_some_and(|f| f.trim().is_empty()) {
        fields.pop();
    }
    fields
}

impl<T: CellValue, const N: usize, M: ArrayMode> Observable for Inner<T, N, M> {
    fn node_id(&self) -> NodeId { self.id }

    fn registry(&self) -> &Registry { &self.registry }

    fn send_update(&self) {
        if M::WHOLE_ARRAY {
            self.registry.dispatch(self.id, &self.render());
        }
    }

    /// Tokens are assigned by position. Tokens past `N` are ignored and elements
    /// past the last token keep their values. Nothing is stored if any token fails to parse.
    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError> {
        let parsed = tokens(text).into_iter().take(N).map(T::parse_text).collect::<Result<Vec<_>, _>>()?;
        debug!(id = %self.id, count = parsed.len(), "storing inbound array values");
        for (element, value) in self.elements.iter().zip(parsed) {
            element.store(value);
        }
        Ok(())
    }
}

impl<T: CellValue, const N: usize, M: ArrayMode> Observable for ArrayCell<T, N, M> {
    fn node_id(&self) -> NodeId { self.0.id }

    fn registry(&self) -> &Registry { &self.0.registry }

    fn send_update(&self) { self.0.send_update() }

    fn apply_text_update(&self, text: &str) -> Result<(), UpdateError> { self.0.apply_text_update(text) }
}

impl<T: CellValue, const N: usize, M: ArrayMode> std::ops::Index<usize> for ArrayCell<T, N, M> {
    type Output = ScalarCell<T>;

    fn index(&self, index: usize) -> &Self::Output {
        match self.element(index) {
            Ok(element) => element,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: CellValue, const N: usize, M> std::fmt::Display for ArrayCell<T, N, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0.render()) }
}

impl<T: CellValue, const N: usize, M> std::fmt::Debug for ArrayCell<T, N, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayCell").field("id", &self.0.id).field("values", &self.0.render()).finish()
    }
}
