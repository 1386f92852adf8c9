//! Handles into a registry's arena, and the dotted key paths assembled from them.

/// Stable handle to an observable registered with a [`crate::Registry`].
/// Handles are allocated in registration order and never reused.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of this node in registration order
    pub fn index(&self) -> usize { self.0 }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

/// A path of keys from the outermost ancestor down to a node, e.g. `s1.af1.0`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn new(segments: Vec<String>) -> Self { Self(segments) }

    pub fn segments(&self) -> &[String] { &self.0 }

    /// The node's own key
    pub fn leaf(&self) -> Option<&str> { self.0.last().map(String::as_str) }

    pub fn depth(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for KeyPath {
    fn from(val: &str) -> Self {
        if val.is_empty() {
            return KeyPath::default();
        }
        KeyPath(val.split('.').map(str::to_string).collect())
    }
}

impl From<String> for KeyPath {
    fn from(val: String) -> Self { KeyPath::from(val.as_str()) }
}

impl From<&String> for KeyPath {
    fn from(val: &String) -> Self { KeyPath::from(val.as_str()) }
}

impl From<&KeyPath> for KeyPath {
    fn from(val: &KeyPath) -> Self { val.clone() }
}

impl PartialEq<str> for KeyPath {
    fn eq(&self, other: &str) -> bool {
        // compare segment-wise without allocating the joined form
        let mut parts = other.split('.');
        for segment in &self.0 {
            match parts.next() {
                Some(part) if part == segment => {}
                _ => return false,
            }
        }
        parts.next().is_none() && !self.0.is_empty()
    }
}

impl PartialEq<&str> for KeyPath {
    fn eq(&self, other: &&str) -> bool { self == *other }
}
