use thiserror::Error;

use crate::KeyPath;

/// Inbound text could not be converted to the cell's value type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {text:?} as {target}")]
pub struct ParseError {
    pub text: String,
    pub target: &'static str,
}

impl ParseError {
    pub fn new<T: ?Sized>(text: &str) -> Self { Self { text: text.to_string(), target: std::any::type_name::<T>() } }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{path} does not accept text updates")]
    Unsupported { path: KeyPath },
}

/// Array element access beyond the fixed length
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("index {index} out of range for array of length {len}")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}
