//! Payload keys within a parent aggregate

use std::fmt;

/// Where an event's payload belongs inside its parent aggregate
///
/// Sequence strategies ignore the key entirely; bean and record strategies
/// only accept [`Key::Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key<'a> {
    /// The document root (no parent)
    Root,
    /// Member of a keyed object
    Field(&'a str),
    /// Position inside an array
    Index(usize),
}

impl<'a> Key<'a> {
    /// Field name, if this key names one
    pub fn as_field(&self) -> Option<&'a str> {
        match self {
            Key::Field(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Root => f.write_str("<root>"),
            Key::Field(name) => f.write_str(name),
            Key::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Field(name)
    }
}

impl From<usize> for Key<'_> {
    fn from(idx: usize) -> Self {
        Key::Index(idx)
    }
}
