//! Key paths addressing a node inside a document tree.

use std::fmt;
use std::str::FromStr;

use crate::bencode::Value;
use crate::{Error, Result};

/// An ordered list of dictionary keys leading from the document root to a
/// node.
///
/// For delete and set-string transforms the node is the dictionary that
/// *contains* the field being edited; for substitutions it is the value
/// itself. The empty path addresses the root.
///
/// # Examples
///
/// ```
/// use announcebulk::KeyPath;
///
/// let path = KeyPath::parse("info/source").unwrap();
/// assert_eq!(path.keys(), ["info", "source"]);
/// assert_eq!(path.to_string(), "info/source");
///
/// assert!(KeyPath::parse("").unwrap().is_root());
/// assert!(KeyPath::parse("info//source").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Separator used by [`KeyPath::parse`] and the `Display` impl.
    pub const SEPARATOR: char = '/';

    /// Returns the empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a sequence of keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Parses a `/`-separated path. The empty string is the root path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyPath`] if any segment is empty.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let keys: Vec<String> = s.split(Self::SEPARATOR).map(str::to_string).collect();
        if keys.iter().any(String::is_empty) {
            return Err(Error::InvalidKeyPath(format!(
                "empty segment in '{}'",
                s
            )));
        }
        Ok(Self(keys))
    }

    /// Returns the keys in order.
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if this path has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if this path addresses the document root.
    pub fn is_root(&self) -> bool {
        self.is_empty()
    }

    /// Appends a key.
    pub fn push(&mut self, key: impl Into<String>) {
        self.0.push(key.into());
    }

    /// Returns a new path with `key` appended.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(key);
        path
    }

    /// Splits off the last key, returning the parent path and that key.
    ///
    /// Returns `None` for the root path.
    pub fn split_last(&self) -> Option<(KeyPath, &str)> {
        let (last, parent) = self.0.split_last()?;
        Some((KeyPath(parent.to_vec()), last.as_str()))
    }

    /// Walks `root` along this path.
    ///
    /// Every node passed through must be a dictionary. A missing key is
    /// not an error: it yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongBencodeType`] if a node on the way is not a
    /// dictionary.
    pub fn resolve<'v>(&self, root: &'v Value) -> Result<Option<&'v Value>> {
        let mut node = root;
        for key in &self.0 {
            let dict = match node {
                Value::Dict(dict) => dict,
                other => return Err(not_a_dict(other)),
            };
            match dict.get(key) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// Mutable form of [`KeyPath::resolve`].
    pub fn resolve_mut<'v>(&self, root: &'v mut Value) -> Result<Option<&'v mut Value>> {
        let mut node = root;
        for key in &self.0 {
            let dict = match node {
                Value::Dict(dict) => dict,
                other => return Err(not_a_dict(other)),
            };
            match dict.get_mut(key) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }
}

fn not_a_dict(value: &Value) -> Error {
    Error::WrongBencodeType {
        expected: "dictionary",
        found: value.type_name(),
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            f.write_str(key)?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
