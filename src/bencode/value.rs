//! In-memory bencode values.

use indexmap::IndexMap;

/// A decoded bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed integer (`i<n>e`).
    Integer(i64),
    /// A byte string (`<len>:<bytes>`). Not necessarily UTF-8.
    Bytes(Vec<u8>),
    /// A list of values (`l...e`).
    List(Vec<Value>),
    /// A dictionary keyed by byte strings (`d...e`).
    Dict(Dict),
}

impl Value {
    /// Returns a short human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }

    /// Returns the integer if this is an [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the bytes if this is a [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the bytes as UTF-8 text, if this is a valid UTF-8 byte string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the list if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mutable list if this is a [`Value::List`].
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the dictionary if this is a [`Value::Dict`].
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Returns the mutable dictionary if this is a [`Value::Dict`].
    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Value::Dict(dict)
    }
}

/// An insertion-ordered bencode dictionary.
///
/// Keys are unique byte strings. Overwriting an existing key keeps its
/// position; new keys are appended. Lookups are hashed, so decoding a
/// dictionary is linear in its size.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<Vec<u8>, Value>,
}

/// Two dictionaries are equal when they hold the same entries in the same
/// order, since order decides the encoding.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for Dict {}

impl Dict {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Returns the value stored at `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        self.entries.get(key.as_ref())
    }

    /// Returns the mutable value stored at `key`.
    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut Value> {
        self.entries.get_mut(key.as_ref())
    }

    /// Inserts or overwrites `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Detaches the value stored at `key` and hands it to the caller.
    ///
    /// The remaining entries keep their relative order.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<Value> {
        self.entries.shift_remove(key.as_ref())
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|(k, _)| k.as_slice())
    }

    /// Iterates over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// Iterates over `(key, value)` pairs in order with mutable values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&[u8], &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_slice(), v))
    }
}

impl<K: Into<Vec<u8>>> FromIterator<(K, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}
