//! Transform definitions.

use std::fmt;
use std::str::FromStr;

use regex::bytes::Regex;

use super::KeyPath;
use crate::{Error, Result};

/// The edit a [`Transform`] performs at its key path.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Remove `key` from the dictionary at the key path.
    Delete {
        /// Field to remove.
        key: String,
    },
    /// Insert or overwrite `key` in the dictionary at the key path.
    SetString {
        /// Field to set.
        key: String,
        /// New string value.
        value: String,
    },
    /// Literal first-occurrence replacement in the string (or every string
    /// of the list) at the key path.
    Substitute {
        /// Text to look for.
        find: String,
        /// Replacement text.
        replace: String,
    },
    /// Pattern replacement in the string (or every string of the list) at
    /// the key path.
    SubstituteRegex {
        /// Compiled pattern.
        pattern: Regex,
        /// Replacement template; may reference capture groups.
        replace: String,
    },
}

impl Operation {
    /// Returns the kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::SetString { .. } => OperationKind::SetString,
            Operation::Substitute { .. } => OperationKind::Substitute,
            Operation::SubstituteRegex { .. } => OperationKind::SubstituteRegex,
        }
    }
}

/// Operation tag without payload, parseable from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// See [`Operation::Delete`].
    Delete,
    /// See [`Operation::SetString`].
    SetString,
    /// See [`Operation::Substitute`].
    Substitute,
    /// See [`Operation::SubstituteRegex`].
    SubstituteRegex,
}

impl OperationKind {
    /// Returns the operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Delete => "delete",
            OperationKind::SetString => "set-string",
            OperationKind::Substitute => "substitute",
            OperationKind::SubstituteRegex => "substitute-regex",
        }
    }

    /// Number of string arguments a transform of this kind takes.
    pub fn arity(&self) -> usize {
        match self {
            OperationKind::Delete => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    /// Parses an operation name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongTransformOperation`] for unknown names.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "delete" => Ok(OperationKind::Delete),
            "set-string" => Ok(OperationKind::SetString),
            "substitute" => Ok(OperationKind::Substitute),
            "substitute-regex" => Ok(OperationKind::SubstituteRegex),
            other => Err(Error::WrongTransformOperation {
                operation: other.to_string(),
            }),
        }
    }
}

/// A single declarative edit: a key path plus an [`Operation`].
///
/// Transforms are immutable once built and are shared read-only by every
/// file of a batch.
///
/// # Example
///
/// ```
/// use announcebulk::{KeyPath, Transform};
///
/// let t = Transform::substitute(KeyPath::new(["announce"]), "apollo.rip", "orpheus.network");
/// assert_eq!(t.to_string(), "substitute announce: 'apollo.rip' -> 'orpheus.network'");
/// ```
#[derive(Debug, Clone)]
pub struct Transform {
    key_path: KeyPath,
    operation: Operation,
}

impl Transform {
    /// Creates a transform from its parts.
    pub fn new(key_path: KeyPath, operation: Operation) -> Self {
        Self {
            key_path,
            operation,
        }
    }

    /// Builds a delete transform.
    pub fn delete(key_path: KeyPath, key: impl Into<String>) -> Self {
        Self::new(key_path, Operation::Delete { key: key.into() })
    }

    /// Builds a set-string transform.
    pub fn set_string(key_path: KeyPath, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            key_path,
            Operation::SetString {
                key: key.into(),
                value: value.into(),
            },
        )
    }

    /// Builds a literal substitution transform.
    pub fn substitute(
        key_path: KeyPath,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self::new(
            key_path,
            Operation::Substitute {
                find: find.into(),
                replace: replace.into(),
            },
        )
    }

    /// Builds a pattern substitution transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`] if `pattern` does not compile.
    pub fn substitute_regex(
        key_path: KeyPath,
        pattern: &str,
        replace: impl Into<String>,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(
            key_path,
            Operation::SubstituteRegex {
                pattern,
                replace: replace.into(),
            },
        ))
    }

    /// Builds a transform from an operation name, a textual key path and
    /// the operation's string arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongTransformOperation`] for an unknown name or a
    /// wrong number of arguments, [`Error::InvalidKeyPath`] for a bad path,
    /// and [`Error::InvalidRegex`] for a bad pattern.
    pub fn parse(operation: &str, key_path: &str, args: &[&str]) -> Result<Self> {
        let kind: OperationKind = operation.parse()?;
        if args.len() != kind.arity() {
            return Err(Error::WrongTransformOperation {
                operation: format!(
                    "{} takes {} argument(s), got {}",
                    kind,
                    kind.arity(),
                    args.len()
                ),
            });
        }
        let key_path = KeyPath::parse(key_path)?;
        Ok(match kind {
            OperationKind::Delete => Self::delete(key_path, args[0]),
            OperationKind::SetString => Self::set_string(key_path, args[0], args[1]),
            OperationKind::Substitute => Self::substitute(key_path, args[0], args[1]),
            OperationKind::SubstituteRegex => {
                Self::substitute_regex(key_path, args[0], args[1])?
            }
        })
    }

    /// Returns the key path.
    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    /// Returns the operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Returns the operation kind.
    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.key_path.is_root() {
            "<root>".to_string()
        } else {
            self.key_path.to_string()
        };
        match &self.operation {
            Operation::Delete { key } => write!(f, "delete {}: '{}'", path, key),
            Operation::SetString { key, value } => {
                write!(f, "set-string {}: '{}' = '{}'", path, key, value)
            }
            Operation::Substitute { find, replace } => {
                write!(f, "substitute {}: '{}' -> '{}'", path, find, replace)
            }
            Operation::SubstituteRegex { pattern, replace } => write!(
                f,
                "substitute-regex {}: /{}/ -> '{}'",
                path,
                pattern.as_str(),
                replace
            ),
        }
    }
}

/// Builder for creating transform lists fluently.
#[derive(Debug, Default)]
pub struct TransformBuilder {
    transforms: Vec<Transform>,
}

impl TransformBuilder {
    /// Creates a new transform builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a delete transform.
    pub fn delete(mut self, key_path: KeyPath, key: impl Into<String>) -> Self {
        self.transforms.push(Transform::delete(key_path, key));
        self
    }

    /// Adds a set-string transform.
    pub fn set_string(
        mut self,
        key_path: KeyPath,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.transforms
            .push(Transform::set_string(key_path, key, value));
        self
    }

    /// Adds a literal substitution transform.
    pub fn substitute(
        mut self,
        key_path: KeyPath,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        self.transforms
            .push(Transform::substitute(key_path, find, replace));
        self
    }

    /// Adds a pattern substitution transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`] if `pattern` does not compile.
    pub fn substitute_regex(
        mut self,
        key_path: KeyPath,
        pattern: &str,
        replace: impl Into<String>,
    ) -> Result<Self> {
        self.transforms
            .push(Transform::substitute_regex(key_path, pattern, replace)?);
        Ok(self)
    }

    /// Adds already-built transforms, such as a preset.
    pub fn extend(mut self, transforms: impl IntoIterator<Item = Transform>) -> Self {
        self.transforms.extend(transforms);
        self
    }

    /// Returns the number of transforms added so far.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns `true` if no transforms were added.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Builds the list of transforms.
    pub fn build(self) -> Vec<Transform> {
        self.transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_from_str() {
        assert_eq!("delete".parse::<OperationKind>().unwrap(), OperationKind::Delete);
        assert_eq!(
            "substitute-regex".parse::<OperationKind>().unwrap(),
            OperationKind::SubstituteRegex
        );
        match "rename".parse::<OperationKind>() {
            Err(Error::WrongTransformOperation { operation }) => assert_eq!(operation, "rename"),
            other => panic!("Expected WrongTransformOperation, got: {:?}", other),
        }
    }

    #[test]
    fn test_substitute_regex_invalid_pattern() {
        let err = Transform::substitute_regex(KeyPath::root(), "[unclosed", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidRegex { ref pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn test_parse_transform() {
        let t = Transform::parse("set-string", "info", &["source", "OPS"]).unwrap();
        assert_eq!(t.kind(), OperationKind::SetString);
        assert_eq!(t.key_path(), &KeyPath::new(["info"]));

        let err = Transform::parse("delete", "info", &[]).unwrap_err();
        assert!(matches!(err, Error::WrongTransformOperation { .. }));

        let err = Transform::parse("delete", "info//x", &["a"]).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyPath(_)));
    }

    #[test]
    fn test_transform_display() {
        let t = Transform::delete(KeyPath::root(), "comment");
        assert_eq!(t.to_string(), "delete <root>: 'comment'");
        let t = Transform::substitute_regex(KeyPath::new(["announce"]), "a+", "b").unwrap();
        assert_eq!(t.to_string(), "substitute-regex announce: /a+/ -> 'b'");
    }

    #[test]
    fn test_transform_builder() {
        let transforms = TransformBuilder::new()
            .delete(KeyPath::root(), "comment")
            .set_string(KeyPath::new(["info"]), "source", "OPS")
            .substitute(KeyPath::new(["announce"]), "a", "b")
            .substitute_regex(KeyPath::new(["announce"]), "^x", "y")
            .unwrap()
            .build();

        assert_eq!(transforms.len(), 4);
        assert_eq!(transforms[0].kind(), OperationKind::Delete);
        assert_eq!(transforms[1].kind(), OperationKind::SetString);
        assert_eq!(transforms[2].kind(), OperationKind::Substitute);
        assert_eq!(transforms[3].kind(), OperationKind::SubstituteRegex);
    }
}
