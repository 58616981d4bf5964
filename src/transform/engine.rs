//! Applies transforms to a decoded document tree.

use log::debug;

use super::operation::{Operation, Transform};
use super::substitute::{substitute, substitute_regex};
use crate::bencode::Value;
use crate::{Error, Result};

/// Outcome of applying one transform.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied {
    /// The key path does not exist in this document.
    Skipped,
    /// A delete ran; holds the detached value, or `None` if the key was
    /// already absent.
    Deleted(Option<Value>),
    /// A set-string ran; holds the overwritten value, if any.
    Set(Option<Value>),
    /// A substitution ran over this many strings.
    Substituted {
        /// Strings visited.
        visited: usize,
        /// Strings whose content actually changed.
        changed: usize,
    },
}

/// Counters accumulated by [`apply_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Transforms whose key path resolved.
    pub applied: usize,
    /// Transforms skipped because their key path was absent.
    pub skipped: usize,
    /// Fields removed by delete transforms.
    pub deleted: usize,
    /// Fields written by set-string transforms.
    pub set: usize,
    /// Strings changed by substitutions.
    pub substituted: usize,
}

impl TransformStats {
    /// Returns `true` if any transform changed the document.
    pub fn modified(&self) -> bool {
        self.deleted + self.set + self.substituted > 0
    }
}

impl std::ops::AddAssign for TransformStats {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.deleted += other.deleted;
        self.set += other.set;
        self.substituted += other.substituted;
    }
}

/// Applies one transform to `root`.
///
/// A key path that does not exist yields [`Applied::Skipped`]; the document
/// is left untouched.
///
/// # Errors
///
/// Returns [`Error::WrongBencodeType`] when the key path runs through a
/// non-dictionary, when a delete or set-string target is not a dictionary,
/// or when a substitution target is neither a string nor a list of
/// strings. A failed transform leaves the document unchanged.
pub fn apply(transform: &Transform, root: &mut Value) -> Result<Applied> {
    let Some(target) = transform.key_path().resolve_mut(root)? else {
        return Ok(Applied::Skipped);
    };

    match transform.operation() {
        Operation::Delete { key } => {
            let dict = expect_dict(target)?;
            Ok(Applied::Deleted(dict.remove(key)))
        }
        Operation::SetString { key, value } => {
            let dict = expect_dict(target)?;
            Ok(Applied::Set(
                dict.insert(key.as_str(), Value::from(value.as_str())),
            ))
        }
        Operation::Substitute { find, replace } => substitute_strings(target, |s| {
            substitute(s, find.as_bytes(), replace.as_bytes())
        }),
        Operation::SubstituteRegex { pattern, replace } => substitute_strings(target, |s| {
            substitute_regex(s, pattern, replace.as_bytes())
        }),
    }
}

/// Applies every transform to `root`, in order.
///
/// Values detached by delete transforms are released here.
///
/// # Errors
///
/// The first failing transform aborts the rest; transforms before it have
/// already been applied to the tree.
pub fn apply_all(transforms: &[Transform], root: &mut Value) -> Result<TransformStats> {
    let mut stats = TransformStats::default();
    for transform in transforms {
        match apply(transform, root)? {
            Applied::Skipped => {
                debug!("skipping '{}': key path not present", transform);
                stats.skipped += 1;
                continue;
            }
            Applied::Deleted(removed) => {
                if removed.is_some() {
                    stats.deleted += 1;
                }
            }
            Applied::Set(_) => stats.set += 1,
            Applied::Substituted { changed, .. } => stats.substituted += changed,
        }
        stats.applied += 1;
    }
    Ok(stats)
}

fn expect_dict(value: &mut Value) -> Result<&mut crate::bencode::Dict> {
    match value {
        Value::Dict(dict) => Ok(dict),
        other => Err(Error::WrongBencodeType {
            expected: "dictionary",
            found: other.type_name(),
        }),
    }
}

const SUBSTITUTE_TARGET: &str = "string or list of strings";

/// Runs `edit` over the string at `target`, or over every element of the
/// list at `target`. All list elements are checked before any is edited.
fn substitute_strings(
    target: &mut Value,
    edit: impl Fn(&[u8]) -> Vec<u8>,
) -> Result<Applied> {
    let mut visited = 0;
    let mut changed = 0;
    let mut rewrite = |bytes: &mut Vec<u8>| {
        let replaced = edit(bytes);
        visited += 1;
        if replaced != *bytes {
            changed += 1;
            *bytes = replaced;
        }
    };

    match target {
        Value::Bytes(bytes) => rewrite(bytes),
        Value::List(items) => {
            if let Some(bad) = items.iter().find(|item| !matches!(item, Value::Bytes(_))) {
                return Err(Error::WrongBencodeType {
                    expected: SUBSTITUTE_TARGET,
                    found: bad.type_name(),
                });
            }
            for item in items.iter_mut() {
                if let Value::Bytes(bytes) = item {
                    rewrite(bytes);
                }
            }
        }
        other => {
            return Err(Error::WrongBencodeType {
                expected: SUBSTITUTE_TARGET,
                found: other.type_name(),
            });
        }
    }
    Ok(Applied::Substituted { visited, changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::{decode, encode};
    use crate::transform::KeyPath;

    fn torrent() -> Value {
        decode(
            b"d8:announce30:http://apollo.rip/abc/announce\
              13:announce-listl30:http://apollo.rip/abc/announce16:udp://other:1337e\
              7:comment5:hello\
              4:infod6:lengthi5e4:name5:a.txt7:privatei1eee",
        )
        .unwrap()
    }

    fn dict_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        value.as_dict().unwrap().get(key)
    }

    #[test]
    fn test_delete_existing_key_returns_value() {
        let mut doc = torrent();
        let t = Transform::delete(KeyPath::root(), "comment");
        let applied = apply(&t, &mut doc).unwrap();
        assert_eq!(applied, Applied::Deleted(Some(Value::from("hello"))));
        assert!(dict_get(&doc, "comment").is_none());
        assert_eq!(doc.as_dict().unwrap().len(), 3);
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let mut doc = torrent();
        let before = doc.clone();
        let t = Transform::delete(KeyPath::root(), "created by");
        assert_eq!(apply(&t, &mut doc).unwrap(), Applied::Deleted(None));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_on_non_dict_is_wrong_type() {
        let mut doc = torrent();
        let t = Transform::delete(KeyPath::new(["announce-list"]), "x");
        assert!(matches!(
            apply(&t, &mut doc),
            Err(Error::WrongBencodeType { expected: "dictionary", found: "list" })
        ));
    }

    #[test]
    fn test_delete_nested() {
        let mut doc = torrent();
        let t = Transform::delete(KeyPath::new(["info"]), "private");
        apply(&t, &mut doc).unwrap();
        let info = dict_get(&doc, "info").unwrap();
        assert!(info.as_dict().unwrap().get("private").is_none());
    }

    #[test]
    fn test_set_string_insert_and_overwrite() {
        let mut doc = torrent();
        let t = Transform::set_string(KeyPath::new(["info"]), "source", "OPS");
        assert_eq!(apply(&t, &mut doc).unwrap(), Applied::Set(None));
        let t = Transform::set_string(KeyPath::root(), "comment", "bye");
        assert_eq!(
            apply(&t, &mut doc).unwrap(),
            Applied::Set(Some(Value::from("hello")))
        );
        assert_eq!(dict_get(&doc, "comment"), Some(&Value::from("bye")));
    }

    #[test]
    fn test_set_string_is_idempotent() {
        let t = Transform::set_string(KeyPath::new(["info"]), "source", "OPS");
        let mut once = torrent();
        apply(&t, &mut once).unwrap();
        let mut twice = torrent();
        apply(&t, &mut twice).unwrap();
        apply(&t, &mut twice).unwrap();
        assert_eq!(encode(&once), encode(&twice));
    }

    #[test]
    fn test_substitute_string() {
        let mut doc = torrent();
        let t = Transform::substitute(KeyPath::new(["announce"]), "apollo.rip", "orpheus.network");
        assert_eq!(
            apply(&t, &mut doc).unwrap(),
            Applied::Substituted { visited: 1, changed: 1 }
        );
        assert_eq!(
            dict_get(&doc, "announce").and_then(Value::as_str),
            Some("http://orpheus.network/abc/announce")
        );
    }

    #[test]
    fn test_substitute_list_of_strings() {
        let mut doc = torrent();
        let t = Transform::substitute(
            KeyPath::new(["announce-list"]),
            "apollo.rip",
            "orpheus.network",
        );
        assert_eq!(
            apply(&t, &mut doc).unwrap(),
            Applied::Substituted { visited: 2, changed: 1 }
        );
        let list = dict_get(&doc, "announce-list").unwrap().as_list().unwrap();
        assert_eq!(list[0].as_str(), Some("http://orpheus.network/abc/announce"));
        assert_eq!(list[1].as_str(), Some("udp://other:1337"));
    }

    #[test]
    fn test_substitute_wrong_type() {
        let mut doc = torrent();
        let t = Transform::substitute(KeyPath::new(["info"]), "a", "b");
        assert!(matches!(
            apply(&t, &mut doc),
            Err(Error::WrongBencodeType { found: "dictionary", .. })
        ));
    }

    #[test]
    fn test_substitute_mixed_list_leaves_list_untouched() {
        let mut doc = decode(b"d1:xl1:ai1e1:aee").unwrap();
        let before = doc.clone();
        let t = Transform::substitute(KeyPath::new(["x"]), "a", "b");
        assert!(matches!(
            apply(&t, &mut doc),
            Err(Error::WrongBencodeType { found: "integer", .. })
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_substitute_regex_list() {
        let mut doc = torrent();
        let t = Transform::substitute_regex(
            KeyPath::new(["announce-list"]),
            r"^udp://([^:]+):(\d+)$",
            "udp://$1:6969",
        )
        .unwrap();
        apply(&t, &mut doc).unwrap();
        let list = dict_get(&doc, "announce-list").unwrap().as_list().unwrap();
        assert_eq!(list[1].as_str(), Some("udp://other:6969"));
        assert_eq!(list[0].as_str(), Some("http://apollo.rip/abc/announce"));
    }

    #[test]
    fn test_missing_path_skips() {
        let mut doc = torrent();
        let before = doc.clone();
        let transforms = vec![
            Transform::substitute(KeyPath::new(["nope"]), "a", "b"),
            Transform::delete(KeyPath::new(["nope", "deeper"]), "x"),
        ];
        let stats = apply_all(&transforms, &mut doc).unwrap();
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.applied, 0);
        assert!(!stats.modified());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_apply_all_stops_at_first_failure() {
        let mut doc = torrent();
        let transforms = vec![
            Transform::set_string(KeyPath::root(), "comment", "first"),
            Transform::substitute(KeyPath::new(["info", "length"]), "a", "b"),
            Transform::set_string(KeyPath::root(), "comment", "never"),
        ];
        let err = apply_all(&transforms, &mut doc).unwrap_err();
        assert!(matches!(err, Error::WrongBencodeType { found: "integer", .. }));
        assert_eq!(dict_get(&doc, "comment"), Some(&Value::from("first")));
    }

    #[test]
    fn test_apply_all_stats() {
        let mut doc = torrent();
        let transforms = vec![
            Transform::delete(KeyPath::root(), "comment"),
            Transform::delete(KeyPath::root(), "comment"),
            Transform::set_string(KeyPath::new(["info"]), "source", "OPS"),
            Transform::substitute(KeyPath::new(["announce-list"]), "apollo.rip", "x"),
        ];
        let stats = apply_all(&transforms, &mut doc).unwrap();
        assert_eq!(
            stats,
            TransformStats {
                applied: 4,
                skipped: 0,
                deleted: 1,
                set: 1,
                substituted: 1,
            }
        );
        assert!(stats.modified());
    }
}
