//! Named transform tables for tracker migrations.
//!
//! Presets are plain data: each one expands to an ordinary list of
//! [`Transform`]s that can be mixed with user-supplied transforms.

use std::fmt;
use std::str::FromStr;

use crate::transform::{KeyPath, Transform};
use crate::{Error, Result};

/// Key of the single-announce field.
pub const ANNOUNCE_KEY: &str = "announce";
/// Key of the announce-list field.
pub const ANNOUNCE_LIST_KEY: &str = "announce-list";

/// Substitutes `find` with `replace` in both the `announce` and the
/// `announce-list` fields.
pub fn announce_substitution(find: &str, replace: &str) -> Vec<Transform> {
    vec![
        Transform::substitute(KeyPath::new([ANNOUNCE_KEY]), find, replace),
        Transform::substitute(KeyPath::new([ANNOUNCE_LIST_KEY]), find, replace),
    ]
}

/// Rewrites Apollo tracker URLs to Orpheus.
///
/// ```
/// let transforms = announcebulk::presets::orpheus();
/// assert_eq!(transforms.len(), 2);
/// ```
pub fn orpheus() -> Vec<Transform> {
    announce_substitution("apollo.rip", "orpheus.network")
}

/// A named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Preset {
    /// See [`orpheus`].
    Orpheus,
}

impl Preset {
    /// All known presets.
    pub const ALL: &'static [Preset] = &[Preset::Orpheus];

    /// Returns the preset's name.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Orpheus => "orpheus",
        }
    }

    /// Expands the preset into its transforms.
    pub fn transforms(&self) -> Vec<Transform> {
        match self {
            Preset::Orpheus => orpheus(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .iter()
            .copied()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::WrongTransformOperation {
                operation: format!("unknown preset '{}'", s),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Operation, OperationKind};

    #[test]
    fn test_orpheus_targets_both_announce_fields() {
        let transforms = orpheus();
        let paths: Vec<String> = transforms.iter().map(|t| t.key_path().to_string()).collect();
        assert_eq!(paths, vec!["announce", "announce-list"]);
        for t in &transforms {
            assert_eq!(t.kind(), OperationKind::Substitute);
            match t.operation() {
                Operation::Substitute { find, replace } => {
                    assert_eq!(find, "apollo.rip");
                    assert_eq!(replace, "orpheus.network");
                }
                other => panic!("Expected Substitute, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("orpheus".parse::<Preset>().unwrap(), Preset::Orpheus);
        assert_eq!("Orpheus".parse::<Preset>().unwrap(), Preset::Orpheus);
        assert!("redacted".parse::<Preset>().is_err());
        assert_eq!(Preset::Orpheus.transforms().len(), 2);
    }
}
