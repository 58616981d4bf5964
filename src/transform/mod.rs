//! Declarative transforms over bencode document trees.
//!
//! A [`Transform`] pairs a [`KeyPath`] with an [`Operation`]. The engine
//! resolves the key path inside a decoded document and applies the
//! operation to the node it finds:
//!
//! | Operation | Key path addresses | Accepted target |
//! |-----------|--------------------|-----------------|
//! | `delete` | the containing dictionary | dictionary |
//! | `set-string` | the containing dictionary | dictionary |
//! | `substitute` | the value itself | string, or list of strings |
//! | `substitute-regex` | the value itself | string, or list of strings |
//!
//! A key path that does not exist in a document is skipped silently.
//!
//! # Example
//!
//! ```rust
//! use announcebulk::bencode;
//! use announcebulk::transform::{KeyPath, TransformBuilder, apply_all};
//!
//! let transforms = TransformBuilder::new()
//!     .substitute(KeyPath::new(["announce"]), "apollo.rip", "orpheus.network")
//!     .delete(KeyPath::root(), "comment")
//!     .build();
//!
//! let mut doc = bencode::decode(b"d8:announce22:https://apollo.rip/ann7:comment2:hie")?;
//! apply_all(&transforms, &mut doc)?;
//! assert_eq!(
//!     bencode::encode(&doc),
//!     b"d8:announce27:https://orpheus.network/anne".to_vec()
//! );
//! # Ok::<(), announcebulk::Error>(())
//! ```

mod engine;
mod key_path;
mod operation;
mod substitute;

pub use engine::{Applied, TransformStats, apply, apply_all};
pub use key_path::KeyPath;
pub use operation::{Operation, OperationKind, Transform, TransformBuilder};
pub use substitute::{substitute, substitute_regex};
