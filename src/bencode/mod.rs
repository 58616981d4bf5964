//! Bencode document trees.
//!
//! Torrent metadata files are bencoded: integers (`i42e`), byte strings
//! (`4:spam`), lists (`l...e`) and dictionaries (`d...e`). This module
//! decodes such a file into a [`Value`] tree, lets callers edit it in place,
//! and encodes it back.
//!
//! Dictionary entries keep the order they were decoded (or inserted) in, so
//! a decode/encode cycle over an untouched document reproduces it byte for
//! byte.
//!
//! # Example
//!
//! ```rust
//! use announcebulk::bencode::{self, Value};
//!
//! let mut doc = bencode::decode(b"d8:announce16:http://a.rip/anne")?;
//! if let Value::Dict(dict) = &mut doc {
//!     dict.insert("comment", Value::from("migrated"));
//! }
//! assert_eq!(
//!     bencode::encode(&doc),
//!     b"d8:announce16:http://a.rip/ann7:comment8:migratede".to_vec()
//! );
//! # Ok::<(), announcebulk::Error>(())
//! ```

mod decode;
mod encode;
mod value;

pub use decode::{MAX_DEPTH, decode};
pub use encode::{encode, encode_into};
pub use value::{Dict, Value};
