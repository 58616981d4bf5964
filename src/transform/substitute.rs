//! String substitution primitives.
//!
//! Both primitives work on raw bytes, since bencode strings need not be
//! UTF-8, and both replace at most the first occurrence.

use memchr::memmem;
use regex::bytes::Regex;

/// Replaces the first occurrence of `find` in `haystack` with `replace`.
///
/// If `find` does not occur, an unmodified copy of `haystack` is returned.
/// An empty `find` matches at offset 0.
///
/// # Examples
///
/// ```
/// use announcebulk::transform::substitute;
///
/// let out = substitute(b"https://apollo.rip/abc/announce", b"apollo.rip", b"orpheus.network");
/// assert_eq!(out, b"https://orpheus.network/abc/announce");
/// ```
pub fn substitute(haystack: &[u8], find: &[u8], replace: &[u8]) -> Vec<u8> {
    let Some(start) = memmem::find(haystack, find) else {
        return haystack.to_vec();
    };
    // The suffix resumes where the matched text ends.
    let suffix = start + find.len();
    let mut out = Vec::with_capacity(haystack.len() - find.len() + replace.len());
    out.extend_from_slice(&haystack[..start]);
    out.extend_from_slice(replace);
    out.extend_from_slice(&haystack[suffix..]);
    out
}

/// Replaces the first match of `pattern` in `haystack` with the expansion
/// of `replace`.
///
/// Only the matched span is replaced: an unanchored pattern keeps the text
/// before and after the match. Anchor the pattern (`^...$`) to rebuild the
/// whole value from the template.
///
/// `replace` may reference capture groups as `$1`, `${name}`, and so on;
/// use `$$` for a literal dollar sign. Without a match an unmodified copy
/// is returned.
pub fn substitute_regex(haystack: &[u8], pattern: &Regex, replace: &[u8]) -> Vec<u8> {
    let Some(captures) = pattern.captures(haystack) else {
        return haystack.to_vec();
    };
    let Some(whole) = captures.get(0) else {
        return haystack.to_vec();
    };
    let mut out = Vec::with_capacity(haystack.len() + replace.len());
    out.extend_from_slice(&haystack[..whole.start()]);
    captures.expand(replace, &mut out);
    out.extend_from_slice(&haystack[whole.end()..]);
    out
}
