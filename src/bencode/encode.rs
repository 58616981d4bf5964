//! Bencode encoding.

use super::value::Value;

/// Encodes a value tree into a fresh buffer.
///
/// Dictionaries are written in their stored order.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Integer(n) => {
            out.push(b'i');
            out.extend_from_slice(n.to_string().as_bytes());
            out.push(b'e');
        }
        Value::Bytes(bytes) => write_bytes(bytes, out),
        Value::List(items) => {
            out.push(b'l');
            for item in items {
                encode_into(item, out);
            }
            out.push(b'e');
        }
        Value::Dict(dict) => {
            out.push(b'd');
            for (key, item) in dict.iter() {
                write_bytes(key, out);
                encode_into(item, out);
            }
            out.push(b'e');
        }
    }
}

fn write_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::{Dict, decode};

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Integer(-3)), b"i-3e");
        assert_eq!(encode(&Value::from("spam")), b"4:spam");
        assert_eq!(encode(&Value::Bytes(vec![])), b"0:");
    }

    #[test]
    fn test_encode_keeps_insertion_order() {
        let mut dict = Dict::new();
        dict.insert("zeta", Value::from(1));
        dict.insert("alpha", Value::List(vec![Value::from("x")]));
        assert_eq!(encode(&Value::Dict(dict)), b"d4:zetai1e5:alphal1:xee");
    }

    #[test]
    fn test_untouched_document_is_byte_identical() {
        let original: &[u8] =
            b"d8:announce21:http://apollo.rip/ann7:comment3:hi!4:infod6:lengthi12e4:name5:a.txtee";
        let value = decode(original).unwrap();
        assert_eq!(encode(&value), original);
    }
}
