//! Content hashing for ledger records
//!
//! Every record (transaction, ownership directory, whole block) is hashed by
//! encoding it into a canonical JSON form and running SHA-256 over the bytes.
//! The canonical form sorts object keys, separates items with `", "` and
//! keys from values with `": "`, and escapes every non-ASCII character, so the
//! same logical content always yields the same digest.

use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, Serializer};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::io::{self, Write};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Escaped like any other non-printable character
const DEL: u8 = 0x7f;

/// JSON formatter producing the canonical separators and ASCII-only output
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if fragment.bytes().all(|b| b.is_ascii() && b != DEL) {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && ch as u8 != DEL {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let escaped: &[u8] = match char_escape {
            CharEscape::Quote => b"\\\"",
            CharEscape::ReverseSolidus => b"\\\\",
            CharEscape::Solidus => b"\\/",
            CharEscape::Backspace => b"\\b",
            CharEscape::FormFeed => b"\\f",
            CharEscape::LineFeed => b"\\n",
            CharEscape::CarriageReturn => b"\\r",
            CharEscape::Tab => b"\\t",
            CharEscape::AsciiControl(byte) => {
                return write!(writer, "\\u{:04x}", byte);
            }
        };
        writer.write_all(escaped)
    }
}

/// Rebuild every object with its keys in ascending order
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Encode a record in its canonical JSON form
pub fn canonical_json<T>(record: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let value = sort_keys(serde_json::to_value(record)?);
    let mut out = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut out, CanonicalFormatter);
    value.serialize(&mut serializer)?;
    // The formatter never emits non-ASCII bytes
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Hash an arbitrary serializable record, surfacing encoding failures
pub fn try_hash_record<T>(record: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    canonical_json(record).map(|encoded| sha256_hex(encoded.as_bytes()))
}

/// Hash a ledger record (transaction, directory, block)
///
/// Ledger records only contain strings, integers, timestamps and
/// string-keyed maps, all of which always encode.
pub fn hash_record<T>(record: &T) -> String
where
    T: Serialize + ?Sized,
{
    try_hash_record(record).expect("ledger records always encode to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_canonical_form_sorts_keys_and_spaces_separators() {
        let record = json!({"Seller": "zia", "Property": "uk", "Buyer": "gia"});
        assert_eq!(
            canonical_json(&record).unwrap(),
            r#"{"Buyer": "gia", "Property": "uk", "Seller": "zia"}"#
        );

        let nested = json!({"b": [1, 2, {"z": null, "a": true}], "a": "x"});
        assert_eq!(
            canonical_json(&nested).unwrap(),
            r#"{"a": "x", "b": [1, 2, {"a": true, "z": null}]}"#
        );
    }

    #[test]
    fn test_canonical_form_escapes_non_ascii() {
        assert_eq!(canonical_json("caf\u{e9}").unwrap(), r#""caf\u00e9""#);
        // Astral plane characters become a surrogate pair
        assert_eq!(
            canonical_json("\u{1f3e0}").unwrap(),
            r#""\ud83c\udfe0""#
        );
        assert_eq!(canonical_json("a\"b\n").unwrap(), r#""a\"b\n""#);
        assert_eq!(canonical_json("a\u{7f}b").unwrap(), r#""a\u007fb""#);
        assert_eq!(
            hash_record("a\u{7f}b"),
            "4871a62320e7703697d04455c205a014c2996dd4a131f7c5275ecacab6e6521e"
        );
    }

    #[test]
    fn test_hash_independent_of_insertion_order() {
        let mut first = HashMap::new();
        first.insert("alice", vec!["x", "y"]);
        first.insert("bob", vec![]);

        let mut second = HashMap::new();
        second.insert("bob", vec![]);
        second.insert("alice", vec!["x", "y"]);

        assert_eq!(hash_record(&first), hash_record(&second));
    }

    #[test]
    fn test_hash_sensitive_to_content() {
        let a = json!({"alice": ["x", "y"]});
        let b = json!({"alice": ["y", "x"]});
        assert_ne!(hash_record(&a), hash_record(&b));
        assert_eq!(hash_record(&a).len(), 64);
    }

    #[test]
    fn test_non_string_map_keys_are_reported() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1u8);
        assert!(try_hash_record(&map).is_err());
    }
}
