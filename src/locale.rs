//! Localization overlay: hash to translated-string resolution
//!
//! Language blobs (`english.bytes`, `chinese.bytes`, ...) carry an array of
//! (hash, string index) pairs, a parallel string table, and two conflict
//! dictionaries. MLString field kinds store such hashes instead of inline
//! text so translated builds can substitute language-specific strings.
//!
//! The overlay is built once per language and is immutable afterwards; a
//! decode pass only ever calls [`LocalizationOverlay::resolve`].

use std::collections::HashMap;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Immutable hash-to-string lookup for one language.
#[derive(Debug, Default)]
pub struct LocalizationOverlay {
    by_hash: HashMap<i32, i32>,
    strings: Vec<String>,
    flow_conflicts: HashMap<i32, i32>,
    manual_conflicts: HashMap<i32, i32>,
}

impl LocalizationOverlay {
    /// Overlay with no entries; every hash resolves to the empty string.
    pub fn empty() -> Self {
        LocalizationOverlay::default()
    }

    /// Parse a language blob.
    ///
    /// Layout: `i32` pair count, that many `(i32 hash, i32 string index)`
    /// pairs, `i32` string count, that many length-prefixed UTF-8 strings
    /// (7-bit varint lengths), then two `(i32, i32)` conflict dictionaries
    /// each preceded by an `i32` count.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cur = ByteCursor::new(data);

        let pair_count = read_count(&mut cur, "index pair count")?;
        let mut by_hash = HashMap::with_capacity(pair_count);
        for _ in 0..pair_count {
            let hash = cur.read_i32()?;
            let index = cur.read_i32()?;
            // Duplicate hashes keep the first entry.
            by_hash.entry(hash).or_insert(index);
        }

        let string_count = read_count(&mut cur, "string count")?;
        let mut strings = Vec::with_capacity(string_count);
        for _ in 0..string_count {
            strings.push(read_var_string(&mut cur)?);
        }

        let flow_conflicts = read_conflicts(&mut cur)?;
        let manual_conflicts = read_conflicts(&mut cur)?;

        Ok(LocalizationOverlay {
            by_hash,
            strings,
            flow_conflicts,
            manual_conflicts,
        })
    }

    /// Translated text for `hash`, or `""` when no entry matches.
    ///
    /// Misses are routine, not errors: most hashes have no localized text.
    pub fn resolve(&self, hash: i32) -> &str {
        self.by_hash
            .get(&hash)
            .and_then(|&index| usize::try_from(index).ok())
            .and_then(|index| self.strings.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Number of (hash, index) pairs.
    pub fn entry_count(&self) -> usize {
        self.by_hash.len()
    }

    /// Number of strings in the string table.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn flow_conflicts(&self) -> &HashMap<i32, i32> {
        &self.flow_conflicts
    }

    pub fn manual_conflicts(&self) -> &HashMap<i32, i32> {
        &self.manual_conflicts
    }
}

fn read_count(cur: &mut ByteCursor, what: &str) -> Result<usize> {
    let count = cur.read_i32()?;
    usize::try_from(count).map_err(|_| Error::InvalidLocale(format!("negative {}", what)))
}

fn read_conflicts(cur: &mut ByteCursor) -> Result<HashMap<i32, i32>> {
    let count = read_count(cur, "conflict count")?;
    let mut map = HashMap::with_capacity(count);
    for _ in 0..count {
        let key = cur.read_i32()?;
        let value = cur.read_i32()?;
        map.insert(key, value);
    }
    Ok(map)
}

/// String with a 7-bit varint length prefix, as written by the game's
/// serializer.
fn read_var_string(cur: &mut ByteCursor) -> Result<String> {
    let mut len: u32 = 0;
    let mut shift = 0u32;
    loop {
        let byte = cur.read_u8()?;
        len |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 35 {
            return Err(Error::InvalidLocale(
                "unterminated string length prefix".into(),
            ));
        }
    }
    let bytes = cur.read_bytes(len as usize)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_i32(buf: &mut Vec<u8>, v: i32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_var_string(buf: &mut Vec<u8>, s: &str) {
        let mut len = s.len() as u32;
        loop {
            let mut byte = (len & 0x7f) as u8;
            len >>= 7;
            if len != 0 {
                byte |= 0x80;
            }
            buf.push(byte);
            if len == 0 {
                break;
            }
        }
        buf.extend_from_slice(s.as_bytes());
    }

    fn sample_blob() -> Vec<u8> {
        let mut buf = Vec::new();
        push_i32(&mut buf, 3); // pairs
        push_i32(&mut buf, 100);
        push_i32(&mut buf, 0);
        push_i32(&mut buf, 200);
        push_i32(&mut buf, 1);
        push_i32(&mut buf, 100); // duplicate hash, later index
        push_i32(&mut buf, 1);
        push_i32(&mut buf, 2); // strings
        push_var_string(&mut buf, "Sword");
        push_var_string(&mut buf, "Shield");
        push_i32(&mut buf, 1); // flow conflicts
        push_i32(&mut buf, 7);
        push_i32(&mut buf, 8);
        push_i32(&mut buf, 0); // manual conflicts
        buf
    }

    #[test]
    fn test_parse_and_resolve() {
        let overlay = LocalizationOverlay::parse(&sample_blob()).unwrap();
        assert_eq!(overlay.entry_count(), 2);
        assert_eq!(overlay.string_count(), 2);
        assert_eq!(overlay.resolve(200), "Shield");
        assert_eq!(overlay.flow_conflicts().get(&7), Some(&8));
        assert!(overlay.manual_conflicts().is_empty());
    }

    #[test]
    fn test_first_matching_hash_wins() {
        let overlay = LocalizationOverlay::parse(&sample_blob()).unwrap();
        assert_eq!(overlay.resolve(100), "Sword");
    }

    #[test]
    fn test_resolve_is_pure_and_misses_are_empty() {
        let overlay = LocalizationOverlay::parse(&sample_blob()).unwrap();
        assert_eq!(overlay.resolve(999), "");
        assert_eq!(overlay.resolve(999), "");
        assert_eq!(overlay.resolve(200), overlay.resolve(200));
    }

    #[test]
    fn test_long_string_uses_multi_byte_length() {
        let long = "x".repeat(300);
        let mut buf = Vec::new();
        push_i32(&mut buf, 1);
        push_i32(&mut buf, 5);
        push_i32(&mut buf, 0);
        push_i32(&mut buf, 1);
        push_var_string(&mut buf, &long);
        push_i32(&mut buf, 0);
        push_i32(&mut buf, 0);
        let overlay = LocalizationOverlay::parse(&buf).unwrap();
        assert_eq!(overlay.resolve(5), long);
    }

    #[test]
    fn test_truncated_blob_is_an_error() {
        let mut buf = Vec::new();
        push_i32(&mut buf, 4);
        push_i32(&mut buf, 1);
        assert!(LocalizationOverlay::parse(&buf).is_err());
    }

    #[test]
    fn test_empty_overlay_resolves_to_empty() {
        assert_eq!(LocalizationOverlay::empty().resolve(42), "");
    }
}
