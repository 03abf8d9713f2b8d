//! Name hashing for PKG entry lookup
//!
//! The entry index never stores blob names, only 32-bit hashes of them.
//! Table blobs are addressed as `hash33("<TableName>.ctb")` and localization
//! blobs as `hash33("<language>.bytes")`.

/// Times-33 hash over the UTF-8 bytes of `name`.
pub fn hash33(name: &str) -> u32 {
    let mut hash: u32 = 5381;
    for &b in name.as_bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash33_empty() {
        assert_eq!(hash33(""), 5381);
    }

    #[test]
    fn test_hash33_known_values() {
        assert_eq!(hash33("a"), 5381 * 33 + 97);
        assert_eq!(hash33("ab"), (5381 * 33 + 97) * 33 + 98);
    }

    #[test]
    fn test_hash33_is_stable() {
        assert_eq!(hash33("MonsterTable.ctb"), hash33("MonsterTable.ctb"));
        assert_ne!(hash33("MonsterTable.ctb"), hash33("ItemTable.ctb"));
    }
}
