//! Pool buffers and the per-kind offset resolvers
//!
//! Each pool is an append-only byte region addressed by 32-bit offsets
//! stored in row buffers or in other pools. A payload starts with a 16-bit
//! element count followed by packed elements or 32-bit sub-offsets, which is
//! how nested arrays and tables are built. An offset of zero or less means
//! "no payload".
//!
//! Shipped tables routinely carry offsets and counts that run past a pool's
//! end (older data, partial corruption). Every resolver therefore recovers
//! to the kind's empty value or stops filling elements instead of failing,
//! so one bad field never sinks a whole extraction run.

use byteorder::{ByteOrder, LittleEndian};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::locale::LocalizationOverlay;
use crate::table::value::{Vec2, Vec3};

/// The seven pool buffers backing one table blob.
///
/// All buffers are read-only for the lifetime of a decode pass; resolvers
/// only ever borrow them.
#[derive(Debug, Default)]
pub struct PoolSet {
    /// Length-prefixed UTF-8 strings.
    pub string: Vec<u8>,
    /// 32-bit integer arrays, and the sub-offset runs of every nested kind.
    pub int_array: Vec<u8>,
    /// 64-bit integer arrays.
    pub int64_array: Vec<u8>,
    /// 32-bit float arrays.
    pub number_array: Vec<u8>,
    /// Inline-packed (x, y) float pairs.
    pub vector2_array: Vec<u8>,
    /// Inline-packed (x, y, z) float triples.
    pub vector3_array: Vec<u8>,
    /// Packed (key, value) integer pairs.
    pub map_int_int: Vec<u8>,
}

/// File name of each pool inside a dumped segment directory.
pub const POOL_FILE_NAMES: [&str; 7] = [
    "string.pool",
    "int_array.pool",
    "int64_array.pool",
    "number_array.pool",
    "vector2_array.pool",
    "vector3_array.pool",
    "map_int_int.pool",
];

impl PoolSet {
    /// Load pools from a directory of dumped segment files (see
    /// [`POOL_FILE_NAMES`]). Missing files become empty pools, so partial
    /// dumps still decode with empty indirect fields.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<PoolSet> {
        let dir = dir.as_ref();
        let read = |name: &str| -> Result<Vec<u8>> {
            let path = dir.join(name);
            if path.exists() {
                Ok(fs::read(path)?)
            } else {
                Ok(Vec::new())
            }
        };
        Ok(PoolSet {
            string: read(POOL_FILE_NAMES[0])?,
            int_array: read(POOL_FILE_NAMES[1])?,
            int64_array: read(POOL_FILE_NAMES[2])?,
            number_array: read(POOL_FILE_NAMES[3])?,
            vector2_array: read(POOL_FILE_NAMES[4])?,
            vector3_array: read(POOL_FILE_NAMES[5])?,
            map_int_int: read(POOL_FILE_NAMES[6])?,
        })
    }

    /// UTF-8 string with a 16-bit length prefix in the string pool.
    pub fn string_at(&self, offset: i32) -> String {
        read_string(&self.string, offset)
    }

    pub fn int_array_at(&self, offset: i32) -> Vec<i32> {
        read_flat_array(&self.int_array, offset, 4, LittleEndian::read_i32)
    }

    pub fn int64_array_at(&self, offset: i32) -> Vec<i64> {
        read_flat_array(&self.int64_array, offset, 8, LittleEndian::read_i64)
    }

    pub fn float_array_at(&self, offset: i32) -> Vec<f32> {
        read_flat_array(&self.number_array, offset, 4, LittleEndian::read_f32)
    }

    pub fn vector2_array_at(&self, offset: i32) -> Vec<Vec2> {
        read_flat_array(&self.vector2_array, offset, 8, |b| Vec2 {
            x: LittleEndian::read_f32(&b[0..4]),
            y: LittleEndian::read_f32(&b[4..8]),
        })
    }

    pub fn vector3_array_at(&self, offset: i32) -> Vec<Vec3> {
        read_flat_array(&self.vector3_array, offset, 12, |b| Vec3 {
            x: LittleEndian::read_f32(&b[0..4]),
            y: LittleEndian::read_f32(&b[4..8]),
            z: LittleEndian::read_f32(&b[8..12]),
        })
    }

    /// Array of strings: count and sub-offsets in the int-array pool, each
    /// sub-offset a length-prefixed string in the string pool.
    pub fn string_array_at(&self, offset: i32) -> Vec<String> {
        self.int_array_at(offset)
            .iter()
            .map(|&sub| self.string_at(sub))
            .collect()
    }

    /// Array of int arrays; both levels live in the int-array pool.
    ///
    /// A negative sub-offset voids the whole table.
    pub fn int_table_at(&self, offset: i32) -> Vec<Vec<i32>> {
        let pool = &self.int_array;
        let Some(count) = count_at(pool, offset) else {
            return Vec::new();
        };
        let start = offset as usize + 2;
        let mut table = Vec::with_capacity(count);
        for i in 0..count {
            let Some(sub) = i32_at(pool, start + i * 4) else {
                break;
            };
            if sub < 0 {
                return Vec::new();
            }
            table.push(self.int_array_at(sub));
        }
        table
    }

    /// Array of string arrays: one level of sub-offsets in the int-array
    /// pool, each resolving like [`PoolSet::string_array_at`].
    pub fn string_table_at(&self, offset: i32) -> Vec<Vec<String>> {
        self.int_array_at(offset)
            .iter()
            .map(|&sub| self.string_array_at(sub))
            .collect()
    }

    /// Array of float arrays: sub-offsets in the int-array pool, payloads in
    /// the number-array pool.
    pub fn float_table_at(&self, offset: i32) -> Vec<Vec<f32>> {
        let pool = &self.int_array;
        let Some(count) = count_at(pool, offset) else {
            return Vec::new();
        };
        let start = offset as usize + 2;
        let mut table = Vec::with_capacity(count);
        for i in 0..count {
            let Some(sub) = i32_at(pool, start + i * 4) else {
                break;
            };
            table.push(self.float_array_at(sub));
        }
        table
    }

    /// Doubly indirected string arrays: the outer run holds offsets to
    /// middle runs, whose entries each resolve to one string array. The
    /// middle layer is flattened away, so the result is a flat list of
    /// string arrays. A non-positive outer sub-offset stops the walk.
    pub fn string_triple_array_at(&self, offset: i32) -> Vec<Vec<String>> {
        let pool = &self.int_array;
        let Some(outer) = count_at(pool, offset) else {
            return Vec::new();
        };
        let start = offset as usize + 2;
        let mut out = Vec::new();
        for j in 0..outer {
            let Some(arr_offset) = i32_at(pool, start + j * 4) else {
                break;
            };
            if arr_offset <= 0 {
                break;
            }
            let at = arr_offset as usize;
            if at + 2 > pool.len() {
                break;
            }
            let inner = LittleEndian::read_i16(&pool[at..at + 2]).max(0) as usize;
            for a in 0..inner {
                match i32_at(pool, at + 2 + a * 4) {
                    Some(pos) => out.push(self.string_array_at(pos)),
                    None => break,
                }
            }
        }
        out
    }

    /// Key/value pairs packed as consecutive 8-byte (key, value) cells.
    pub fn int_int_map_at(&self, offset: i32) -> Vec<(i32, i32)> {
        let pool = &self.map_int_int;
        let Some(count) = count_at(pool, offset) else {
            return Vec::new();
        };
        let start = offset as usize + 2;
        let mut pairs = Vec::with_capacity(count);
        for i in 0..count {
            let at = start + i * 8;
            let (Some(key), Some(value)) = (i32_at(pool, at), i32_at(pool, at + 4)) else {
                break;
            };
            pairs.push((key, value));
        }
        pairs
    }

    /// Array of localization hashes in the int-array pool, each resolved
    /// through the overlay. Unresolved hashes stay empty strings.
    pub fn ml_string_array_at(&self, offset: i32, overlay: &LocalizationOverlay) -> Vec<String> {
        let pool = &self.int_array;
        let Some(count) = count_at(pool, offset) else {
            return Vec::new();
        };
        let start = offset as usize + 2;
        let mut out = vec![String::new(); count];
        for (i, slot) in out.iter_mut().enumerate() {
            let Some(hash) = i32_at(pool, start + i * 4) else {
                break;
            };
            *slot = overlay.resolve(hash).to_owned();
        }
        out
    }

    /// Array of localization-hash arrays. Inner runs with a non-positive
    /// count are skipped rather than emitted empty.
    pub fn ml_string_table_at(
        &self,
        offset: i32,
        overlay: &LocalizationOverlay,
    ) -> Vec<Vec<String>> {
        let pool = &self.int_array;
        let Some(outer) = count_at(pool, offset) else {
            return Vec::new();
        };
        let start = offset as usize + 2;
        let mut out = Vec::new();
        for i in 0..outer {
            let Some(read_pos) = i32_at(pool, start + i * 4) else {
                break;
            };
            let Some(inner) = count_at(pool, read_pos) else {
                continue;
            };
            let inner_start = read_pos as usize + 2;
            let mut row = vec![String::new(); inner];
            for (j, slot) in row.iter_mut().enumerate() {
                let Some(hash) = i32_at(pool, inner_start + j * 4) else {
                    break;
                };
                *slot = overlay.resolve(hash).to_owned();
            }
            out.push(row);
        }
        out
    }
}

/// Element count prefix at `offset`, or `None` when the offset is a
/// sentinel, the prefix is out of range, or the count is non-positive.
fn count_at(pool: &[u8], offset: i32) -> Option<usize> {
    if offset <= 0 {
        return None;
    }
    let start = offset as usize;
    if start + 2 > pool.len() {
        return None;
    }
    let count = LittleEndian::read_i16(&pool[start..start + 2]);
    if count <= 0 {
        None
    } else {
        Some(count as usize)
    }
}

fn i32_at(pool: &[u8], at: usize) -> Option<i32> {
    if at + 4 > pool.len() {
        None
    } else {
        Some(LittleEndian::read_i32(&pool[at..at + 4]))
    }
}

fn read_string(pool: &[u8], offset: i32) -> String {
    if offset <= 0 {
        return String::new();
    }
    let start = offset as usize;
    if start + 2 > pool.len() {
        return String::new();
    }
    let len = LittleEndian::read_i16(&pool[start..start + 2]);
    if len < 0 {
        return String::new();
    }
    let len = len as usize;
    if start + 2 + len > pool.len() {
        return String::new();
    }
    String::from_utf8_lossy(&pool[start + 2..start + 2 + len]).into_owned()
}

/// Count-prefixed run of fixed-width elements. The result always has the
/// stored count; elements past the pool's end keep their default value.
fn read_flat_array<T: Default + Clone>(
    pool: &[u8],
    offset: i32,
    width: usize,
    read: impl Fn(&[u8]) -> T,
) -> Vec<T> {
    let Some(count) = count_at(pool, offset) else {
        return Vec::new();
    };
    let start = offset as usize + 2;
    let mut out = vec![T::default(); count];
    for (i, slot) in out.iter_mut().enumerate() {
        let at = start + i * width;
        if at + width > pool.len() {
            break;
        }
        *slot = read(&pool[at..at + width]);
    }
    out
}
