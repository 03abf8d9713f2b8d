//! PKG container index reading
//!
//! A game install ships one `meta.pkg` index plus numbered `m{N}.pkg`
//! container files holding the blob bytes. The index maps 32-bit name
//! hashes (see [`crate::hash::hash33`]) to (container, offset, length)
//! triples; blob names themselves are never stored, so lookups hash the
//! wanted name.

use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::hash::hash33;

/// Location of one blob inside the container files.
#[derive(Debug, Clone, Copy)]
pub struct PkgEntry {
    /// Byte offset inside the container file.
    pub offset: u32,
    /// Container file number (`m{container}.pkg`).
    pub container: u16,
    /// Blob length in bytes.
    pub length: u32,
    /// Raw type tag from the index; not interpreted here.
    pub kind: u8,
}

/// Rough blob classification by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Unity asset bundle (`UnityFS`).
    AssetBundle,
    /// Compiled Lua chunk (`\x1BLua`).
    Lua,
    /// Tables, protobuf blobs, and everything else.
    Other,
}

/// Classify a blob's content by its leading magic bytes.
pub fn classify(data: &[u8]) -> BlobKind {
    if data.starts_with(b"UnityFS") {
        BlobKind::AssetBundle
    } else if data.starts_with(&[0x1B, 0x4C, 0x75, 0x61]) {
        BlobKind::Lua
    } else {
        BlobKind::Other
    }
}

/// Parsed `meta.pkg` index plus the directory holding the container files.
pub struct PkgIndex {
    container_dir: PathBuf,
    entries: HashMap<u32, PkgEntry>,
}

impl PkgIndex {
    /// Parse the `meta.pkg` index at `path`. Container files are expected
    /// in the same directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let container_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(PathBuf::new);
        let mut reader = BufReader::new(File::open(path)?);

        // Fixed header; only the trailing count of 16-byte records matters.
        let _ = reader.read_i32::<LittleEndian>()?;
        let _ = reader.read_i32::<LittleEndian>()?;
        let _ = reader.read_i32::<LittleEndian>()?;
        let _ = reader.read_i64::<LittleEndian>()?;
        let _ = reader.read_u32::<LittleEndian>()?;
        let skip_records = reader.read_i16::<LittleEndian>()?;
        if skip_records < 0 {
            return Err(Error::InvalidPkg(format!(
                "negative skip record count: {}",
                skip_records
            )));
        }
        reader.seek(SeekFrom::Current(16 * skip_records as i64))?;

        // Two consecutive entry runs; a key in both keeps the second.
        let mut entries = HashMap::new();
        for _ in 0..2 {
            let count = reader.read_i32::<LittleEndian>()?;
            if count < 0 {
                return Err(Error::InvalidPkg(format!("negative entry count: {}", count)));
            }
            for _ in 0..count {
                let key = reader.read_u32::<LittleEndian>()?;
                let kind = reader.read_u8()?;
                let container = reader.read_u16::<LittleEndian>()?;
                let offset = reader.read_i32::<LittleEndian>()?;
                let length = reader.read_i32::<LittleEndian>()?;
                let offset = u32::try_from(offset)
                    .map_err(|_| Error::InvalidPkg(format!("negative offset for key {}", key)))?;
                let length = u32::try_from(length)
                    .map_err(|_| Error::InvalidPkg(format!("negative length for key {}", key)))?;
                entries.insert(
                    key,
                    PkgEntry {
                        offset,
                        container,
                        length,
                        kind,
                    },
                );
            }
        }

        Ok(PkgIndex {
            container_dir,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (key hash, entry) pairs in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &PkgEntry)> {
        self.entries.iter().map(|(&key, entry)| (key, entry))
    }

    pub fn get(&self, key: u32) -> Option<&PkgEntry> {
        self.entries.get(&key)
    }

    /// Look up a blob by its full name, e.g. `MonsterTable.ctb`.
    pub fn find(&self, name: &str) -> Option<&PkgEntry> {
        self.entries.get(&hash33(name))
    }

    /// Read an entry's bytes from its container file.
    ///
    /// Partial installs ship only some containers; a missing container
    /// yields an empty blob rather than an error.
    pub fn read_entry(&self, entry: &PkgEntry) -> Result<Vec<u8>> {
        let path = self
            .container_dir
            .join(format!("m{}.pkg", entry.container));
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut data = vec![0u8; entry.length as usize];
        file.read_exact(&mut data)?;
        Ok(data)
    }

    /// Look up by name and read, with a named error on a missing entry.
    pub fn read_by_name(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.read_entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn push_i32(buf: &mut Vec<u8>, v: i32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_entry(buf: &mut Vec<u8>, key: u32, kind: u8, container: u16, offset: i32, length: i32) {
        buf.extend_from_slice(&key.to_le_bytes());
        buf.push(kind);
        buf.extend_from_slice(&container.to_le_bytes());
        push_i32(buf, offset);
        push_i32(buf, length);
    }

    fn write_meta(dir: &Path, entries: &[(u32, u8, u16, i32, i32)], second: &[(u32, u8, u16, i32, i32)]) {
        let mut buf = Vec::new();
        push_i32(&mut buf, 0);
        push_i32(&mut buf, 0);
        push_i32(&mut buf, 0);
        buf.extend_from_slice(&0i64.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&1i16.to_le_bytes()); // one skip record
        buf.extend_from_slice(&[0u8; 16]);
        push_i32(&mut buf, entries.len() as i32);
        for &(key, kind, container, offset, length) in entries {
            push_entry(&mut buf, key, kind, container, offset, length);
        }
        push_i32(&mut buf, second.len() as i32);
        for &(key, kind, container, offset, length) in second {
            push_entry(&mut buf, key, kind, container, offset, length);
        }
        fs::write(dir.join("meta.pkg"), buf).unwrap();
    }

    #[test]
    fn test_open_and_read_entry() {
        let dir = tempfile::tempdir().unwrap();
        let key = hash33("MonsterTable.ctb");
        write_meta(dir.path(), &[(key, 1, 0, 4, 5)], &[(0xDEAD, 2, 3, 0, 1)]);

        let mut container = fs::File::create(dir.path().join("m0.pkg")).unwrap();
        container.write_all(b"xxxxhello").unwrap();

        let pkg = PkgIndex::open(dir.path().join("meta.pkg")).unwrap();
        assert_eq!(pkg.len(), 2);
        assert!(pkg.get(0xDEAD).is_some());

        let data = pkg.read_by_name("MonsterTable.ctb").unwrap();
        assert_eq!(data, b"hello");
    }

    #[test]
    fn test_second_run_overrides_first() {
        let dir = tempfile::tempdir().unwrap();
        write_meta(dir.path(), &[(7, 0, 0, 0, 10)], &[(7, 0, 0, 0, 20)]);
        let pkg = PkgIndex::open(dir.path().join("meta.pkg")).unwrap();
        assert_eq!(pkg.len(), 1);
        assert_eq!(pkg.get(7).unwrap().length, 20);
    }

    #[test]
    fn test_missing_container_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_meta(dir.path(), &[(1, 0, 9, 0, 16)], &[]);
        let pkg = PkgIndex::open(dir.path().join("meta.pkg")).unwrap();
        let data = pkg.read_entry(pkg.get(1).unwrap()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_missing_name_is_entry_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_meta(dir.path(), &[], &[]);
        let pkg = PkgIndex::open(dir.path().join("meta.pkg")).unwrap();
        match pkg.read_by_name("Nope.ctb") {
            Err(Error::EntryNotFound(name)) => assert_eq!(name, "Nope.ctb"),
            other => panic!("expected EntryNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_classify_magics() {
        assert_eq!(classify(b"UnityFS\x00rest"), BlobKind::AssetBundle);
        assert_eq!(classify(&[0x1B, 0x4C, 0x75, 0x61, 0x00]), BlobKind::Lua);
        assert_eq!(classify(b"anything else"), BlobKind::Other);
        assert_eq!(classify(&[]), BlobKind::Other);
    }
}
