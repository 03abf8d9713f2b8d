//! # unctb
//!
//! A Rust library for extracting and decoding Star Resonance game data.
//!
//! ## Overview
//!
//! The game ships its data in `.pkg` containers indexed by name hash, with
//! configuration tables stored as segmented `.ctb` blobs: fixed-size row
//! spans holding scalars inline and 32-bit offsets into auxiliary pool
//! buffers for strings, arrays, nested tables, and maps. This library
//! provides:
//!
//! - Reading the `meta.pkg` entry index and the `m{N}.pkg` container files
//! - Decoding table blobs against explicit schema sidecars
//! - Pool resolvers that tolerate truncated or malformed offsets
//! - Localization overlays resolving text hashes to language strings
//! - JSON-friendly decoded values via `serde`
//!
//! ## Example - Decoding a table
//!
//! ```rust,no_run
//! use unctb::locale::LocalizationOverlay;
//! use unctb::table::{PoolSet, TableDecoder, TableSchema};
//!
//! fn main() -> anyhow::Result<()> {
//!     let schema = TableSchema::load("schemas/MonsterTable.json")?;
//!     let pools = PoolSet::load_dir("dump/MonsterTable")?;
//!     let overlay = LocalizationOverlay::empty();
//!     let rows_blob = std::fs::read("dump/MonsterTable/rows.bin")?;
//!
//!     let rows = TableDecoder::new(&schema, &pools, &overlay)?.decode(&rows_blob)?;
//!     println!("{}", serde_json::to_string_pretty(&rows)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Reading the container index
//!
//! ```rust,no_run
//! use unctb::pkg::PkgIndex;
//!
//! fn main() -> anyhow::Result<()> {
//!     let pkg = PkgIndex::open("meta.pkg")?;
//!
//!     // Entries are keyed by name hash; look one up by name.
//!     let blob = pkg.read_by_name("MonsterTable.ctb")?;
//!     println!("{} bytes", blob.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cursor;
pub mod error;
pub mod hash;
pub mod locale;
pub mod pkg;
pub mod table;
pub mod utils;

pub use cursor::ByteCursor;
pub use error::{Error, Result};
pub use hash::hash33;
pub use locale::LocalizationOverlay;
pub use pkg::{classify, BlobKind, PkgEntry, PkgIndex};
pub use table::{
    FieldDef, FieldKind, PoolSet, Row, RowKeyWidth, TableDecoder, TableRows, TableSchema, Value,
    Vec2, Vec3,
};
pub use utils::{collect_files_with_ext, create_name_matcher, format_size, matches_filter};
