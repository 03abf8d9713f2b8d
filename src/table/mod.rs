//! Segmented pool table (`.ctb`) format decoder
//!
//! A table blob is a run of fixed-size row spans. Scalar values sit inline
//! in the span; strings, arrays, nested tables, and maps are stored in
//! auxiliary pool buffers and the span only holds a 4-byte offset into the
//! owning pool. Pool payloads start with a 16-bit element count followed by
//! packed elements or further 32-bit sub-offsets, which is how one level of
//! nesting (and two, for string triple arrays) is expressed.
//!
//! Field layout is not self-describing: it is supplied per table as a
//! [`TableSchema`] sidecar listing (name, kind) pairs in declared order.
//! Localized kinds (`MLString` and friends) store 32-bit hashes that a
//! [`crate::locale::LocalizationOverlay`] resolves to language text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use unctb::locale::LocalizationOverlay;
//! use unctb::table::{PoolSet, TableDecoder, TableSchema};
//!
//! fn main() -> unctb::Result<()> {
//!     let schema = TableSchema::load("schemas/MonsterTable.json")?;
//!     let pools = PoolSet::load_dir("dump/MonsterTable")?;
//!     let overlay = LocalizationOverlay::empty();
//!     let rows_blob = std::fs::read("dump/MonsterTable/rows.bin")?;
//!
//!     let decoder = TableDecoder::new(&schema, &pools, &overlay)?;
//!     let rows = decoder.decode(&rows_blob)?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

mod decoder;
mod pools;
mod schema;
mod value;

pub use decoder::{Row, TableDecoder, TableRows};
pub use pools::{PoolSet, POOL_FILE_NAMES};
pub use schema::{FieldDef, FieldKind, RowKeyWidth, TableSchema};
pub use value::{Value, Vec2, Vec3};
