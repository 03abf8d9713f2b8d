//! Table schemas: field order, kinds, and row layout policy
//!
//! The game client discovers field layout by reflecting over its compiled
//! type metadata at run time. Here a schema is an explicit sidecar
//! description loaded from JSON, so the decoder has no tie to any metadata
//! format. Field kinds are kept as plain strings in the sidecar and resolved
//! to [`FieldKind`] when a decoder is built, which is where unknown kinds
//! are rejected.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Field kind enumeration for row values.
///
/// Scalar kinds are stored inline in the row buffer; every other kind stores
/// a 4-byte pool offset in the row and keeps its payload in a pool buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    Int64,
    Bool,
    Float32,
    String,
    Vector2,
    Vector3,
    Int32Array,
    Int64Array,
    StringArray,
    FloatArray,
    Vector2Array,
    Vector3Array,
    Int32Table,
    StringTable,
    FloatTable,
    StringTripleArray,
    MLString,
    MLStringArray,
    MLStringTable,
    IntIntMap,
}

impl FieldKind {
    /// Resolve a sidecar kind tag, `None` for tags the decoder does not
    /// implement.
    pub fn from_name(name: &str) -> Option<FieldKind> {
        Some(match name {
            "Int32" => FieldKind::Int32,
            "Int64" => FieldKind::Int64,
            "Bool" => FieldKind::Bool,
            "Float32" => FieldKind::Float32,
            "String" => FieldKind::String,
            "Vector2" => FieldKind::Vector2,
            "Vector3" => FieldKind::Vector3,
            "Int32Array" => FieldKind::Int32Array,
            "Int64Array" => FieldKind::Int64Array,
            "StringArray" => FieldKind::StringArray,
            "FloatArray" => FieldKind::FloatArray,
            "Vector2Array" => FieldKind::Vector2Array,
            "Vector3Array" => FieldKind::Vector3Array,
            "Int32Table" => FieldKind::Int32Table,
            "StringTable" => FieldKind::StringTable,
            "FloatTable" => FieldKind::FloatTable,
            "StringTripleArray" => FieldKind::StringTripleArray,
            "MLString" => FieldKind::MLString,
            "MLStringArray" => FieldKind::MLStringArray,
            "MLStringTable" => FieldKind::MLStringTable,
            "IntIntMap" => FieldKind::IntIntMap,
            _ => return None,
        })
    }

    /// Bytes this kind occupies in the row buffer.
    ///
    /// Indirect kinds always cost 4 bytes, the size of the stored pool
    /// offset; their payload lives in a pool outside the row budget.
    pub fn slot_width(self) -> usize {
        match self {
            FieldKind::Bool => 1,
            FieldKind::Int64 => 8,
            FieldKind::Vector2 => 8,
            FieldKind::Vector3 => 12,
            _ => 4,
        }
    }
}

/// Width of the reserved key slot at the start of every row span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKeyWidth {
    Int32,
    #[default]
    Int64,
}

impl RowKeyWidth {
    pub fn width(self) -> usize {
        match self {
            RowKeyWidth::Int32 => 4,
            RowKeyWidth::Int64 => 8,
        }
    }
}

/// One declared field: name plus the kind tag as written in the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: String,
}

/// Schema for one table: ordered fields plus the row layout policy.
///
/// The synthetic key field is not listed in `fields`; its width is governed
/// by `key_width` and it is read separately by the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Table name, used for blob lookup (`<name>.ctb`) and diagnostics.
    pub name: String,
    /// Declared byte size of one row's field data, excluding the key slot.
    pub row_size: usize,
    /// Width of the reserved key slot.
    #[serde(default)]
    pub key_width: RowKeyWidth,
    /// Fields in declared order.
    pub fields: Vec<FieldDef>,
}

impl TableSchema {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip() {
        for name in [
            "Int32",
            "Int64",
            "Bool",
            "Float32",
            "String",
            "Vector2",
            "Vector3",
            "Int32Array",
            "Int64Array",
            "StringArray",
            "FloatArray",
            "Vector2Array",
            "Vector3Array",
            "Int32Table",
            "StringTable",
            "FloatTable",
            "StringTripleArray",
            "MLString",
            "MLStringArray",
            "MLStringTable",
            "IntIntMap",
        ] {
            assert!(FieldKind::from_name(name).is_some(), "missing {}", name);
        }
        assert!(FieldKind::from_name("Quaternion").is_none());
        assert!(FieldKind::from_name("int32").is_none());
    }

    #[test]
    fn test_slot_widths() {
        assert_eq!(FieldKind::Int32.slot_width(), 4);
        assert_eq!(FieldKind::Int64.slot_width(), 8);
        assert_eq!(FieldKind::Bool.slot_width(), 1);
        assert_eq!(FieldKind::Vector2.slot_width(), 8);
        assert_eq!(FieldKind::Vector3.slot_width(), 12);
        // Indirect kinds cost only their stored offset.
        assert_eq!(FieldKind::Int64Array.slot_width(), 4);
        assert_eq!(FieldKind::StringTable.slot_width(), 4);
        assert_eq!(FieldKind::IntIntMap.slot_width(), 4);
    }

    #[test]
    fn test_schema_from_json() {
        let schema = TableSchema::from_json(
            r#"{
                "name": "MonsterTable",
                "rowSize": 32,
                "keyWidth": "int64",
                "fields": [
                    {"name": "Id", "kind": "Int32"},
                    {"name": "Name", "kind": "MLString"},
                    {"name": "DropIds", "kind": "Int32Array"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.name, "MonsterTable");
        assert_eq!(schema.row_size, 32);
        assert_eq!(schema.key_width, RowKeyWidth::Int64);
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[1].kind, "MLString");
    }

    #[test]
    fn test_key_width_defaults_to_int64() {
        let schema = TableSchema::from_json(
            r#"{"name": "T", "rowSize": 4, "fields": [{"name": "A", "kind": "Int32"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.key_width, RowKeyWidth::Int64);
        assert_eq!(schema.key_width.width(), 8);
    }
}
