//! Schema-driven table decoding

use indexmap::IndexMap;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::locale::LocalizationOverlay;
use crate::table::pools::PoolSet;
use crate::table::schema::{FieldKind, RowKeyWidth, TableSchema};
use crate::table::value::{Value, Vec2, Vec3};

/// One decoded row: field name to resolved value, in schema order.
pub type Row = IndexMap<String, Value>;

/// Decoded table: row key to row, in blob order.
pub type TableRows = IndexMap<i64, Row>;

/// Decodes every row of a table blob against a schema, pool set, and
/// localization overlay.
///
/// A table blob is a run of fixed-size row spans. Each span starts with the
/// reserved row key, followed by the declared fields: scalars inline,
/// everything else as a 4-byte pool offset.
pub struct TableDecoder<'a> {
    schema: &'a TableSchema,
    pools: &'a PoolSet,
    overlay: &'a LocalizationOverlay,
    fields: Vec<(&'a str, FieldKind)>,
}

impl<'a> TableDecoder<'a> {
    /// Build a decoder, resolving every declared kind up front. An unknown
    /// kind fails here, before any row is decoded, so partial tables are
    /// never emitted.
    pub fn new(
        schema: &'a TableSchema,
        pools: &'a PoolSet,
        overlay: &'a LocalizationOverlay,
    ) -> Result<Self> {
        let mut fields = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let kind = FieldKind::from_name(&field.kind)
                .ok_or_else(|| Error::UnsupportedKind(field.kind.clone()))?;
            fields.push((field.name.as_str(), kind));
        }
        Ok(TableDecoder {
            schema,
            pools,
            overlay,
            fields,
        })
    }

    /// Decode all rows from `data`, preserving blob order.
    ///
    /// A blob holding zero full row spans yields an empty map. Errors carry
    /// the table name, row index, and field name so a caller can log the
    /// failure and move on to its next table.
    pub fn decode(&self, data: &[u8]) -> Result<TableRows> {
        let span = self.schema.key_width.width() + self.schema.row_size;
        let count = data.len() / span;
        let mut rows = TableRows::with_capacity(count);
        for i in 0..count {
            let mut cursor = ByteCursor::new(&data[i * span..(i + 1) * span]);
            let key = match self.schema.key_width {
                RowKeyWidth::Int32 => i64::from(self.in_row(cursor.read_i32(), i, "<key>")?),
                RowKeyWidth::Int64 => self.in_row(cursor.read_i64(), i, "<key>")?,
            };
            rows.insert(key, self.decode_fields(&mut cursor, i)?);
        }
        Ok(rows)
    }

    /// Walk the schema in declared order, budgeting each field's slot width
    /// against the declared row size. Once the budget is spent the remaining
    /// fields are skipped: no bytes consumed, no keys inserted.
    fn decode_fields(&self, cursor: &mut ByteCursor, row_index: usize) -> Result<Row> {
        let mut row = Row::with_capacity(self.fields.len());
        let mut total_for_row = 0usize;
        for &(name, kind) in &self.fields {
            if total_for_row >= self.schema.row_size {
                break;
            }
            let value = self.in_row(self.read_value(cursor, kind), row_index, name)?;
            total_for_row += kind.slot_width();
            row.insert(name.to_string(), value);
        }
        Ok(row)
    }

    fn read_value(&self, cursor: &mut ByteCursor, kind: FieldKind) -> Result<Value> {
        let pools = self.pools;
        Ok(match kind {
            FieldKind::Int32 => Value::Int32(cursor.read_i32()?),
            FieldKind::Int64 => Value::Int64(cursor.read_i64()?),
            FieldKind::Bool => Value::Bool(cursor.read_bool()?),
            FieldKind::Float32 => Value::Float32(cursor.read_f32()?),
            FieldKind::String => Value::String(pools.string_at(cursor.read_i32()?)),
            FieldKind::Vector2 => Value::Vector2(Vec2 {
                x: cursor.read_f32()?,
                y: cursor.read_f32()?,
            }),
            FieldKind::Vector3 => Value::Vector3(Vec3 {
                x: cursor.read_f32()?,
                y: cursor.read_f32()?,
                z: cursor.read_f32()?,
            }),
            FieldKind::Int32Array => Value::Int32Array(pools.int_array_at(cursor.read_i32()?)),
            FieldKind::Int64Array => Value::Int64Array(pools.int64_array_at(cursor.read_i32()?)),
            FieldKind::StringArray => Value::StringArray(pools.string_array_at(cursor.read_i32()?)),
            FieldKind::FloatArray => Value::FloatArray(pools.float_array_at(cursor.read_i32()?)),
            FieldKind::Vector2Array => {
                Value::Vector2Array(pools.vector2_array_at(cursor.read_i32()?))
            }
            FieldKind::Vector3Array => {
                Value::Vector3Array(pools.vector3_array_at(cursor.read_i32()?))
            }
            FieldKind::Int32Table => Value::Int32Table(pools.int_table_at(cursor.read_i32()?)),
            FieldKind::StringTable => Value::StringTable(pools.string_table_at(cursor.read_i32()?)),
            FieldKind::FloatTable => Value::FloatTable(pools.float_table_at(cursor.read_i32()?)),
            FieldKind::StringTripleArray => {
                Value::StringTripleArray(pools.string_triple_array_at(cursor.read_i32()?))
            }
            FieldKind::MLString => {
                Value::String(self.overlay.resolve(cursor.read_i32()?).to_owned())
            }
            FieldKind::MLStringArray => {
                Value::StringArray(pools.ml_string_array_at(cursor.read_i32()?, self.overlay))
            }
            FieldKind::MLStringTable => {
                Value::StringTable(pools.ml_string_table_at(cursor.read_i32()?, self.overlay))
            }
            FieldKind::IntIntMap => Value::IntIntMap(pools.int_int_map_at(cursor.read_i32()?)),
        })
    }

    fn in_row<T>(&self, result: Result<T>, row: usize, field: &str) -> Result<T> {
        result.map_err(|source| Error::Decode {
            table: self.schema.name.clone(),
            row,
            field: field.to_string(),
            source: Box::new(source),
        })
    }
}
