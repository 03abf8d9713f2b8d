//! Decoded field values

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Two packed floats, stored inline in row buffers and vector pools.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Three packed floats, stored inline in row buffers and vector pools.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A fully resolved field value.
///
/// Serialization is untagged: a row serializes to a plain JSON object whose
/// values carry no kind markers. `IntIntMap` serializes as a JSON object
/// keyed by the integer keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Float32(f32),
    String(String),
    Vector2(Vec2),
    Vector3(Vec3),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    StringArray(Vec<String>),
    FloatArray(Vec<f32>),
    Vector2Array(Vec<Vec2>),
    Vector3Array(Vec<Vec3>),
    Int32Table(Vec<Vec<i32>>),
    StringTable(Vec<Vec<String>>),
    FloatTable(Vec<Vec<f32>>),
    StringTripleArray(Vec<Vec<String>>),
    IntIntMap(#[serde(serialize_with = "serialize_pairs_as_map")] Vec<(i32, i32)>),
}

fn serialize_pairs_as_map<S>(pairs: &[(i32, i32)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_serialize_untagged() {
        assert_eq!(serde_json::to_string(&Value::Int32(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&Value::String("hi".into())).unwrap(),
            "\"hi\""
        );
    }

    #[test]
    fn test_vectors_serialize_as_objects() {
        let v = Value::Vector3(Vec3 {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        });
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            "{\"x\":1.0,\"y\":2.0,\"z\":3.0}"
        );
    }

    #[test]
    fn test_int_int_map_serializes_as_object() {
        let v = Value::IntIntMap(vec![(1, 10), (2, 20)]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "{\"1\":10,\"2\":20}");
    }
}
