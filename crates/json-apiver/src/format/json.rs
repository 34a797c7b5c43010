//! JSON document format over `serde_json`.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value as Json};

use super::DocumentFormat;
use crate::error::{Error, Reason};
use crate::options::CodecOptions;
use crate::schema::{RecordSchema, ScalarKind, TypeDesc};
use crate::value::{coerce_scalar, MapKey, Record, Value};
use crate::weak::WeakScalar;

/// Which field name keys a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// External names, as documents carry them. Absent fields are omitted.
    Wire,
    /// Logical names, as `serde` sees a typed value. Every field is written.
    Logical,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat;

impl JsonFormat {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentFormat for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn parse(
        &self,
        bytes: &[u8],
        shape: &TypeDesc,
        options: &CodecOptions,
    ) -> Result<Value, Error> {
        let json: Json =
            serde_json::from_slice(bytes).map_err(|e| Reason::Syntax(e.to_string()))?;
        from_json(&json, shape, Naming::Wire, options)
    }

    fn emit(
        &self,
        shadow: &Value,
        shape: &TypeDesc,
        options: &CodecOptions,
    ) -> Result<Vec<u8>, Error> {
        let json = to_json(shadow, shape, Naming::Wire)?;
        write_json(&json, options.indent.as_deref())
    }
}

pub(crate) fn write_json(json: &Json, indent: Option<&str>) -> Result<Vec<u8>, Error> {
    let unrepresentable = |e: serde_json::Error| Error::new(Reason::Unrepresentable(e.to_string()));
    match indent {
        None => serde_json::to_vec(json).map_err(unrepresentable),
        Some(indent) => {
            let mut out = Vec::with_capacity(128);
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            json.serialize(&mut ser).map_err(unrepresentable)?;
            Ok(out)
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) if n.is_f64() => "float",
        Json::Number(_) => "integer",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn invalid_type(expected: &'static str, found: &Json) -> Error {
    Error::new(Reason::InvalidType {
        expected,
        found: json_kind(found),
    })
}

/// Type a JSON tree against `ty`.
///
/// `null` is absent at every position. Weak leaves go through the weak scalar
/// converters; every other leaf must carry its native JSON type.
pub fn from_json(
    json: &Json,
    ty: &TypeDesc,
    naming: Naming,
    options: &CodecOptions,
) -> Result<Value, Error> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match ty {
        TypeDesc::Optional(inner) => from_json(json, inner, naming, options),
        TypeDesc::Scalar(kind) => scalar_from_json(json, *kind),
        TypeDesc::Weak(kind) => Ok(match WeakScalar::decode(*kind, json)? {
            WeakScalar::Int(i) => Value::Int(i),
            WeakScalar::Uint(u) => Value::Uint(u),
            WeakScalar::Float(f) => Value::Float(f),
            WeakScalar::Bool(b) => Value::Bool(b),
        }),
        TypeDesc::Opaque => Ok(Value::Opaque(json.clone())),
        TypeDesc::List(item) => {
            let Json::Array(items) = json else {
                return Err(invalid_type("array", json));
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item_json)| {
                    from_json(item_json, item, naming, options).map_err(|e| e.at_index(i))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        TypeDesc::Map { key, value } => {
            let Json::Object(entries) = json else {
                return Err(invalid_type("object", json));
            };
            let mut out = indexmap::IndexMap::with_capacity(entries.len());
            for (raw_key, value_json) in entries {
                let parsed = MapKey::parse(raw_key, key).map_err(|e| e.at_key(raw_key))?;
                let parsed_value =
                    from_json(value_json, value, naming, options).map_err(|e| e.at_key(raw_key))?;
                out.insert(parsed, parsed_value);
            }
            Ok(Value::Map(out))
        }
        TypeDesc::Record(schema) => {
            let Json::Object(entries) = json else {
                return Err(invalid_type("object", json));
            };
            record_from_json(entries, schema, naming, options).map(Value::Record)
        }
    }
}

fn record_from_json(
    entries: &Map<String, Json>,
    schema: &RecordSchema,
    naming: Naming,
    options: &CodecOptions,
) -> Result<Record, Error> {
    let key_of = |f: &crate::schema::FieldSpec| match naming {
        Naming::Wire => f.wire_name().to_owned(),
        Naming::Logical => f.name.clone(),
    };

    if options.reject_unknown_fields && naming == Naming::Wire {
        if let Some(unknown) = entries
            .keys()
            .find(|k| !schema.fields().any(|f| f.wire_name() == k.as_str()))
        {
            return Err(Reason::UnknownField(unknown.clone()).into());
        }
    }

    let mut out = Record::with_capacity(schema.len());
    for field in schema.fields() {
        let key = key_of(field);
        let value = match entries.get(&key) {
            Some(json) => {
                from_json(json, &field.ty, naming, options).map_err(|e| e.at_field(&key))?
            }
            None => Value::Null,
        };
        out.insert(field.name.clone(), value);
    }
    Ok(out)
}

fn scalar_from_json(json: &Json, kind: ScalarKind) -> Result<Value, Error> {
    let value = match (json, kind) {
        (Json::Bool(b), ScalarKind::Bool) => Value::Bool(*b),
        (Json::String(s), ScalarKind::Str) => Value::Str(s.clone()),
        (Json::Number(n), k) if k.is_integer() => {
            if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                return Err(invalid_type(kind.as_str(), json));
            }
        }
        (Json::Number(n), k) if k.is_float() => match n.as_f64() {
            Some(f) => Value::Float(f),
            None => return Err(invalid_type(kind.as_str(), json)),
        },
        _ => return Err(invalid_type(kind.as_str(), json)),
    };
    coerce_scalar(value, kind)
}

/// Render a value as JSON shaped by `ty`.
///
/// With [`Naming::Wire`], `Null` record fields are omitted. With
/// [`Naming::Logical`], a `Null` in a non-optional position is written as the
/// zero of its type (`[]` for lists and `{}` for maps) so `serde` can read it.
pub fn to_json(value: &Value, ty: &TypeDesc, naming: Naming) -> Result<Json, Error> {
    if value.is_null() {
        return null_to_json(ty, naming);
    }
    match (ty.strip_optional(), value) {
        (TypeDesc::Scalar(_) | TypeDesc::Weak(_), v) => scalar_to_json(v),
        (TypeDesc::Opaque, Value::Opaque(json)) => Ok(json.clone()),
        (TypeDesc::List(item), Value::List(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| to_json(v, item, naming).map_err(|e| e.at_index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        (TypeDesc::Map { value: item, .. }, Value::Map(entries)) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, v) in entries {
                let json = to_json(v, item, naming).map_err(|e| e.at_key(key))?;
                out.insert(key.to_string(), json);
            }
            Ok(Json::Object(out))
        }
        (TypeDesc::Record(schema), Value::Record(fields)) => {
            let mut out = Map::with_capacity(schema.len());
            for field in schema.fields() {
                let v = fields.get(&field.name).unwrap_or(&Value::Null);
                let key = match naming {
                    Naming::Wire if v.is_null() || field.skip => continue,
                    Naming::Wire => field.wire_name(),
                    Naming::Logical => field.name.as_str(),
                };
                let json = to_json(v, &field.ty, naming).map_err(|e| e.at_field(key))?;
                out.insert(key.to_owned(), json);
            }
            Ok(Json::Object(out))
        }
        (t, v) => Err(Error::shape(v.kind(), t.kind())),
    }
}

fn null_to_json(ty: &TypeDesc, naming: Naming) -> Result<Json, Error> {
    if naming == Naming::Wire {
        return Ok(Json::Null);
    }
    match ty {
        TypeDesc::Optional(_) | TypeDesc::Opaque => Ok(Json::Null),
        TypeDesc::List(_) => Ok(Json::Array(Vec::new())),
        TypeDesc::Map { .. } => Ok(Json::Object(Map::new())),
        other => to_json(&Value::zero(other), other, naming),
    }
}

fn scalar_to_json(value: &Value) -> Result<Json, Error> {
    Ok(match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Uint(u) => Json::from(*u),
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).ok_or_else(|| {
            Error::new(Reason::Unrepresentable(format!("non-finite float {f}")))
        })?,
        Value::Str(s) => Json::String(s.clone()),
        other => return Err(Error::shape(other.kind(), "scalar")),
    })
}
