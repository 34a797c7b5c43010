//! Target → shadow reconciliation.

use indexmap::IndexMap;

use crate::error::{Error, Reason};
use crate::schema::{RecordSchema, TypeDesc};
use crate::value::{coerce_scalar, MapKey, Record, Value};

/// Stage `target` into a shadow value for `shadow_ty`.
///
/// A `Null` target produces a `Null` shadow, which the document emitter omits.
/// Nil collections therefore stay absent, and empty ones stay empty.
pub fn reconcile_encode(
    target_ty: &TypeDesc,
    target: &Value,
    shadow_ty: &TypeDesc,
) -> Result<Value, Error> {
    let shadow_ty = shadow_ty.strip_optional();
    if target.is_null() {
        return Ok(Value::Null);
    }
    let target_ty = target_ty.strip_optional();

    match (target_ty, shadow_ty) {
        (TypeDesc::List(target_item), TypeDesc::List(shadow_item)) => {
            let Value::List(items) = target else {
                return Err(Error::shape("list", target.kind()));
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    reconcile_encode(target_item, item, shadow_item).map_err(|e| e.at_index(i))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        (
            TypeDesc::Map {
                key: target_key,
                value: target_value,
            },
            TypeDesc::Map {
                key: shadow_key,
                value: shadow_value,
            },
        ) => {
            let Value::Map(entries) = target else {
                return Err(Error::shape("map", target.kind()));
            };
            let mut out = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                let key_value = reconcile_encode(target_key, &key.clone().into(), shadow_key)
                    .map_err(|e| e.at_key(key))?;
                let staged = reconcile_encode(target_value, value, shadow_value)
                    .map_err(|e| e.at_key(key))?;
                out.insert(MapKey::try_from(key_value)?, staged);
            }
            Ok(Value::Map(out))
        }
        (TypeDesc::Record(target_schema), TypeDesc::Record(shadow_schema)) => {
            let Value::Record(fields) = target else {
                return Err(Error::shape("record", target.kind()));
            };
            encode_record(target_schema, fields, shadow_schema).map(Value::Record)
        }
        (TypeDesc::Scalar(_), TypeDesc::Scalar(shadow_kind)) => {
            coerce_scalar(target.clone(), *shadow_kind)
        }
        (TypeDesc::Opaque, TypeDesc::Opaque) => Ok(target.clone()),
        (t, s) => Err(Error::shape(s.kind(), t.kind())),
    }
}

fn encode_record(
    target_schema: &RecordSchema,
    fields: &Record,
    shadow_schema: &RecordSchema,
) -> Result<Record, Error> {
    let mut out = Record::with_capacity(shadow_schema.len());
    for shadow_field in shadow_schema.fields() {
        let target_field =
            target_schema
                .field(&shadow_field.name)
                .ok_or_else(|| Reason::UnknownTargetField {
                    record: target_schema.name().to_owned(),
                    field: shadow_field.name.clone(),
                })?;
        let value = fields.get(&target_field.name).unwrap_or(&Value::Null);
        let staged = reconcile_encode(&target_field.ty, value, &shadow_field.ty)
            .map_err(|e| e.at_field(shadow_field.wire_name()))?;
        out.insert(shadow_field.name.clone(), staged);
    }
    Ok(out)
}
