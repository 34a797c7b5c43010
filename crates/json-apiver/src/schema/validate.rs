//! Schema declaration checks, run once when a codec is built.

use std::collections::HashSet;

use super::record::RecordSchema;
use super::types::{ScalarKind, TypeDesc};
use crate::error::{Error, Reason};

/// Check a schema for declaration errors.
///
/// Rejects map keys that are not strings or integers and wire-name collisions
/// inside a record. With `strict_versioned`, also rejects a versioned field
/// whose type is not optional: such a slot can never be filled while it is
/// gated out. Skipped fields are exempt.
pub fn validate_schema(ty: &TypeDesc, strict_versioned: bool) -> Result<(), Error> {
    match ty {
        TypeDesc::Scalar(_) | TypeDesc::Opaque | TypeDesc::Weak(_) => Ok(()),
        TypeDesc::Optional(inner) | TypeDesc::List(inner) => {
            validate_schema(inner, strict_versioned)
        }
        TypeDesc::Map { key, value } => {
            validate_map_key(key)?;
            validate_schema(value, strict_versioned)
        }
        TypeDesc::Record(schema) => validate_record(schema, strict_versioned),
    }
}

pub(crate) fn validate_map_key(key: &TypeDesc) -> Result<(), Error> {
    match key {
        TypeDesc::Scalar(k) if k.is_integer() || *k == ScalarKind::Str => Ok(()),
        other => Err(Reason::InvalidMapKeyType(other.kind()).into()),
    }
}

fn validate_record(schema: &RecordSchema, strict_versioned: bool) -> Result<(), Error> {
    let mut wire_names = HashSet::new();
    for field in schema.fields() {
        if !field.skip && !wire_names.insert(field.wire_name()) {
            return Err(Reason::DuplicateField {
                record: schema.name().to_owned(),
                field: field.wire_name().to_owned(),
            }
            .into());
        }
        if strict_versioned && !field.skip && !field.since.is_zero() && !field.ty.is_optional() {
            return Err(Reason::RequiredVersionedField {
                record: schema.name().to_owned(),
                field: field.name.clone(),
            }
            .into());
        }
        validate_schema(&field.ty, strict_versioned).map_err(|e| e.at_field(field.wire_name()))?;
    }
    Ok(())
}
