//! Shadow → target reconciliation.

use crate::error::{Error, Reason};
use crate::schema::{RecordSchema, ScalarKind, TypeDesc};
use crate::value::{coerce_scalar, MapKey, Record, Value};
use crate::weak::WeakKind;

/// Populate `target` from a parsed shadow value.
///
/// Walks the shadow and target types in lockstep. An absent shadow leaves the
/// target untouched, so values already in the target survive when the document
/// does not mention them. A record field that is absent from the shadow while
/// its target type is not optional fails with a user-facing
/// "missing required field" error naming the wire name. An absent record in a
/// non-optional position is checked as if it were an empty record.
pub fn reconcile_decode(
    shadow_ty: &TypeDesc,
    shadow: Value,
    target_ty: &TypeDesc,
    target: &mut Value,
) -> Result<(), Error> {
    let shadow_ty = shadow_ty.strip_optional();
    if shadow.is_null() {
        return match (shadow_ty, target_ty) {
            (TypeDesc::Record(shadow_schema), TypeDesc::Record(target_schema)) => {
                let empty = Value::Record(Record::new());
                decode_record(shadow_schema, empty, target_schema, target_ty, target)
            }
            _ => Ok(()),
        };
    }

    if let TypeDesc::Optional(inner) = target_ty {
        if target.is_null() {
            *target = Value::zero(inner);
        }
        return reconcile_decode(shadow_ty, shadow, inner, target);
    }

    match (shadow_ty, target_ty) {
        (TypeDesc::List(shadow_item), TypeDesc::List(target_item)) => {
            let Value::List(items) = shadow else {
                return Err(Error::shape(shadow.kind(), "list"));
            };
            let out = list_slot(target)?;
            out.reserve(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let mut slot = Value::zero(target_item);
                reconcile_decode(shadow_item, item, target_item, &mut slot)
                    .map_err(|e| e.at_index(i))?;
                out.push(slot);
            }
            Ok(())
        }
        (
            TypeDesc::Map {
                key: shadow_key,
                value: shadow_value,
            },
            TypeDesc::Map {
                key: target_key,
                value: target_value,
            },
        ) => {
            let Value::Map(entries) = shadow else {
                return Err(Error::shape(shadow.kind(), "map"));
            };
            if target.is_null() {
                *target = Value::Map(Default::default());
            }
            let Value::Map(out) = target else {
                return Err(Error::shape("map", target.kind()));
            };
            for (key, value) in entries {
                let at = key.to_string();
                let mut key_slot = Value::zero(target_key);
                reconcile_decode(shadow_key, key.into(), target_key, &mut key_slot)
                    .map_err(|e| e.at_key(&at))?;
                let key = MapKey::try_from(key_slot).map_err(|e| e.at_key(&at))?;

                let mut value_slot = Value::zero(target_value);
                reconcile_decode(shadow_value, value, target_value, &mut value_slot)
                    .map_err(|e| e.at_key(&at))?;
                out.insert(key, value_slot);
            }
            Ok(())
        }
        (TypeDesc::Record(shadow_schema), TypeDesc::Record(target_schema)) => {
            decode_record(shadow_schema, shadow, target_schema, target_ty, target)
        }
        (TypeDesc::Weak(kind), TypeDesc::Scalar(target_kind)) => {
            check_weak_target(*kind, *target_kind)?;
            *target = coerce_scalar(shadow, *target_kind)?;
            Ok(())
        }
        (TypeDesc::Scalar(_), TypeDesc::Scalar(target_kind)) => {
            *target = coerce_scalar(shadow, *target_kind)?;
            Ok(())
        }
        (TypeDesc::Opaque, TypeDesc::Opaque) => {
            *target = shadow;
            Ok(())
        }
        (s, t) => Err(Error::shape(s.kind(), t.kind())),
    }
}

fn list_slot(target: &mut Value) -> Result<&mut Vec<Value>, Error> {
    if target.is_null() {
        *target = Value::List(Vec::new());
    }
    match target {
        Value::List(items) => Ok(items),
        other => Err(Error::shape("list", other.kind())),
    }
}

fn decode_record(
    shadow_schema: &RecordSchema,
    shadow: Value,
    target_schema: &RecordSchema,
    target_ty: &TypeDesc,
    target: &mut Value,
) -> Result<(), Error> {
    let Value::Record(mut fields) = shadow else {
        return Err(Error::shape(shadow.kind(), "record"));
    };
    if target.is_null() {
        *target = Value::zero(target_ty);
    }
    let Value::Record(out) = target else {
        return Err(Error::shape("record", target.kind()));
    };

    for shadow_field in shadow_schema.fields() {
        let name = shadow_field.wire_name();
        let target_field =
            target_schema
                .field(&shadow_field.name)
                .ok_or_else(|| Reason::UnknownTargetField {
                    record: target_schema.name().to_owned(),
                    field: shadow_field.name.clone(),
                })?;
        let value = fields.swap_remove(&shadow_field.name).unwrap_or_default();

        if value.is_null() && !target_field.ty.is_optional() {
            return Err(Reason::MissingField(name.to_owned()).into());
        }

        let slot = out
            .entry(target_field.name.clone())
            .or_insert_with(|| Value::zero(&target_field.ty));
        reconcile_decode(&shadow_field.ty, value, &target_field.ty, slot)
            .map_err(|e| e.at_field(name))?;
    }
    Ok(())
}

fn check_weak_target(kind: WeakKind, target_kind: ScalarKind) -> Result<(), Error> {
    let fits = match kind {
        WeakKind::Int | WeakKind::Uint => target_kind.is_integer(),
        WeakKind::Float => target_kind.is_float(),
        WeakKind::Bool => target_kind.weak_kind() == Some(WeakKind::Bool),
    };
    if fits {
        Ok(())
    } else {
        Err(Error::shape(kind.as_str(), target_kind.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use crate::shadow::{derive_shadow, Purpose};
    use crate::version::ApiVersion;
    use std::sync::Arc;

    fn record(fields: &[(&str, Value)]) -> Value {
        Value::Record(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect::<Record>(),
        )
    }

    fn schema() -> Arc<RecordSchema> {
        RecordSchema::new(
            "Obj",
            [
                FieldSpec::tagged("foo", TypeDesc::i64(), "1.1,str").unwrap(),
                FieldSpec::tagged("a", TypeDesc::optional(TypeDesc::i64()), "1.2").unwrap(),
                FieldSpec::new("f", TypeDesc::f32()).coercible(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn fills_required_and_optional_fields() {
        let target_ty = TypeDesc::record(schema());
        let shadow_ty =
            derive_shadow(&target_ty, ApiVersion::new(1, 3), Purpose::Decode).unwrap();
        let shadow = record(&[
            ("foo", Value::Int(42)),
            ("a", Value::Int(49)),
            ("f", Value::Float(1.92)),
        ]);
        let mut target = Value::zero(&target_ty);
        reconcile_decode(&shadow_ty, shadow, &target_ty, &mut target).unwrap();
        assert_eq!(target.get("foo"), Some(&Value::Int(42)));
        assert_eq!(target.get("a"), Some(&Value::Int(49)));
        assert_eq!(target.get("f"), Some(&Value::Float(1.92)));
    }

    #[test]
    fn absent_required_field_is_user_error() {
        let target_ty = TypeDesc::record(schema());
        let shadow_ty =
            derive_shadow(&target_ty, ApiVersion::new(1, 3), Purpose::Decode).unwrap();
        let shadow = record(&[("foo", Value::Int(42))]);
        let mut target = Value::zero(&target_ty);
        let err = reconcile_decode(&shadow_ty, shadow, &target_ty, &mut target).unwrap_err();
        assert!(err.is_user());
        assert_eq!(err.to_string(), "missing required field: f");
    }

    #[test]
    fn absent_optional_field_keeps_existing_value() {
        let target_ty = TypeDesc::record(schema());
        let shadow_ty =
            derive_shadow(&target_ty, ApiVersion::new(1, 3), Purpose::Decode).unwrap();
        let shadow = record(&[("foo", Value::Int(1)), ("f", Value::Float(0.5))]);
        let mut target = record(&[
            ("foo", Value::Int(0)),
            ("a", Value::Int(7)),
            ("f", Value::Float(0.0)),
        ]);
        reconcile_decode(&shadow_ty, shadow, &target_ty, &mut target).unwrap();
        assert_eq!(target.get("a"), Some(&Value::Int(7)));
    }

    #[test]
    fn null_record_checks_required_fields() {
        let target_ty = TypeDesc::record(schema());
        let shadow_ty =
            derive_shadow(&target_ty, ApiVersion::new(1, 3), Purpose::Decode).unwrap();
        let mut target = Value::zero(&target_ty);
        let err = reconcile_decode(&shadow_ty, Value::Null, &target_ty, &mut target).unwrap_err();
        assert!(err.is_user());
        assert_eq!(err.to_string(), "missing required field: foo");
    }

    #[test]
    fn null_optional_record_stays_absent() {
        let target_ty = TypeDesc::optional(TypeDesc::record(schema()));
        let shadow_ty =
            derive_shadow(&target_ty, ApiVersion::new(1, 3), Purpose::Decode).unwrap();
        let mut target = Value::Null;
        reconcile_decode(&shadow_ty, Value::Null, &target_ty, &mut target).unwrap();
        assert!(target.is_null());
    }

    #[test]
    fn null_list_element_record_reports_index() {
        let target_ty = TypeDesc::list(TypeDesc::record(schema()));
        let shadow_ty =
            derive_shadow(&target_ty, ApiVersion::new(1, 3), Purpose::Decode).unwrap();
        let mut target = Value::zero(&target_ty);
        let err = reconcile_decode(
            &shadow_ty,
            Value::List(vec![Value::Null]),
            &target_ty,
            &mut target,
        )
        .unwrap_err();
        assert_eq!(err.path(), &[crate::error::PathSegment::Index(0)]);
        assert_eq!(err.reason(), &Reason::MissingField("foo".into()));
    }

    #[test]
    fn shadow_field_missing_from_target_is_internal() {
        let shadow_schema = RecordSchema::new(
            "Obj",
            [FieldSpec::new("ghost", TypeDesc::optional(TypeDesc::i64()))],
        )
        .unwrap();
        let target_schema =
            RecordSchema::new("Obj", [FieldSpec::new("real", TypeDesc::i64())]).unwrap();
        let mut target = Value::Null;
        let err = reconcile_decode(
            &TypeDesc::record(shadow_schema),
            record(&[("ghost", Value::Int(1))]),
            &TypeDesc::record(target_schema),
            &mut target,
        )
        .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn list_shadow_into_scalar_target_is_internal() {
        let mut target = Value::Int(0);
        let err = reconcile_decode(
            &TypeDesc::list(TypeDesc::i64()),
            Value::List(vec![Value::Int(1)]),
            &TypeDesc::i64(),
            &mut target,
        )
        .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn list_elements_are_appended() {
        let mut target = Value::List(vec![Value::Int(1)]);
        reconcile_decode(
            &TypeDesc::list(TypeDesc::i64()),
            Value::List(vec![Value::Int(2), Value::Int(3)]),
            &TypeDesc::list(TypeDesc::i64()),
            &mut target,
        )
        .unwrap();
        assert_eq!(
            target,
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn nil_map_leaves_target_nil() {
        let ty = TypeDesc::map(TypeDesc::str(), TypeDesc::i64());
        let mut target = Value::Null;
        reconcile_decode(&ty, Value::Null, &ty, &mut target).unwrap();
        assert!(target.is_null());
    }

    #[test]
    fn weak_float_narrows_into_f32() {
        let mut target = Value::Float(0.0);
        reconcile_decode(
            &TypeDesc::Weak(WeakKind::Float),
            Value::Float(f64::from(42.8f32)),
            &TypeDesc::f32(),
            &mut target,
        )
        .unwrap();
        assert_eq!(target, Value::Float(42.8));
    }

    #[test]
    fn weak_int_overflowing_target_is_user_error() {
        let mut target = Value::Int(0);
        let err = reconcile_decode(
            &TypeDesc::Weak(WeakKind::Int),
            Value::Int(1 << 40),
            &TypeDesc::i32(),
            &mut target,
        )
        .unwrap_err();
        assert!(err.is_user());
    }

    #[test]
    fn weak_bool_into_integer_is_internal() {
        let mut target = Value::Int(0);
        let err = reconcile_decode(
            &TypeDesc::Weak(WeakKind::Bool),
            Value::Bool(true),
            &TypeDesc::i64(),
            &mut target,
        )
        .unwrap_err();
        assert!(err.is_internal());
    }
}
