//! Shadow schema derivation.
//!
//! A shadow has the same shape as the target schema, with three changes made
//! for one requested version:
//!
//! 1. fields newer than the version (and skipped fields) are dropped;
//! 2. every remaining field is optional, so "absent" is distinguishable from
//!    "present with a zero value";
//! 3. for decoding, string-coercible numeric and boolean fields are staged
//!    through a [`WeakKind`](crate::weak::WeakKind).
//!
//! Records that need none of these changes are returned as the original
//! `Arc`, untouched.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::Error;
use crate::schema::validate::validate_map_key;
use crate::schema::{FieldSpec, RecordSchema, TypeDesc};
use crate::version::ApiVersion;

/// What a shadow is derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Stage a parsed document; coercible scalars accept their string form.
    Decode,
    /// Stage an outgoing document; scalars keep their native kinds.
    Encode,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Encode => "encode",
        }
    }

    fn decodes_strings(self) -> bool {
        self == Self::Decode
    }
}

/// Derive the shadow of `ty` at `version`.
pub fn derive_shadow(
    ty: &TypeDesc,
    version: ApiVersion,
    purpose: Purpose,
) -> Result<TypeDesc, Error> {
    ShadowBuilder { version, purpose }.derive(ty)
}

struct ShadowBuilder {
    version: ApiVersion,
    purpose: Purpose,
}

impl ShadowBuilder {
    fn derive(&self, ty: &TypeDesc) -> Result<TypeDesc, Error> {
        Ok(match ty {
            TypeDesc::Scalar(_) | TypeDesc::Opaque | TypeDesc::Weak(_) => ty.clone(),
            TypeDesc::Optional(inner) => TypeDesc::optional(self.derive(inner)?),
            TypeDesc::List(item) => TypeDesc::list(self.derive(item)?),
            TypeDesc::Map { key, value } => {
                validate_map_key(key)?;
                TypeDesc::map(self.derive(key)?, self.derive(value)?)
            }
            TypeDesc::Record(schema) => TypeDesc::Record(self.derive_record(schema)?),
        })
    }

    fn derive_record(&self, schema: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>, Error> {
        let mut changed = false;
        let mut fields = IndexMap::with_capacity(schema.len());

        for field in schema.fields() {
            if !field.is_visible_at(self.version) {
                changed = true;
                continue;
            }

            let derived = self
                .derive(&field.ty)
                .map_err(|e| e.at_field(field.wire_name()))?;
            let mut ty = if derived.is_optional() {
                derived
            } else {
                TypeDesc::optional(derived)
            };

            if field.coercible && self.purpose.decodes_strings() {
                ty = weaken(ty);
            }

            if ty != field.ty {
                changed = true;
            }
            fields.insert(
                field.name.clone(),
                FieldSpec {
                    ty,
                    ..field.clone()
                },
            );
        }

        if !changed {
            trace!(record = schema.name(), "shadow reuses record verbatim");
            return Ok(Arc::clone(schema));
        }
        Ok(RecordSchema::from_map(schema.name().to_owned(), fields))
    }
}

/// Swap an optional numeric or boolean payload for its weak scalar.
/// String and opaque leaves have no weak form and are left as they are.
fn weaken(ty: TypeDesc) -> TypeDesc {
    match ty {
        TypeDesc::Optional(inner) => match *inner {
            TypeDesc::Scalar(kind) => match kind.weak_kind() {
                Some(weak) => TypeDesc::optional(TypeDesc::Weak(weak)),
                None => TypeDesc::optional(TypeDesc::Scalar(kind)),
            },
            other => TypeDesc::optional(other),
        },
        other => other,
    }
}
