use std::sync::Arc;

use indexmap::IndexMap;

use super::types::TypeDesc;
use crate::error::{Error, Reason};
use crate::tag::FieldTag;
use crate::version::ApiVersion;

/// One field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Logical name, used to match shadow and target fields.
    pub name: String,
    pub ty: TypeDesc,
    /// Minimum version at which the field is visible.
    pub since: ApiVersion,
    /// Accept the string form of a numeric or boolean value.
    pub coercible: bool,
    /// Name on the wire, when it differs from the logical name.
    pub wire_name: Option<String>,
    /// Never read from or written to documents.
    pub skip: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            since: ApiVersion::ZERO,
            coercible: false,
            wire_name: None,
            skip: false,
        }
    }

    /// Build a field from an `api` tag such as `"1.4,str"`.
    pub fn tagged(name: impl Into<String>, ty: TypeDesc, tag: &str) -> Result<Self, Error> {
        let tag = FieldTag::parse(tag)?;
        Ok(Self::new(name, ty).since(tag.since).coercible_if(tag.coercible))
    }

    pub fn since(mut self, version: ApiVersion) -> Self {
        self.since = version;
        self
    }

    pub fn coercible(self) -> Self {
        self.coercible_if(true)
    }

    fn coercible_if(mut self, coercible: bool) -> Self {
        self.coercible = coercible;
        self
    }

    pub fn rename(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_visible_at(&self, version: ApiVersion) -> bool {
        !self.skip && self.since <= version
    }
}

/// Named, ordered set of fields, keyed by logical name.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: IndexMap<String, FieldSpec>,
}

impl RecordSchema {
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Result<Arc<Self>, Error> {
        let name = name.into();
        let mut map = IndexMap::new();
        for field in fields {
            if map.contains_key(&field.name) {
                return Err(Reason::DuplicateField {
                    record: name,
                    field: field.name,
                }
                .into());
            }
            map.insert(field.name.clone(), field);
        }
        Ok(Arc::new(Self { name, fields: map }))
    }

    /// Build without the duplicate check; `fields` is already keyed.
    pub(crate) fn from_map(name: String, fields: IndexMap<String, FieldSpec>) -> Arc<Self> {
        Arc::new(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
