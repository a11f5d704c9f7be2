//! Schema to type-expression resolution

use crate::generation::utils::type_name;
use crate::generation::{Schema, SchemaKind, TypeExpr};

/// Maps schema nodes to [`TypeExpr`]s.
///
/// Resolution is pure and infallible. Inline objects and arrays resolve to the
/// generic markers; swapping those for concrete nested DTO names is left to
/// the DTO emitter, which is the only place the enclosing property name is
/// known.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeResolver;

impl TypeResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, schema: &Schema) -> TypeExpr {
        match schema {
            Schema::Reference(reference) => TypeExpr::Named(type_name(&reference.target)),
            Schema::Primitive { kind, format } => self.map_kind(kind, format.as_deref()),
            Schema::Union { kinds } => {
                TypeExpr::union(kinds.iter().map(|kind| self.map_kind(kind, None)))
            }
            Schema::Object(_) => TypeExpr::Object,
            Schema::Array(_) => TypeExpr::Array,
        }
    }

    fn map_kind(&self, kind: &SchemaKind, format: Option<&str>) -> TypeExpr {
        match kind {
            SchemaKind::Integer => TypeExpr::Integer,
            SchemaKind::String => TypeExpr::String,
            SchemaKind::Boolean => TypeExpr::Boolean,
            SchemaKind::Number => match format {
                Some("float") => TypeExpr::Float,
                Some("int32") | Some("int64") => TypeExpr::Integer,
                _ => TypeExpr::Union(vec![TypeExpr::Integer, TypeExpr::Float]),
            },
            SchemaKind::Object => TypeExpr::Object,
            SchemaKind::Array => TypeExpr::Array,
            SchemaKind::Null => TypeExpr::Null,
            SchemaKind::Unknown(keyword) => {
                tracing::debug!(?keyword, "Unmappable schema kind, falling back to any");
                TypeExpr::Any
            }
        }
    }
}
