//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;

// Re-export the specification model from infrastructure
pub use crate::infrastructure::openapi::types::{
    ArrayShape, Endpoint, HttpMethod, ObjectShape, Parameter, Reference, ResponseSpec, Schema,
    SchemaKind, SchemaRegistry, Specification,
};

/// Target type expression
///
/// Language neutral: a code printer turns it into source text through a
/// [`TypeMapping`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeExpr {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    /// Dynamic fallback for anything that cannot be mapped
    Any,
    /// Generic object marker
    Object,
    /// Generic array marker
    Array,
    /// Array with a known item type
    ArrayOf(Box<TypeExpr>),
    /// Generated or referenced DTO type
    Named(String),
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    /// Builds a union, flattening nested unions and dropping repeated members.
    ///
    /// A single surviving member is returned as-is.
    pub fn union<I: IntoIterator<Item = TypeExpr>>(members: I) -> TypeExpr {
        let mut flat: Vec<TypeExpr> = Vec::new();
        for member in members {
            let parts = match member {
                TypeExpr::Union(inner) => inner,
                other => vec![other],
            };
            for part in parts {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }

        match flat.len() {
            0 => TypeExpr::Any,
            1 => flat.remove(0),
            _ => TypeExpr::Union(flat),
        }
    }

    pub fn named(name: impl Into<String>) -> TypeExpr {
        TypeExpr::Named(name.into())
    }

    pub fn array_of(item: TypeExpr) -> TypeExpr {
        TypeExpr::ArrayOf(Box::new(item))
    }

    /// DTO names this expression refers to, outermost first
    pub fn named_types(&self) -> Vec<&str> {
        match self {
            TypeExpr::Named(name) => vec![name.as_str()],
            TypeExpr::ArrayOf(item) => item.named_types(),
            TypeExpr::Union(members) => members.iter().flat_map(TypeExpr::named_types).collect(),
            _ => Vec::new(),
        }
    }

    /// Renders the expression with the given mapping table
    pub fn render(&self, mapping: &TypeMapping) -> String {
        match self {
            TypeExpr::Integer => mapping.integer.clone(),
            TypeExpr::Float => mapping.float.clone(),
            TypeExpr::String => mapping.string.clone(),
            TypeExpr::Boolean => mapping.boolean.clone(),
            TypeExpr::Null => mapping.null.clone(),
            TypeExpr::Any => mapping.any.clone(),
            TypeExpr::Object => mapping.object.clone(),
            TypeExpr::Array => mapping.array.clone(),
            TypeExpr::ArrayOf(item) => mapping.array_of.replace("{item}", &item.render(mapping)),
            TypeExpr::Named(name) => name.clone(),
            TypeExpr::Union(members) => members
                .iter()
                .map(|m| m.render(mapping))
                .collect::<Vec<_>>()
                .join(&mapping.union_separator),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&TypeMapping::default()))
    }
}

/// Declared type-mapping table used to render [`TypeExpr`]s
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMapping {
    pub integer: String,
    pub float: String,
    pub string: String,
    pub boolean: String,
    pub null: String,
    pub any: String,
    pub object: String,
    pub array: String,
    /// Template for typed arrays; `{item}` is replaced by the item type
    pub array_of: String,
    pub union_separator: String,
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self {
            integer: "int".to_string(),
            float: "float".to_string(),
            string: "string".to_string(),
            boolean: "bool".to_string(),
            null: "null".to_string(),
            any: "mixed".to_string(),
            object: "object".to_string(),
            array: "array".to_string(),
            array_of: "array<{item}>".to_string(),
            union_separator: "|".to_string(),
        }
    }
}

/// Where a DTO artifact came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum DtoOrigin {
    /// Body of an endpoint response
    Response { endpoint: String, status: u16 },
    /// Inline object nested under a property
    Nested { property: String },
    /// Schema declared in the registry
    Schema { name: String },
}

/// One DTO field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtoField {
    /// Wire name as it appears in the payload
    pub original_name: String,
    /// Identifier used in generated code
    pub normalized_name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub nullable: bool,
}

impl DtoField {
    /// True when serialization needs the wire name attached explicitly
    pub fn has_name_mapping(&self) -> bool {
        self.original_name != self.normalized_name
    }
}

/// Generated data-transfer object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtoArtifact {
    pub type_name: String,
    pub namespace: Vec<String>,
    pub collection_group: String,
    pub origin: DtoOrigin,
    pub fields: Vec<DtoField>,
    pub doc_title: Option<String>,
    pub doc_description: Option<String>,
}

impl DtoArtifact {
    pub fn field(&self, original_name: &str) -> Option<&DtoField> {
        self.fields.iter().find(|f| f.original_name == original_name)
    }

    /// True when at least one field carries wire-name metadata
    pub fn has_name_mappings(&self) -> bool {
        self.fields.iter().any(DtoField::has_name_mapping)
    }
}

/// Where a request parameter is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Body,
    Query,
    Header,
}

impl ParameterLocation {
    /// Name of the accessor that returns the non-null members of a group
    pub fn accessor_name(&self) -> Option<&'static str> {
        match self {
            ParameterLocation::Path => None,
            ParameterLocation::Body => Some("defaultBody"),
            ParameterLocation::Query => Some("defaultQuery"),
            ParameterLocation::Header => Some("defaultHeaders"),
        }
    }
}

/// Parameter as placed on a request artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameter {
    /// Wire name
    pub name: String,
    pub variable_name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub required: bool,
    /// Optional parameters are nullable and default to null
    pub nullable: bool,
    pub default: Option<JsonValue>,
    pub description: Option<String>,
}

/// Request parameters grouped by location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroups {
    pub path: Vec<RequestParameter>,
    pub body: Vec<RequestParameter>,
    pub query: Vec<RequestParameter>,
    pub header: Vec<RequestParameter>,
}

impl ParameterGroups {
    pub fn group(&self, location: ParameterLocation) -> &[RequestParameter] {
        match location {
            ParameterLocation::Path => &self.path,
            ParameterLocation::Body => &self.body,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.header,
        }
    }

    /// All parameters in initializer order: path, body, query, header
    pub fn initializer_order(&self) -> impl Iterator<Item = &RequestParameter> {
        self.path
            .iter()
            .chain(&self.body)
            .chain(&self.query)
            .chain(&self.header)
    }
}

/// Accessor returning the non-null members of one parameter group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAccessor {
    pub location: ParameterLocation,
    pub method_name: String,
    /// `(wire name, variable name)` pairs in group order
    pub entries: Vec<(String, String)>,
}

impl GroupAccessor {
    /// Applies the accessor contract to a set of variable values.
    ///
    /// `values` is keyed by variable name; the result is keyed by wire name
    /// and omits members that are missing or null.
    pub fn select(&self, values: &JsonMap<String, JsonValue>) -> JsonMap<String, JsonValue> {
        self.entries
            .iter()
            .filter_map(|(wire, variable)| match values.get(variable) {
                Some(JsonValue::Null) | None => None,
                Some(value) => Some((wire.clone(), value.clone())),
            })
            .collect()
    }
}

/// One segment of a request path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "segment", content = "value", rename_all = "snake_case")]
pub enum PathSegment {
    Literal(String),
    /// Substitution slot bound to a path parameter variable
    Slot(String),
}

/// Status code to DTO type mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchEntry {
    pub status: u16,
    pub dto_type_name: String,
}

/// Generated request type for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArtifact {
    pub type_name: String,
    pub namespace: Vec<String>,
    pub resource_group: String,
    pub http_method: HttpMethod,
    /// Whether the request sends a JSON body
    pub body_capable: bool,
    pub path_segments: Vec<PathSegment>,
    pub path_template: String,
    pub parameters: ParameterGroups,
    pub accessors: Vec<GroupAccessor>,
    pub response_dispatch: Vec<DispatchEntry>,
    /// Distinct dispatch types, first-seen order
    pub response_types: Vec<String>,
    pub doc_title: Option<String>,
    pub doc_description: Option<String>,
}

impl RequestArtifact {
    /// Whether the request builds DTOs from responses
    pub fn creates_dto_from_response(&self) -> bool {
        !self.response_dispatch.is_empty()
    }

    pub fn dispatch_for(&self, status: u16) -> Option<&str> {
        self.response_dispatch
            .iter()
            .find(|e| e.status == status)
            .map(|e| e.dto_type_name.as_str())
    }

    pub fn accessor(&self, location: ParameterLocation) -> Option<&GroupAccessor> {
        self.accessors.iter().find(|a| a.location == location)
    }

    /// Declared return type: union of the distinct dispatch types
    pub fn response_type(&self) -> Option<TypeExpr> {
        if self.response_types.is_empty() {
            return None;
        }
        Some(TypeExpr::union(
            self.response_types.iter().cloned().map(TypeExpr::Named),
        ))
    }
}

/// Generated artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "artifact", rename_all = "snake_case")]
pub enum Artifact {
    Dto(DtoArtifact),
    Request(RequestArtifact),
}

impl Artifact {
    pub fn type_name(&self) -> &str {
        match self {
            Artifact::Dto(dto) => &dto.type_name,
            Artifact::Request(request) => &request.type_name,
        }
    }

    pub fn as_dto(&self) -> Option<&DtoArtifact> {
        match self {
            Artifact::Dto(dto) => Some(dto),
            Artifact::Request(_) => None,
        }
    }

    pub fn as_request(&self) -> Option<&RequestArtifact> {
        match self {
            Artifact::Request(request) => Some(request),
            Artifact::Dto(_) => None,
        }
    }
}
