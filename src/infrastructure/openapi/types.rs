//! Specification model consumed by the generation engine
//!
//! These types are what the parser produces and what the emitters read. They
//! are deliberately smaller than OpenAPI itself: only the pieces the engine
//! needs to name, type and dispatch artifacts survive parsing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::generation::{GenerationError, TypeExpr};

/// HTTP methods an endpoint can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    /// All methods in the order path items are scanned
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Head,
            HttpMethod::Options,
            HttpMethod::Trace,
            HttpMethod::Connect,
        ]
    }

    /// Methods whose requests carry a JSON body
    pub fn requires_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Lowercase key used for this method inside an OpenAPI path item
    pub fn as_openapi_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
            HttpMethod::Connect => "connect",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_openapi_key().to_ascii_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::all()
            .iter()
            .copied()
            .find(|m| m.as_openapi_key().eq_ignore_ascii_case(s))
            .ok_or_else(|| GenerationError::ValidationError(format!("Unknown HTTP method: {s}")))
    }
}

/// Primitive schema kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Integer,
    String,
    Boolean,
    Number,
    Array,
    Object,
    Null,
    /// Anything else, including a missing `type`
    Unknown(Option<String>),
}

impl SchemaKind {
    /// Parses an OpenAPI `type` keyword
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword {
            Some("integer") => SchemaKind::Integer,
            Some("string") => SchemaKind::String,
            Some("boolean") => SchemaKind::Boolean,
            Some("number") => SchemaKind::Number,
            Some("array") => SchemaKind::Array,
            Some("object") => SchemaKind::Object,
            Some("null") => SchemaKind::Null,
            other => SchemaKind::Unknown(other.map(String::from)),
        }
    }
}

/// Object schema with named properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectShape {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Properties in declaration order
    pub properties: IndexMap<String, Schema>,
    /// Names of properties that must be present
    #[serde(default)]
    pub required: Vec<String>,
}

impl ObjectShape {
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

/// Array schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayShape {
    pub items: Box<Schema>,
}

/// Named pointer to a schema declared in the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Short name of the target, e.g. `User` for `#/components/schemas/User`
    pub target: String,
}

impl Reference {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Builds a reference from a `$ref` pointer, keeping only the last segment
    pub fn from_pointer(pointer: &str) -> Self {
        let target = pointer.rsplit('/').next().unwrap_or(pointer);
        Self::new(target)
    }
}

/// Recursive schema node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Schema {
    Primitive {
        kind: SchemaKind,
        format: Option<String>,
    },
    /// Multi-typed schema, members in declaration order
    Union { kinds: Vec<SchemaKind> },
    Object(ObjectShape),
    Array(ArrayShape),
    Reference(Reference),
}

impl Schema {
    pub fn primitive(kind: SchemaKind) -> Self {
        Schema::Primitive { kind, format: None }
    }

    pub fn with_format(kind: SchemaKind, format: impl Into<String>) -> Self {
        Schema::Primitive {
            kind,
            format: Some(format.into()),
        }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Schema::Reference(Reference::new(target))
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(ArrayShape {
            items: Box::new(items),
        })
    }

    /// Object shape with all listed properties optional
    pub fn object<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        Schema::Object(ObjectShape {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Default::default()
        })
    }

    /// Object shape with properties, or `None` for anything else
    pub fn as_object_with_properties(&self) -> Option<&ObjectShape> {
        match self {
            Schema::Object(shape) if shape.has_properties() => Some(shape),
            _ => None,
        }
    }
}

/// Flat registry of schemas declared by the specification, by short name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry(IndexMap<String, Schema>);

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        self.0.insert(name.into(), schema);
    }

    /// Looks up the target of a reference; one level only
    pub fn resolve(&self, reference: &Reference) -> Option<&Schema> {
        self.0.get(&reference.target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Schema)> for SchemaRegistry {
    fn from_iter<T: IntoIterator<Item = (S, Schema)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Endpoint parameter with its type already resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeExpr, required: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            required,
            default: None,
            description: None,
        }
    }
}

/// Body of one response, keyed by media type in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    pub description: Option<String>,
    pub content: IndexMap<String, Schema>,
}

impl ResponseSpec {
    /// Response without a body
    pub fn empty() -> Self {
        Self::default()
    }

    /// Response with a single `application/json` body
    pub fn json(schema: Schema) -> Self {
        let mut content = IndexMap::new();
        content.insert("application/json".to_string(), schema);
        Self {
            description: None,
            content,
        }
    }

    /// Picks the one media type consulted for this response.
    ///
    /// The first entry of `preferred` present in `content` wins; otherwise the
    /// first declared media type is used.
    pub fn select_media(&self, preferred: &[String]) -> Option<(&str, &Schema)> {
        preferred
            .iter()
            .find_map(|media| self.content.get_key_value(media.as_str()))
            .or_else(|| self.content.first())
            .map(|(media, schema)| (media.as_str(), schema))
    }
}

/// One API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub description: Option<String>,
    pub method: HttpMethod,
    pub collection: Option<String>,
    /// Literal segments or `:name` placeholders, without slashes
    pub path_segments: Vec<String>,
    pub path_parameters: Vec<Parameter>,
    pub query_parameters: Vec<Parameter>,
    pub body_parameters: Vec<Parameter>,
    pub header_parameters: Vec<Parameter>,
    /// Responses by status code, in declaration order
    pub response: IndexMap<u16, ResponseSpec>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            name: name.into(),
            description: None,
            method,
            collection: None,
            path_segments: Vec::new(),
            path_parameters: Vec::new(),
            query_parameters: Vec::new(),
            body_parameters: Vec::new(),
            header_parameters: Vec::new(),
            response: IndexMap::new(),
        }
    }

    /// Sets `path_segments` from a path such as `/users/:id`
    pub fn with_path(mut self, path: &str) -> Self {
        self.path_segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        self
    }

    pub fn with_response(mut self, status: u16, response: ResponseSpec) -> Self {
        self.response.insert(status, response);
        self
    }
}

/// Parsed API description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub title: String,
    pub version: String,
    pub endpoints: Vec<Endpoint>,
    pub schemas: SchemaRegistry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_body_rule() {
        assert!(HttpMethod::Post.requires_body());
        assert!(HttpMethod::Put.requires_body());
        assert!(HttpMethod::Patch.requires_body());
        assert!(!HttpMethod::Get.requires_body());
        assert!(!HttpMethod::Delete.requires_body());
    }

    #[test]
    fn test_http_method_from_str() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("fetch".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_reference_from_pointer() {
        assert_eq!(
            Reference::from_pointer("#/components/schemas/User").target,
            "User"
        );
        assert_eq!(Reference::from_pointer("User").target, "User");
    }

    #[test]
    fn test_endpoint_with_path() {
        let endpoint = Endpoint::new("GetUser", HttpMethod::Get).with_path("/users/:id/");
        assert_eq!(endpoint.path_segments, vec!["users", ":id"]);
    }

    #[test]
    fn test_select_media_prefers_configured_type() {
        let mut response = ResponseSpec::empty();
        response
            .content
            .insert("application/xml".to_string(), Schema::primitive(SchemaKind::String));
        response
            .content
            .insert("application/json".to_string(), Schema::reference("User"));

        let (media, _) = response.select_media(&[]).unwrap();
        assert_eq!(media, "application/xml");

        let preferred = vec!["text/plain".to_string(), "application/json".to_string()];
        let (media, schema) = response.select_media(&preferred).unwrap();
        assert_eq!(media, "application/json");
        assert_eq!(schema, &Schema::reference("User"));

        assert!(ResponseSpec::empty().select_media(&preferred).is_none());
    }

    #[test]
    fn test_schema_kind_from_keyword() {
        assert_eq!(SchemaKind::from_keyword(Some("integer")), SchemaKind::Integer);
        assert_eq!(
            SchemaKind::from_keyword(Some("file")),
            SchemaKind::Unknown(Some("file".to_string()))
        );
        assert_eq!(SchemaKind::from_keyword(None), SchemaKind::Unknown(None));
    }
}
