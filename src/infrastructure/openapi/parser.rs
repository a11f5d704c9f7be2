//! OpenAPI 3.x document parser
//!
//! Walks the raw JSON value of an OpenAPI document and builds the
//! [`Specification`] model the engine consumes:
//! - operations become endpoints (path-level and operation-level parameters
//!   merged, `$ref` parameters and responses resolved)
//! - request-body object properties become body parameters
//! - response schemas keep their `$ref`s as `Reference` nodes
//! - `components.schemas` becomes the schema registry

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::generation::resolver::TypeResolver;
use crate::generation::utils::normalize_identifier;
use crate::generation::{
    ArrayShape, Endpoint, GenerationError, HttpMethod, ObjectShape, Parameter, Reference,
    ResponseSpec, Schema, SchemaKind, SchemaRegistry, Specification,
};

/// Serialization format of a raw document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Unknown,
}

impl DocumentFormat {
    /// Format implied by a file path or URL extension
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".json") {
            DocumentFormat::Json
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        }
    }

    /// Format implied by an HTTP content type
    pub fn from_content_type(content_type: &str) -> Self {
        let lower = content_type.to_ascii_lowercase();
        if lower.contains("json") {
            DocumentFormat::Json
        } else if lower.contains("yaml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Decodes a document as JSON or YAML
pub fn decode_document(content: &str, format: DocumentFormat) -> Result<JsonValue, GenerationError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(GenerationError::SerializationError)
        }
        DocumentFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| GenerationError::LoadError(format!("Failed to parse YAML: {e}"))),
        DocumentFormat::Unknown => serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| {
                GenerationError::LoadError(format!("Failed to parse OpenAPI document: {e}"))
            }),
    }
}

/// OpenAPI document parser
pub struct OpenApiParser {
    /// The raw JSON value of the OpenAPI document
    pub json: JsonValue,
    resolver: TypeResolver,
}

impl OpenApiParser {
    /// Create a new parser from JSON content
    pub fn new(json: JsonValue) -> Self {
        Self {
            json,
            resolver: TypeResolver::new(),
        }
    }

    /// Parse the document into a [`Specification`]
    pub fn parse(&self) -> Result<Specification, GenerationError> {
        let openapi = self
            .json
            .get("openapi")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| GenerationError::ValidationError("Missing OpenAPI version".to_string()))?;
        if !openapi.starts_with('3') {
            return Err(GenerationError::ValidationError(format!(
                "Unsupported OpenAPI version: {openapi}"
            )));
        }

        let title = self
            .title()
            .ok_or_else(|| GenerationError::ValidationError("Missing info.title".to_string()))?
            .to_string();
        let version = self.version().unwrap_or_default().to_string();

        let schemas = self.parse_components()?;
        let endpoints = self.parse_endpoints()?;
        debug!(
            endpoints = endpoints.len(),
            schemas = schemas.len(),
            "OpenAPI parser finished"
        );

        Ok(Specification {
            title,
            version,
            endpoints,
            schemas,
        })
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// Parse every operation of every path, in document order
    pub fn parse_endpoints(&self) -> Result<Vec<Endpoint>, GenerationError> {
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| GenerationError::ValidationError("Missing 'paths' object".to_string()))?;

        paths
            .iter()
            .flat_map(|(path, path_item)| {
                HttpMethod::all().iter().filter_map(move |method| {
                    path_item
                        .get(method.as_openapi_key())
                        .and_then(JsonValue::as_object)
                        .map(|operation| (path, *method, path_item, operation))
                })
            })
            .map(|(path, method, path_item, operation)| {
                self.build_endpoint(path, method, path_item, operation)
            })
            .collect()
    }

    fn parse_components(&self) -> Result<SchemaRegistry, GenerationError> {
        let Some(schemas) = self
            .json
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object)
        else {
            return Ok(SchemaRegistry::new());
        };

        let mut registry = SchemaRegistry::new();
        for (name, schema) in schemas {
            registry.insert(name.clone(), self.parse_schema(schema));
        }
        Ok(registry)
    }

    fn build_endpoint(
        &self,
        path: &str,
        method: HttpMethod,
        path_item: &JsonValue,
        operation: &JsonMap<String, JsonValue>,
    ) -> Result<Endpoint, GenerationError> {
        let summary = operation.get("summary").and_then(JsonValue::as_str);
        let name = operation
            .get("operationId")
            .and_then(JsonValue::as_str)
            .or(summary)
            .map(String::from)
            .unwrap_or_else(|| normalize_identifier(&format!("{}_{path}", method.as_openapi_key())));

        let mut endpoint = Endpoint::new(name, method);
        endpoint.description = operation
            .get("description")
            .and_then(JsonValue::as_str)
            .or(summary)
            .map(String::from);
        endpoint.collection = operation
            .get("tags")
            .and_then(JsonValue::as_array)
            .and_then(|tags| tags.first())
            .and_then(JsonValue::as_str)
            .map(String::from);
        endpoint.path_segments = path_segments(path);

        for (location, parameter) in self.merged_parameters(path_item, operation) {
            match location.as_str() {
                "path" => endpoint.path_parameters.push(parameter),
                "query" => endpoint.query_parameters.push(parameter),
                "header" => endpoint.header_parameters.push(parameter),
                other => debug!(parameter = %parameter.name, location = other, "Dropping parameter"),
            }
        }

        if let Some(body) = operation.get("requestBody") {
            endpoint.body_parameters = self.body_parameters(body)?;
        }

        if let Some(responses) = operation.get("responses").and_then(JsonValue::as_object) {
            for (status, response) in responses {
                let Ok(code) = status.parse::<u16>() else {
                    debug!(endpoint = %endpoint.name, status = %status, "Skipping non-numeric response status");
                    continue;
                };
                endpoint.response.insert(code, self.parse_response(response)?);
            }
        }

        Ok(endpoint)
    }

    /// Path-level parameters overridden by operation-level ones with the same
    /// name and location
    fn merged_parameters(
        &self,
        path_item: &JsonValue,
        operation: &JsonMap<String, JsonValue>,
    ) -> Vec<(String, Parameter)> {
        let mut merged: IndexMap<(String, String), Parameter> = IndexMap::new();
        let sources = [path_item.get("parameters"), operation.get("parameters")];

        for list in sources.into_iter().flatten().filter_map(JsonValue::as_array) {
            for raw in list {
                let resolved = match raw.get("$ref").and_then(JsonValue::as_str) {
                    Some(pointer) => match self.resolve_ref(pointer) {
                        Ok(value) => value,
                        Err(e) => {
                            debug!(error = %e, "Skipping unresolvable parameter");
                            continue;
                        }
                    },
                    None => raw,
                };
                match self.parse_parameter(resolved) {
                    Ok((location, parameter)) => {
                        merged.insert((parameter.name.clone(), location), parameter);
                    }
                    Err(e) => debug!(error = %e, "Skipping invalid parameter"),
                }
            }
        }

        merged
            .into_iter()
            .map(|((_, location), parameter)| (location, parameter))
            .collect()
    }

    fn parse_parameter(&self, param: &JsonValue) -> Result<(String, Parameter), GenerationError> {
        let name = param
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| GenerationError::ValidationError("Parameter missing name".to_string()))?;
        let location = param
            .get("in")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                GenerationError::ValidationError(format!("Parameter `{name}` missing location"))
            })?;

        let required = location == "path"
            || param
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false);

        let schema_value = param.get("schema");
        let ty = match schema_value {
            Some(schema) => self.resolver.resolve(&self.parse_schema(self.follow_ref(schema))),
            None => self.resolver.resolve(&Schema::primitive(SchemaKind::String)),
        };

        let mut parameter = Parameter::new(name, ty, required);
        parameter.default = schema_value.and_then(|s| s.get("default")).cloned();
        parameter.description = param
            .get("description")
            .and_then(JsonValue::as_str)
            .map(String::from);

        Ok((location.to_string(), parameter))
    }

    fn body_parameters(&self, body: &JsonValue) -> Result<Vec<Parameter>, GenerationError> {
        let body = match body.get("$ref").and_then(JsonValue::as_str) {
            Some(pointer) => self.resolve_ref(pointer)?,
            None => body,
        };

        let Some((media, schema)) = select_content(body) else {
            return Ok(Vec::new());
        };
        let schema = self.follow_ref(schema);
        let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) else {
            debug!(media = %media, "Request body is not an object with properties");
            return Ok(Vec::new());
        };
        let required = required_names(schema);

        Ok(properties
            .iter()
            .map(|(name, property)| {
                let ty = self.resolver.resolve(&self.parse_schema(property));
                let mut parameter = Parameter::new(name, ty, required.contains(name));
                parameter.default = property.get("default").cloned();
                parameter.description = property
                    .get("description")
                    .and_then(JsonValue::as_str)
                    .map(String::from);
                parameter
            })
            .collect())
    }

    fn parse_response(&self, response: &JsonValue) -> Result<ResponseSpec, GenerationError> {
        let response = match response.get("$ref").and_then(JsonValue::as_str) {
            Some(pointer) => self.resolve_ref(pointer)?,
            None => response,
        };

        let mut spec = ResponseSpec {
            description: response
                .get("description")
                .and_then(JsonValue::as_str)
                .map(String::from),
            ..Default::default()
        };

        if let Some(content) = response.get("content").and_then(JsonValue::as_object) {
            for (media, media_object) in content {
                if let Some(schema) = media_object.get("schema") {
                    spec.content.insert(media.clone(), self.parse_schema(schema));
                }
            }
        }

        Ok(spec)
    }

    /// Converts a schema value into a [`Schema`] node.
    ///
    /// `$ref`s are kept as references. Composition keywords with a single
    /// member collapse to that member; anything richer becomes an unknown kind.
    pub fn parse_schema(&self, schema: &JsonValue) -> Schema {
        if let Some(pointer) = schema.get("$ref").and_then(JsonValue::as_str) {
            return Schema::Reference(Reference::from_pointer(pointer));
        }

        for keyword in ["allOf", "oneOf", "anyOf"] {
            if let Some(members) = schema.get(keyword).and_then(JsonValue::as_array) {
                return match members.as_slice() {
                    [single] => self.parse_schema(single),
                    _ => Schema::primitive(SchemaKind::Unknown(Some(keyword.to_string()))),
                };
            }
        }

        let format = schema
            .get("format")
            .and_then(JsonValue::as_str)
            .map(String::from);

        let mut kinds: Vec<SchemaKind> = match schema.get("type") {
            Some(JsonValue::Array(keywords)) => keywords
                .iter()
                .map(|k| SchemaKind::from_keyword(k.as_str()))
                .collect(),
            Some(JsonValue::String(keyword)) => vec![SchemaKind::from_keyword(Some(keyword))],
            _ if schema.get("properties").is_some() => vec![SchemaKind::Object],
            _ if schema.get("items").is_some() => vec![SchemaKind::Array],
            _ => Vec::new(),
        };
        if kinds.len() > 1 {
            return Schema::Union { kinds };
        }

        match kinds.pop() {
            Some(kind @ (SchemaKind::Object | SchemaKind::Array)) => self.parse_shape(schema, &kind),
            Some(kind) => Schema::Primitive { kind, format },
            None => Schema::Primitive {
                kind: SchemaKind::Unknown(None),
                format,
            },
        }
    }

    fn parse_shape(&self, schema: &JsonValue, kind: &SchemaKind) -> Schema {
        match kind {
            SchemaKind::Array => match schema.get("items") {
                Some(items) => Schema::Array(ArrayShape {
                    items: Box::new(self.parse_schema(items)),
                }),
                None => Schema::primitive(SchemaKind::Array),
            },
            _ => {
                let properties = schema
                    .get("properties")
                    .and_then(JsonValue::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, value)| (name.clone(), self.parse_schema(value)))
                            .collect()
                    })
                    .unwrap_or_default();

                Schema::Object(ObjectShape {
                    title: schema.get("title").and_then(JsonValue::as_str).map(String::from),
                    description: schema
                        .get("description")
                        .and_then(JsonValue::as_str)
                        .map(String::from),
                    properties,
                    required: required_names(schema),
                })
            }
        }
    }

    /// Follows one `$ref`, or returns the value unchanged
    fn follow_ref<'v>(&'v self, value: &'v JsonValue) -> &'v JsonValue {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(pointer) => self.resolve_ref(pointer).unwrap_or(value),
            None => value,
        }
    }

    /// Resolve a local `$ref`
    fn resolve_ref(&self, ref_str: &str) -> Result<&JsonValue, GenerationError> {
        if let Some(pointer) = ref_str.strip_prefix('#') {
            self.json.pointer(pointer).ok_or_else(|| {
                GenerationError::ValidationError(format!("Unable to resolve reference: {ref_str}"))
            })
        } else {
            Err(GenerationError::ValidationError(format!(
                "External references not supported: {ref_str}"
            )))
        }
    }
}

/// Splits a path into segments, turning `{x}` into `:x`
fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            match segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            {
                Some(name) => format!(":{name}"),
                None => segment.to_string(),
            }
        })
        .collect()
}

/// JSON media type of a body if present, else the first declared one
fn select_content(body: &JsonValue) -> Option<(&String, &JsonValue)> {
    let content = body.get("content")?.as_object()?;
    content
        .iter()
        .find(|(media, _)| media.contains("json"))
        .or_else(|| content.iter().next())
        .and_then(|(media, value)| value.get("schema").map(|schema| (media, schema)))
}

fn required_names(schema: &JsonValue) -> Vec<String> {
    schema
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::TypeExpr;
    use serde_json::json;

    fn users_document() -> JsonValue {
        json!({
            "openapi": "3.0.3",
            "info": { "title": "Users API", "version": "2.1.0" },
            "paths": {
                "/users/{id}": {
                    "parameters": [
                        { "$ref": "#/components/parameters/UserId" },
                        { "name": "X-Trace", "in": "header", "schema": { "type": "string" } }
                    ],
                    "get": {
                        "operationId": "getUser",
                        "tags": ["users", "admin"],
                        "summary": "Fetch one user",
                        "parameters": [
                            { "name": "X-Trace", "in": "header", "required": true, "schema": { "type": "string" } },
                            { "name": "session", "in": "cookie", "schema": { "type": "string" } },
                            { "name": "expand", "in": "query", "schema": { "type": "boolean", "default": false } }
                        ],
                        "responses": {
                            "200": {
                                "description": "The user",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "required": ["id"],
                                            "properties": {
                                                "id": { "type": "integer" },
                                                "name": { "type": ["string", "null"] },
                                                "team": { "$ref": "#/components/schemas/Team" }
                                            }
                                        }
                                    }
                                }
                            },
                            "404": { "$ref": "#/components/responses/NotFound" },
                            "default": { "description": "Unexpected error" }
                        }
                    }
                },
                "/users": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewUser" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created",
                                "content": {
                                    "application/json": { "schema": { "$ref": "#/components/schemas/Team" } }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "parameters": {
                    "UserId": {
                        "name": "id", "in": "path",
                        "schema": { "type": "integer", "format": "int64" }
                    }
                },
                "responses": {
                    "NotFound": {
                        "description": "Not found",
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/Error" } }
                        }
                    }
                },
                "schemas": {
                    "Team": { "type": "object", "properties": { "slug": { "type": "string" } } },
                    "Error": { "type": "object", "properties": { "message": { "type": "string" } } },
                    "NewUser": {
                        "type": "object",
                        "required": ["email"],
                        "properties": {
                            "email": { "type": "string" },
                            "age": { "type": "number" }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_endpoint_basics() {
        let spec = OpenApiParser::new(users_document()).parse().unwrap();

        assert_eq!(spec.title, "Users API");
        assert_eq!(spec.version, "2.1.0");
        assert_eq!(spec.endpoints.len(), 2);

        let get = &spec.endpoints[0];
        assert_eq!(get.name, "getUser");
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.collection.as_deref(), Some("users"));
        assert_eq!(get.description.as_deref(), Some("Fetch one user"));
        assert_eq!(get.path_segments, vec!["users", ":id"]);
    }

    #[test]
    fn test_parameters_are_merged_and_resolved() {
        let spec = OpenApiParser::new(users_document()).parse().unwrap();
        let get = &spec.endpoints[0];

        assert_eq!(get.path_parameters.len(), 1);
        assert_eq!(get.path_parameters[0].name, "id");
        assert_eq!(get.path_parameters[0].ty, TypeExpr::Integer);
        assert!(get.path_parameters[0].required);

        // Operation-level header overrides the path-level one
        assert_eq!(get.header_parameters.len(), 1);
        assert!(get.header_parameters[0].required);

        assert_eq!(get.query_parameters.len(), 1);
        assert_eq!(get.query_parameters[0].default, Some(json!(false)));
    }

    #[test]
    fn test_responses() {
        let spec = OpenApiParser::new(users_document()).parse().unwrap();
        let get = &spec.endpoints[0];

        let statuses: Vec<u16> = get.response.keys().copied().collect();
        assert_eq!(statuses, vec![200, 404]);

        let ok = &get.response[&200];
        let (_, schema) = ok.select_media(&[]).unwrap();
        let shape = schema.as_object_with_properties().unwrap();
        assert_eq!(shape.required, vec!["id"]);
        let names: Vec<_> = shape.properties.keys().cloned().collect();
        assert_eq!(names, vec!["id", "name", "team"]);
        assert_eq!(
            shape.properties["name"],
            Schema::Union {
                kinds: vec![SchemaKind::String, SchemaKind::Null]
            }
        );
        assert_eq!(shape.properties["team"], Schema::reference("Team"));

        let not_found = &get.response[&404];
        assert_eq!(not_found.description.as_deref(), Some("Not found"));
        assert_eq!(
            not_found.select_media(&[]).unwrap().1,
            &Schema::reference("Error")
        );
    }

    #[test]
    fn test_body_parameters_and_fallback_name() {
        let spec = OpenApiParser::new(users_document()).parse().unwrap();
        let post = &spec.endpoints[1];

        assert_eq!(post.name, "post_users");
        assert_eq!(post.collection, None);
        assert_eq!(post.body_parameters.len(), 2);
        assert_eq!(post.body_parameters[0].name, "email");
        assert!(post.body_parameters[0].required);
        assert_eq!(
            post.body_parameters[1].ty,
            TypeExpr::Union(vec![TypeExpr::Integer, TypeExpr::Float])
        );
    }

    #[test]
    fn test_registry() {
        let spec = OpenApiParser::new(users_document()).parse().unwrap();
        let names: Vec<_> = spec.schemas.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Team", "Error", "NewUser"]);
    }

    #[test]
    fn test_missing_version_and_title() {
        let err = OpenApiParser::new(json!({ "info": { "title": "x" }, "paths": {} }))
            .parse()
            .unwrap_err();
        assert!(err.to_string().contains("Missing OpenAPI version"));

        let err = OpenApiParser::new(json!({ "openapi": "3.1.0", "paths": {} }))
            .parse()
            .unwrap_err();
        assert!(err.to_string().contains("info.title"));

        let err = OpenApiParser::new(json!({ "swagger": "2.0", "openapi": "2.0", "info": { "title": "x" }, "paths": {} }))
            .parse()
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn test_schema_shapes() {
        let parser = OpenApiParser::new(json!({}));

        assert_eq!(
            parser.parse_schema(&json!({ "type": "number", "format": "float" })),
            Schema::with_format(SchemaKind::Number, "float")
        );
        assert_eq!(
            parser.parse_schema(&json!({ "type": "array", "items": { "type": "string" } })),
            Schema::array(Schema::primitive(SchemaKind::String))
        );
        assert_eq!(
            parser.parse_schema(&json!({ "type": "array" })),
            Schema::primitive(SchemaKind::Array)
        );
        assert_eq!(
            parser.parse_schema(&json!({ "allOf": [{ "$ref": "#/components/schemas/User" }] })),
            Schema::reference("User")
        );
        assert_eq!(
            parser.parse_schema(&json!({})),
            Schema::primitive(SchemaKind::Unknown(None))
        );
        assert!(matches!(
            parser.parse_schema(&json!({ "properties": { "a": { "type": "string" } } })),
            Schema::Object(_)
        ));
    }

    #[test]
    fn test_decode_document() {
        let json_value =
            decode_document(r#"{"openapi": "3.0.0"}"#, DocumentFormat::from_path("spec.JSON")).unwrap();
        assert_eq!(json_value["openapi"], "3.0.0");

        let format = DocumentFormat::from_content_type("application/x-yaml");
        assert_eq!(format, DocumentFormat::Yaml);
        let yaml_value = decode_document("openapi: 3.0.0\n", format).unwrap();
        assert_eq!(yaml_value["openapi"], "3.0.0");

        // Directory names do not count as a format hint
        let format = DocumentFormat::from_path("/srv/json/spec");
        assert_eq!(format, DocumentFormat::Unknown);
        let sniffed = decode_document("openapi: 3.0.0\n", format).unwrap();
        assert_eq!(sniffed["openapi"], "3.0.0");

        assert!(decode_document("{ not json", DocumentFormat::Json).is_err());
    }
}
