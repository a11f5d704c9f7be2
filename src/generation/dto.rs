//! DTO emission
//!
//! Turns response bodies (and, optionally, registry schemas) into
//! [`DtoArtifact`]s. Inline objects and arrays of inline objects become their
//! own nested DTOs, stored in the cache before the DTO that uses them.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::core::GeneratorConfig;
use crate::generation::cache::{Claim, GenerationCache};
use crate::generation::resolver::TypeResolver;
use crate::generation::sanitizers::doc_text;
use crate::generation::utils::{resource_group_name, response_type_name, type_name, variable_name};
use crate::generation::{
    DtoArtifact, DtoField, DtoOrigin, Endpoint, GenerationError, ObjectShape, Reference,
    ResponseSpec, Schema, SchemaRegistry, TypeExpr,
};

/// Where a DTO tree is being emitted from; used for error reporting
#[derive(Debug, Clone, Copy)]
enum Site<'s> {
    Response { endpoint: &'s str, status: u16 },
    Schema { name: &'s str },
}

impl Site<'_> {
    fn unresolved(&self, target: &str) -> GenerationError {
        match *self {
            Site::Response { endpoint, status } => GenerationError::UnresolvedReference {
                endpoint: endpoint.to_string(),
                status,
                target: target.to_string(),
            },
            Site::Schema { name } => GenerationError::UnresolvedSchemaReference {
                schema: name.to_string(),
                target: target.to_string(),
            },
        }
    }
}

/// Shared context for one DTO tree
struct Scope<'s> {
    site: Site<'s>,
    collection_group: String,
}

pub struct DtoEmitter<'a> {
    config: &'a GeneratorConfig,
    registry: &'a SchemaRegistry,
    resolver: TypeResolver,
}

impl<'a> DtoEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig, registry: &'a SchemaRegistry) -> Self {
        Self {
            config,
            registry,
            resolver: TypeResolver::new(),
        }
    }

    /// Emits the DTO describing one endpoint response.
    ///
    /// Returns the DTO type name, or `None` when the response gets no DTO:
    /// status 204, no body, a top-level reference (dispatch uses the
    /// reference directly) or a body that is not an object with properties.
    pub fn emit_response_dto(
        &self,
        endpoint: &Endpoint,
        status: u16,
        response: &ResponseSpec,
        cache: &mut GenerationCache,
    ) -> Result<Option<String>, GenerationError> {
        if status == 204 {
            debug!(endpoint = %endpoint.name, "Skipping 204 response");
            return Ok(None);
        }

        let Some((media, schema)) = response.select_media(&self.config.preferred_media_types)
        else {
            debug!(endpoint = %endpoint.name, status, "Response has no body");
            return Ok(None);
        };
        if response.content.len() > 1 {
            debug!(
                endpoint = %endpoint.name,
                status,
                selected = media,
                ignored = response.content.len() - 1,
                "Response declares several media types, using one"
            );
        }

        let site = Site::Response {
            endpoint: &endpoint.name,
            status,
        };

        let shape = match schema {
            Schema::Reference(reference) => {
                self.check_reference(reference, site)?;
                debug!(
                    endpoint = %endpoint.name,
                    status,
                    target = %reference.target,
                    "Response is a reference, no DTO emitted"
                );
                return Ok(None);
            }
            other => match other.as_object_with_properties() {
                Some(shape) => shape,
                None => {
                    debug!(endpoint = %endpoint.name, status, "Response body is not an object with properties");
                    return Ok(None);
                }
            },
        };

        let scope = Scope {
            site,
            collection_group: self.collection_group(endpoint.collection.as_deref()),
        };
        let candidate = response_type_name(&endpoint.name, status);

        let name = match cache.claim(&candidate, shape) {
            Claim::Existing(name) => name,
            Claim::Fresh(name) => {
                let fields = self.build_fields(shape, &scope, cache)?;
                cache.insert(DtoArtifact {
                    type_name: name.clone(),
                    namespace: self.config.response_namespace(&scope.collection_group),
                    collection_group: scope.collection_group.clone(),
                    origin: DtoOrigin::Response {
                        endpoint: endpoint.name.clone(),
                        status,
                    },
                    fields,
                    doc_title: doc_text(shape.title.as_deref()),
                    doc_description: doc_text(
                        shape
                            .description
                            .as_deref()
                            .or(response.description.as_deref()),
                    ),
                });
                name
            }
        };

        Ok(Some(name))
    }

    /// Emits a DTO for a schema declared in the registry.
    ///
    /// The DTO takes the schema's own type name, which the engine reserves
    /// before any inline DTO is named. Non-object schemas are skipped.
    pub fn emit_schema_dto(
        &self,
        name: &str,
        schema: &Schema,
        cache: &mut GenerationCache,
    ) -> Result<Option<String>, GenerationError> {
        let Some(shape) = schema.as_object_with_properties() else {
            debug!(schema = name, "Registry schema is not an object with properties");
            return Ok(None);
        };

        let dto_name = type_name(name);
        let Some(claim) = cache.claim_reserved(&dto_name, shape) else {
            return Err(GenerationError::ValidationError(format!(
                "Schema `{name}` maps to type `{dto_name}`, which another schema already uses"
            )));
        };
        match claim {
            Claim::Existing(existing) => {
                debug!(schema = name, type_name = %existing, "Schema type name already emitted");
                Ok(Some(existing))
            }
            Claim::Fresh(dto_name) => {
                let scope = Scope {
                    site: Site::Schema { name },
                    collection_group: self.collection_group(None),
                };
                let fields = self.build_fields(shape, &scope, cache)?;
                cache.insert(DtoArtifact {
                    type_name: dto_name.clone(),
                    namespace: self.config.dto_namespace(),
                    collection_group: scope.collection_group,
                    origin: DtoOrigin::Schema {
                        name: name.to_string(),
                    },
                    fields,
                    doc_title: doc_text(shape.title.as_deref()),
                    doc_description: doc_text(shape.description.as_deref()),
                });
                Ok(Some(dto_name))
            }
        }
    }

    fn collection_group(&self, collection: Option<&str>) -> String {
        resource_group_name(collection.unwrap_or(&self.config.fallback_resource_name))
    }

    fn check_reference(&self, reference: &Reference, site: Site<'_>) -> Result<(), GenerationError> {
        match self.registry.resolve(reference) {
            Some(_) => Ok(()),
            None => Err(site.unresolved(&reference.target)),
        }
    }

    fn build_fields(
        &self,
        shape: &ObjectShape,
        scope: &Scope<'_>,
        cache: &mut GenerationCache,
    ) -> Result<Vec<DtoField>, GenerationError> {
        let mut fields = Vec::with_capacity(shape.properties.len());
        let mut used: HashSet<String> = HashSet::new();

        for (property, schema) in &shape.properties {
            if property.trim().is_empty() {
                debug!("Skipping property with an empty name");
                continue;
            }

            let ty = self.field_type(property, schema, scope, cache)?;

            let base = variable_name(property);
            let mut normalized = base.clone();
            let mut n = 2;
            while !used.insert(normalized.clone()) {
                normalized = format!("{base}{n}");
                n += 1;
            }
            if normalized != base {
                warn!(
                    property = %property,
                    field = %normalized,
                    "Property name collides with another field after normalization"
                );
            }

            fields.push(DtoField {
                original_name: property.clone(),
                normalized_name: normalized,
                ty,
                nullable: !shape.is_required(property),
            });
        }

        Ok(fields)
    }

    fn field_type(
        &self,
        property: &str,
        schema: &Schema,
        scope: &Scope<'_>,
        cache: &mut GenerationCache,
    ) -> Result<TypeExpr, GenerationError> {
        match schema {
            Schema::Reference(reference) => {
                self.check_reference(reference, scope.site)?;
                Ok(self.resolver.resolve(schema))
            }
            Schema::Object(shape) if shape.has_properties() => {
                let name = self.emit_nested(&type_name(property), property, shape, scope, cache)?;
                Ok(TypeExpr::Named(name))
            }
            Schema::Array(array) => {
                let items = array.items.as_ref();
                match items {
                    Schema::Object(shape) if shape.has_properties() => {
                        let candidate = format!("{}Item", type_name(property));
                        let name = self.emit_nested(&candidate, property, shape, scope, cache)?;
                        Ok(TypeExpr::array_of(TypeExpr::Named(name)))
                    }
                    Schema::Reference(reference) => {
                        self.check_reference(reference, scope.site)?;
                        Ok(TypeExpr::array_of(self.resolver.resolve(items)))
                    }
                    _ => Ok(self.resolver.resolve(schema)),
                }
            }
            other => Ok(self.resolver.resolve(other)),
        }
    }

    fn emit_nested(
        &self,
        candidate: &str,
        property: &str,
        shape: &ObjectShape,
        scope: &Scope<'_>,
        cache: &mut GenerationCache,
    ) -> Result<String, GenerationError> {
        match cache.claim(candidate, shape) {
            Claim::Existing(name) => {
                debug!(type_name = %name, "Reusing nested DTO");
                Ok(name)
            }
            Claim::Fresh(name) => {
                let fields = self.build_fields(shape, scope, cache)?;
                cache.insert(DtoArtifact {
                    type_name: name.clone(),
                    namespace: self.config.dto_namespace(),
                    collection_group: scope.collection_group.clone(),
                    origin: DtoOrigin::Nested {
                        property: property.to_string(),
                    },
                    fields,
                    doc_title: doc_text(shape.title.as_deref()),
                    doc_description: doc_text(shape.description.as_deref()),
                });
                Ok(name)
            }
        }
    }
}
