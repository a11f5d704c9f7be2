//! Generation orchestration - runs the emitters across a specification

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::core::GeneratorConfig;
use crate::generation::cache::GenerationCache;
use crate::generation::dto::DtoEmitter;
use crate::generation::request::RequestEmitter;
use crate::generation::utils::type_name;
use crate::generation::{Artifact, GenerationError, Specification};

/// Turns a [`Specification`] into artifacts
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    config: GeneratorConfig,
}

impl GenerationEngine {
    /// Create a new generation engine
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Execute one generation pass.
    ///
    /// Returns every DTO in emission order (nested DTOs before the DTO that
    /// uses them) followed by one request per endpoint in endpoint order. The
    /// dedup cache lives only for this call, so repeated calls on the same
    /// input return identical artifacts.
    pub fn generate(&self, spec: &Specification) -> Result<Vec<Artifact>, GenerationError> {
        tracing::debug!(
            endpoints = spec.endpoints.len(),
            schemas = spec.schemas.len(),
            "Engine starting generation"
        );

        let mut cache = GenerationCache::new();
        let dto_emitter = DtoEmitter::new(&self.config, &spec.schemas);
        let request_emitter = RequestEmitter::new(&self.config, &spec.schemas);

        // 1. Registry names belong to the registry schemas
        let mut owners: HashMap<String, &str> = HashMap::new();
        for (name, _) in spec.schemas.iter() {
            let reserved = type_name(name);
            if !cache.reserve(reserved.clone()) {
                let owner = owners.get(&reserved).copied().unwrap_or_default();
                return Err(GenerationError::ValidationError(format!(
                    "Schemas `{owner}` and `{name}` both map to type `{reserved}`"
                )));
            }
            owners.insert(reserved, name.as_str());
        }

        // 2. Registry schema DTOs
        if self.config.emit_schema_dtos {
            for (name, schema) in spec.schemas.iter() {
                dto_emitter.emit_schema_dto(name, schema, &mut cache)?;
            }
        }

        // 3. Response DTOs, then the request, per endpoint
        let mut requests = Vec::with_capacity(spec.endpoints.len());
        for endpoint in &spec.endpoints {
            let mut response_dtos: IndexMap<u16, String> = IndexMap::new();
            for (&status, response) in &endpoint.response {
                if let Some(name) =
                    dto_emitter.emit_response_dto(endpoint, status, response, &mut cache)?
                {
                    response_dtos.insert(status, name);
                }
            }
            requests.push(request_emitter.emit_request(endpoint, &response_dtos, &mut cache)?);
        }

        let dtos = cache.into_dtos();
        tracing::info!(
            title = %spec.title,
            dtos = dtos.len(),
            requests = requests.len(),
            "Generation complete"
        );

        Ok(dtos
            .into_iter()
            .map(Artifact::Dto)
            .chain(requests.into_iter().map(Artifact::Request))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Endpoint, HttpMethod, ResponseSpec, Schema, SchemaKind};
    use tracing_test::traced_test;

    fn user_schema() -> Schema {
        Schema::object([
            ("id", Schema::primitive(SchemaKind::Integer)),
            ("name", Schema::primitive(SchemaKind::String)),
        ])
    }

    #[test]
    fn test_empty_specification() {
        let artifacts = GenerationEngine::default()
            .generate(&Specification::default())
            .unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_dtos_precede_requests() {
        let spec = Specification {
            title: "Users".to_string(),
            endpoints: vec![
                Endpoint::new("GetUser", HttpMethod::Get)
                    .with_path("/users/:id")
                    .with_response(200, ResponseSpec::json(user_schema())),
                Endpoint::new("ListUsers", HttpMethod::Get)
                    .with_path("/users")
                    .with_response(200, ResponseSpec::json(user_schema())),
            ],
            ..Default::default()
        };

        let artifacts = GenerationEngine::default().generate(&spec).unwrap();
        let names: Vec<_> = artifacts.iter().map(Artifact::type_name).collect();
        assert_eq!(
            names,
            vec!["GetUser200Response", "ListUsers200Response", "GetUser", "ListUsers"]
        );
    }

    #[test]
    fn test_registry_names_are_reserved() {
        let spec = Specification {
            endpoints: vec![Endpoint::new("GetOrder", HttpMethod::Get).with_response(
                200,
                ResponseSpec::json(Schema::object([(
                    "customer",
                    Schema::object([("email", Schema::primitive(SchemaKind::String))]),
                )])),
            )],
            schemas: [("Customer", user_schema())].into_iter().collect(),
            ..Default::default()
        };

        let artifacts = GenerationEngine::default().generate(&spec).unwrap();
        let order = artifacts[1].as_dto().unwrap();
        assert_eq!(artifacts[0].type_name(), "Customer2");
        assert_eq!(order.field("customer").unwrap().ty.to_string(), "Customer2");
    }

    #[test]
    fn test_schema_dtos_come_first() {
        let config = GeneratorConfig {
            emit_schema_dtos: true,
            ..Default::default()
        };
        let spec = Specification {
            endpoints: vec![
                Endpoint::new("GetUser", HttpMethod::Get)
                    .with_response(200, ResponseSpec::json(Schema::reference("User"))),
            ],
            schemas: [
                ("User", user_schema()),
                ("Status", Schema::primitive(SchemaKind::String)),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        let artifacts = GenerationEngine::new(config).generate(&spec).unwrap();
        assert_eq!(artifacts.len(), 2);

        let user = artifacts[0].as_dto().unwrap();
        assert_eq!(user.type_name, "User");
        assert_eq!(user.namespace, vec!["App", "Sdk", "Dto"]);

        let request = artifacts[1].as_request().unwrap();
        assert_eq!(request.dispatch_for(200), Some("User"));
    }

    #[test]
    fn test_colliding_registry_names_fail() {
        let spec = Specification {
            title: "Users".to_string(),
            schemas: [
                ("user", Schema::object([("id", Schema::primitive(SchemaKind::Integer))])),
                ("User", Schema::object([("email", Schema::primitive(SchemaKind::String))])),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        for emit_schema_dtos in [false, true] {
            let engine = GenerationEngine::new(GeneratorConfig {
                emit_schema_dtos,
                ..Default::default()
            });
            match engine.generate(&spec).unwrap_err() {
                GenerationError::ValidationError(msg) => {
                    assert!(msg.contains("`user`"));
                    assert!(msg.contains("`User`"));
                }
                other => panic!("Expected ValidationError, got {other:?}"),
            }
        }
    }

    #[test]
    #[traced_test]
    fn test_logs_summary() {
        let spec = Specification {
            title: "Pets".to_string(),
            endpoints: vec![Endpoint::new("Ping", HttpMethod::Get).with_path("/ping")],
            ..Default::default()
        };

        GenerationEngine::default().generate(&spec).unwrap();
        assert!(logs_contain("Generation complete"));
    }
}
