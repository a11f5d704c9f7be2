//! Load an OpenAPI document, generate artifacts and write the manifest

use sdkforge::core::GeneratorConfig;
use sdkforge::generation::{
    Artifact, ArtifactOutput, GenerationEngine, SpecificationLoader, TypeExpr,
};
use sdkforge::infrastructure::{
    ArtifactManifest, CompositeSpecLoader, FileSpecLoader, ManifestFormat, ManifestOutput,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/users.openapi.yaml");

fn json_first() -> GeneratorConfig {
    GeneratorConfig {
        preferred_media_types: vec!["application/json".to_string()],
        ignored_header_params: vec!["Authorization".to_string()],
        ..Default::default()
    }
}

fn names(artifacts: &[Artifact]) -> Vec<&str> {
    artifacts.iter().map(Artifact::type_name).collect()
}

#[tokio::test]
async fn test_fixture_generates_expected_artifacts() {
    let spec = FileSpecLoader::new().load(FIXTURE).await.unwrap();
    assert_eq!(spec.title, "Users API");
    assert_eq!(spec.version, "1.4.0");
    assert_eq!(spec.endpoints.len(), 5);

    let artifacts = GenerationEngine::new(json_first()).generate(&spec).unwrap();

    assert_eq!(
        names(&artifacts),
        vec![
            "ItemsItem",
            "ListUsers200Response",
            "Address",
            "GetUser200Response",
            "HealthCheck200Response",
            "ListUsers",
            "CreateUser",
            "GetUser",
            "DeleteUser",
            "HealthCheck",
        ]
    );
}

#[tokio::test]
async fn test_fixture_dto_details() {
    let spec = FileSpecLoader::new().load(FIXTURE).await.unwrap();
    let artifacts = GenerationEngine::new(json_first()).generate(&spec).unwrap();

    let item = artifacts[0].as_dto().unwrap();
    assert_eq!(item.collection_group, "Users");
    assert_eq!(item.namespace, vec!["App", "Sdk", "Dto"]);
    let display_name = item.field("display-name").unwrap();
    assert_eq!(display_name.normalized_name, "displayName");
    assert!(display_name.nullable);
    assert!(!item.field("id").unwrap().nullable);

    let page = artifacts[1].as_dto().unwrap();
    assert_eq!(page.namespace, vec!["App", "Sdk", "Responses", "Users"]);
    assert_eq!(page.doc_description.as_deref(), Some("A page of users"));
    assert_eq!(
        page.field("items").unwrap().ty,
        TypeExpr::array_of(TypeExpr::named("ItemsItem"))
    );
    assert!(!page.field("items").unwrap().nullable);
    assert_eq!(
        page.field("next_cursor").unwrap().ty,
        TypeExpr::Union(vec![TypeExpr::String, TypeExpr::Null])
    );
    assert_eq!(page.field("next_cursor").unwrap().normalized_name, "nextCursor");
}

#[tokio::test]
async fn test_fixture_request_details() {
    let spec = FileSpecLoader::new().load(FIXTURE).await.unwrap();
    let artifacts = GenerationEngine::new(json_first()).generate(&spec).unwrap();
    let request = |name: &str| {
        artifacts
            .iter()
            .filter_map(Artifact::as_request)
            .find(|r| r.type_name == name)
            .unwrap()
            .clone()
    };

    let list = request("ListUsers");
    assert_eq!(list.namespace, vec!["App", "Sdk", "Requests", "Users"]);
    assert_eq!(list.parameters.query.len(), 2);
    assert_eq!(list.parameters.query[0].variable_name, "pageSize");
    assert_eq!(list.parameters.query[0].default, Some(serde_json::json!(20)));
    assert_eq!(list.parameters.header.len(), 1, "Authorization is ignored");
    assert_eq!(list.dispatch_for(200), Some("ListUsers200Response"));

    let create = request("CreateUser");
    assert!(create.body_capable);
    let body: Vec<_> = create.parameters.body.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(body, vec!["name", "email"]);
    assert!(create.parameters.body[0].required);
    assert_eq!(create.dispatch_for(201), Some("User"));
    assert_eq!(create.dispatch_for(422), Some("Error"));

    let get = request("GetUser");
    assert_eq!(get.path_template, "/users/{id}");
    assert_eq!(get.parameters.path[0].ty, TypeExpr::Integer);
    assert_eq!(get.response_types, vec!["GetUser200Response", "Error"]);

    let delete = request("DeleteUser");
    assert!(delete.response_dispatch.is_empty());

    let health = request("HealthCheck");
    assert_eq!(health.resource_group, "Resource");
    assert_eq!(health.dispatch_for(200), Some("HealthCheck200Response"));
}

#[tokio::test]
async fn test_first_declared_media_type_without_preference() {
    let spec = FileSpecLoader::new().load(FIXTURE).await.unwrap();
    let artifacts = GenerationEngine::default().generate(&spec).unwrap();

    // text/plain is declared first for the health check, so no DTO
    assert!(!names(&artifacts).contains(&"HealthCheck200Response"));
    let health = artifacts
        .iter()
        .filter_map(Artifact::as_request)
        .find(|r| r.type_name == "HealthCheck")
        .unwrap();
    assert!(health.response_dispatch.is_empty());
}

#[tokio::test]
async fn test_schema_dtos_are_emitted_first() {
    let spec = FileSpecLoader::new().load(FIXTURE).await.unwrap();
    let config = GeneratorConfig {
        emit_schema_dtos: true,
        ..json_first()
    };
    let artifacts = GenerationEngine::new(config).generate(&spec).unwrap();

    assert_eq!(&names(&artifacts)[..3], &["User", "Team", "Error"]);
    let user = artifacts[0].as_dto().unwrap();
    assert_eq!(user.doc_title.as_deref(), Some("User"));
    assert_eq!(user.field("team").unwrap().ty, TypeExpr::named("Team"));
    assert!(!user.field("name").unwrap().nullable);
}

#[tokio::test]
async fn test_remote_specification_to_manifest_file() {
    let mock_server = MockServer::start().await;
    let document = std::fs::read_to_string(FIXTURE).expect("Failed to read fixture");

    Mock::given(method("GET"))
        .and(path("/specs/users.yaml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(document)
                .insert_header("content-type", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let loader = CompositeSpecLoader::new().unwrap();
    let url = format!("{}/specs/users.yaml", mock_server.uri());
    let spec = loader.load(&url).await.unwrap();

    let engine = GenerationEngine::new(json_first());
    let artifacts = engine.generate(&spec).unwrap();
    let manifest = ArtifactManifest::new(&spec, engine.config(), artifacts);

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out = temp_dir.path().join("manifest.json");
    ManifestOutput::new(Some(out.clone()), ManifestFormat::Json)
        .write(&manifest)
        .await
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["title"], "Users API");
    assert_eq!(written["types"]["integer"], "int");
    assert_eq!(written["artifacts"].as_array().unwrap().len(), 10);
    assert_eq!(written["artifacts"][0]["artifact"], "dto");
    assert_eq!(written["artifacts"][5]["artifact"], "request");
    assert_eq!(written["artifacts"][5]["http_method"], "GET");
}
