use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use switchyard::active::MemorySettingsStorage;
use switchyard::config::ClientConfig;
use switchyard::{
    ActiveConfiguration, ApiError, CrudFacade, EntityKind, ProviderClientFactory, ProviderKind,
    Record, SettingsField,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory_for(kind: ProviderKind, fields: &[(SettingsField, &str)]) -> ProviderClientFactory {
    factory_with_timeout(kind, fields, 5)
}

fn factory_with_timeout(
    kind: ProviderKind,
    fields: &[(SettingsField, &str)],
    timeout_secs: u64,
) -> ProviderClientFactory {
    let active = Arc::new(ActiveConfiguration::load(Arc::new(MemorySettingsStorage::new())));
    active.set_selected(kind);
    for (field, value) in fields {
        active.set_flat(field, *value).unwrap();
    }
    ProviderClientFactory::new(active, ClientConfig { timeout_secs })
}

fn facade_for(kind: ProviderKind, fields: &[(SettingsField, &str)]) -> CrudFacade {
    factory_for(kind, fields).create_crud_facade(None).unwrap()
}

#[tokio::test]
async fn appwrite_lists_documents_with_project_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/main/collections/orders/documents"))
        .and(header("x-appwrite-project", "proj-1"))
        .and(header("x-appwrite-key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "documents": [{
                "$id": "doc-1",
                "$createdAt": "2024-05-01T10:00:00.000+00:00",
                "$collectionId": "orders",
                "total": 42
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::Appwrite,
        &[
            (SettingsField::Endpoint, uri.as_str()),
            (SettingsField::Identifier, "proj-1"),
            (SettingsField::Credential, "secret-key"),
            (SettingsField::Extra("database_id".to_string()), "main"),
        ],
    );
    let result = facade.get_all(&EntityKind::new("orders")).await;

    assert!(result.is_success());
    let records = result.data();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some("doc-1"));
    assert_eq!(records[0].get("total"), Some(&json!(42)));
    assert!(records[0].get("created_at").is_some());
    assert!(records[0].get("$collectionId").is_none());
}

#[tokio::test]
async fn appwrite_create_sends_native_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/databases/main/collections/customers/documents"))
        .and(body_partial_json(json!({
            "documentId": "unique()",
            "data": { "name": "Ada" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$id": "cust-9",
            "name": "Ada"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::Appwrite,
        &[
            (SettingsField::Endpoint, uri.as_str()),
            (SettingsField::Identifier, "proj-1"),
            (SettingsField::Extra("database_id".to_string()), "main"),
        ],
    );
    let created = facade
        .create(&EntityKind::new("customers"), &Record::new().set("name", "Ada"))
        .await
        .into_result()
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("cust-9"));
    assert_eq!(created.get("name"), Some(&json!("Ada")));
}

#[tokio::test]
async fn supabase_lists_rows_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("select", "*"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "total": 10},
            {"id": 2, "total": 20}
        ])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::Supabase,
        &[
            (SettingsField::Endpoint, uri.as_str()),
            (SettingsField::Credential, "anon-key"),
        ],
    );
    let records = facade
        .get_all(&EntityKind::new("orders"))
        .await
        .into_result()
        .unwrap();

    let ids: Vec<Option<String>> = records.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![Some("1".to_string()), Some("2".to_string())]);
}

#[tokio::test]
async fn supabase_http_errors_become_failed_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid API key"})),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::Supabase,
        &[(SettingsField::Endpoint, uri.as_str())],
    );
    let result = facade.get_all(&EntityKind::new("orders")).await;

    assert!(!result.is_success());
    assert!(result.data().is_empty());
    let message = result.error_message().unwrap();
    assert!(message.contains("Supabase"));
    assert!(message.contains("401"));
    assert!(message.contains("Invalid API key"));
}

#[tokio::test]
async fn supabase_delete_reports_missing_rows() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", "eq.77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::Supabase,
        &[(SettingsField::Endpoint, uri.as_str())],
    );
    let result = facade
        .delete(&EntityKind::new("orders"), &Record::with_id("77"))
        .await;

    assert!(result.is_success());
    assert!(!*result.data());
}

#[tokio::test]
async fn nhost_queries_graphql_with_admin_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(header("x-hasura-admin-secret", "hasura"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "orders": [{"id": 5, "total": 99, "__typename": "orders"}] }
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::NHost,
        &[
            (SettingsField::Endpoint, uri.as_str()),
            (SettingsField::Credential, "hasura"),
        ],
    );
    let entity = EntityKind::new("orders").with_fields(["total"]);
    let records = facade.get_all(&entity).await.into_result().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some("5"));
    assert_eq!(records[0].get("total"), Some(&json!(99)));
    assert!(records[0].get("__typename").is_none());
}

#[tokio::test]
async fn nhost_graphql_errors_fail_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{
                "message": "field 'orders' not found in type: 'query_root'",
                "extensions": {"code": "validation-failed"}
            }]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(
        ProviderKind::NHost,
        &[(SettingsField::Endpoint, uri.as_str())],
    );
    let result = facade
        .get_all(&EntityKind::new("orders").with_fields(["total"]))
        .await;

    let message = result.error_message().unwrap();
    assert!(message.contains("field 'orders' not found"));
    assert!(message.contains("validation-failed"));
}

#[tokio::test]
async fn connection_test_follows_initialize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = facade_for(ProviderKind::Supabase, &[(SettingsField::Endpoint, uri.as_str())]);
    assert!(!facade.test_connection().await);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paths": {}})))
        .mount(&server)
        .await;
    assert!(facade.test_connection().await);
}

#[tokio::test]
async fn slow_provider_times_out_as_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let facade = factory_with_timeout(
        ProviderKind::Supabase,
        &[(SettingsField::Endpoint, uri.as_str())],
        1,
    )
    .create_crud_facade(None)
    .unwrap();
    let result = facade.get_all(&EntityKind::new("orders")).await;

    assert!(!result.is_success());
    assert!(result.data().is_empty());
    let message = result.error_message().unwrap();
    assert!(message.contains("timed out"), "{}", message);
    assert!(message.contains("get_all"), "{}", message);
}

#[test]
fn mysql_has_no_builtin_client() {
    let factory = factory_for(ProviderKind::MySql, &[]);
    assert!(!factory.is_supported(ProviderKind::MySql));
    assert!(matches!(
        factory.create_crud_facade(None),
        Err(ApiError::UnsupportedProvider(ProviderKind::MySql))
    ));
}
