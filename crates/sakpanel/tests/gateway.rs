//! Gateway operations against a mock Sakura Cloud

use sakpanel::cloud::CloudError;
use sakpanel::config::ProfileStore;
use sakpanel::sakura::Endpoints;
use sakpanel::{Gateway, MemoryStore, SecretString, Vault};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_profile(root: &Path, name: &str, config: serde_json::Value) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.json"), config.to_string()).unwrap();
}

/// Profiles: `tokyo` (zone tk1b), `nozone` (no zone), `broken` (corrupt)
fn gateway(server: &MockServer) -> (TempDir, Gateway) {
    let dir = tempfile::tempdir().unwrap();
    write_profile(
        dir.path(),
        "tokyo",
        json!({"AccessToken": "token", "AccessTokenSecret": "secret", "Zone": "tk1b"}),
    );
    write_profile(
        dir.path(),
        "nozone",
        json!({"AccessToken": "token", "AccessTokenSecret": "secret"}),
    );
    let broken = dir.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("config.json"), "{not json").unwrap();

    let gateway = Gateway::new(
        ProfileStore::new(dir.path()),
        Endpoints::for_host(&server.uri()),
        Vault::new(Arc::new(MemoryStore::new())),
    )
    .unwrap();
    (dir, gateway)
}

async fn mount_metrics_storage(server: &MockServer, keys: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/cloud/api/monitoring/1.0/metrics/storages/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "app-metrics",
            "description": "",
            "endpoints": {"address": server.uri()}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cloud/api/monitoring/1.0/metrics/storages/42/keys/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": keys,
            "next": null
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_metrics_without_access_key_skips_prometheus() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    mount_metrics_storage(&server, json!([])).await;
    Mock::given(path_regex("^/prometheus/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway.metric_labels("tokyo", "42").await.unwrap_err();
    assert!(matches!(err, CloudError::NoAccessKey { ref storage_id } if storage_id == "42"));
    assert_eq!(err.payload().kind, "noAccessKey");
}

#[tokio::test]
async fn test_metrics_query_uses_first_access_key() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    mount_metrics_storage(
        &server,
        json!([
            {"id": 1, "uid": "k1", "token": "first-token", "description": ""},
            {"id": 2, "uid": "k2", "token": "second-token", "description": ""}
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/prometheus/api/v1/label/__name__/values"))
        .and(header("authorization", "Bearer first-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": ["up", "node_load1"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let labels = gateway.metric_labels("tokyo", "42").await.unwrap();
    let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["up", "node_load1"]);
}

#[tokio::test]
async fn test_zoned_list_uses_profile_zone() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .and(path("/cloud/zone/tk1b/api/cloud/1.1/server"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Servers": []})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway.list_servers("tokyo", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_zoned_list_explicit_zone_wins() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .and(path("/cloud/zone/is1b/api/cloud/1.1/server"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Servers": null})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway.list_servers("tokyo", Some("is1b")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_zoned_list_falls_back_to_is1a() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .and(path("/cloud/zone/is1a/api/cloud/1.1/disk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Disks": []})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway.list_disks("nozone", None).await.unwrap().is_empty());
    assert_eq!(gateway.default_zone("nozone"), "is1a");
    assert_eq!(gateway.default_zone("tokyo"), "tk1b");
}

#[tokio::test]
async fn test_profile_errors_before_any_request() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway.list_dns("missing").await.unwrap_err();
    assert!(matches!(err, CloudError::ProfileNotFound(ref name) if name == "missing"));

    let err = gateway.list_kms_keys("broken").await.unwrap_err();
    assert!(matches!(err, CloudError::ProfileCorrupt { ref name, .. } if name == "broken"));
}

#[tokio::test]
async fn test_buckets_need_saved_secret() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway
        .list_buckets("tokyo", "isk01", "AKID")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "secretNotFound");
}

#[tokio::test]
async fn test_secret_round_trip() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);

    assert!(!gateway.has_object_storage_secret("isk01", "AKID").await);
    gateway
        .save_object_storage_secret("isk01", "AKID", SecretString::new("s3"))
        .await
        .unwrap();
    assert!(gateway.has_object_storage_secret("isk01", "AKID").await);
    assert!(!gateway.has_registry_password("isk01", "AKID").await);

    gateway
        .delete_object_storage_secret("isk01", "AKID")
        .await
        .unwrap();
    assert!(!gateway.has_object_storage_secret("isk01", "AKID").await);
}

#[tokio::test]
async fn test_registry_uses_saved_password() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .and(path("/v2/_catalog"))
        .and(header("authorization", "Basic Y2k6cHc="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repositories": ["app"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    gateway
        .save_registry_password("113600000001", "ci", SecretString::new("pw"))
        .await
        .unwrap();
    let images = gateway
        .registry_images("tokyo", "113600000001", &server.uri(), Some("ci"))
        .await
        .unwrap();
    assert_eq!(images[0].name, "app");
}

#[tokio::test]
async fn test_registry_without_password_is_anonymous() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .and(path("/v2/_catalog"))
        .and(header("authorization", "Basic Y2k6cHc="))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/_catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repositories": ["public"]
        })))
        .mount(&server)
        .await;

    let images = gateway
        .registry_images("tokyo", "113600000001", &server.uri(), Some("ci"))
        .await
        .unwrap();
    assert_eq!(images[0].name, "public");
}

#[tokio::test]
async fn test_global_family_ignores_zone() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .and(path("/cloud/zone/is1a/api/cloud/1.1/auth-status"))
        .and(header("authorization", "Basic dG9rZW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AccountID": 111111111111u64,
            "AccountName": "example",
            "MemberCode": "abc12345"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // tokyo's default zone is tk1b, but auth-status is global
    let info = gateway.auth_info("tokyo").await.unwrap();
    assert_eq!(info.account_id, "111111111111");
    assert_eq!(info.member_code, "abc12345");
}

#[tokio::test]
async fn test_bills_with_explicit_account_skip_auth_status() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(path("/cloud/zone/is1a/api/cloud/1.1/auth-status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cloud/zone/is1a/api/system/1.0/bill/by-contract/222222222222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Bills": [{"BillID": 9001, "Amount": 1200, "Date": "2026-09-01T00:00:00+09:00"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bills = gateway
        .list_bills("tokyo", Some("222222222222"))
        .await
        .unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].id, "9001");
    assert_eq!(bills[0].amount, 1200);
}

#[tokio::test]
async fn test_malformed_zone_makes_no_request() {
    let server = MockServer::start().await;
    let (_dir, gateway) = gateway(&server);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway.list_servers("tokyo", Some("../x")).await.unwrap_err();
    assert!(matches!(err, CloudError::InvalidIdentifier { what: "zone", .. }));
}
