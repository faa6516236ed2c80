//! Backend clients against a mock upstream

use sakpanel_cloud::{BackendKind, CloudError, ResourceFamily};
use sakpanel_cloud_sakura::prometheus::QueryRangeParams;
use sakpanel_cloud_sakura::{
    AppRunClient, AppRunSharedClient, Credentials, Endpoints, IaasClient, ListParams,
    MonitoringClient, PrometheusClient, RegistryClient,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn creds() -> Credentials {
    Credentials::new("token", "secret")
}

#[tokio::test]
async fn test_apprun_shared_non_200_is_backend_error() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/api/apprun/1.0/apprun/api/applications"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "maintenance"})))
        .mount(&server)
        .await;

    let client = AppRunSharedClient::new(reqwest::Client::new(), endpoints.apprun_shared, &creds());
    let err = client.applications().await.unwrap_err();
    match err {
        CloudError::Backend {
            kind,
            status,
            message,
        } => {
            assert_eq!(kind, BackendKind::AppRunShared);
            assert_eq!(status, Some(503));
            assert_eq!(message, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_apprun_shared_requires_200() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/api/apprun/1.0/apprun/api/applications/app-1/versions"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = AppRunSharedClient::new(reqwest::Client::new(), endpoints.apprun_shared, &creds());
    let err = client.versions("app-1").await.unwrap_err();
    assert_eq!(err.status(), Some(204));
}

#[tokio::test]
async fn test_apprun_shared_empty_body_is_empty_list() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/api/apprun/1.0/apprun/api/applications"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = AppRunSharedClient::new(reqwest::Client::new(), endpoints.apprun_shared, &creds());
    assert!(client.applications().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_apprun_shared_has_user() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/api/apprun/1.0/apprun/api/user"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cloud/api/apprun/1.0/apprun/api/user"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = AppRunSharedClient::new(reqwest::Client::new(), endpoints.apprun_shared, &creds());
    assert!(!client.has_user().await.unwrap());
    assert_eq!(client.has_user().await.unwrap_err().status(), Some(500));
}

#[tokio::test]
async fn test_iaas_read_404_is_not_found() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/zone/tk1b/api/cloud/1.1/server/113600000001"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "is_fatal": true,
            "error_code": "not_found",
            "error_msg": "対象が見つかりません"
        })))
        .mount(&server)
        .await;

    let client = IaasClient::new(reqwest::Client::new(), &endpoints, &creds());
    let err = client.servers().get("tk1b", "113600000001").await.unwrap_err();
    assert!(matches!(
        err,
        CloudError::NotFound { family: ResourceFamily::Server, ref id } if id == "113600000001"
    ));
}

#[tokio::test]
async fn test_iaas_invalid_id_makes_no_request() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = IaasClient::new(reqwest::Client::new(), &endpoints, &creds());
    let err = client.switches().get("is1a", "../../auth-status").await.unwrap_err();
    assert_eq!(err.kind(), "invalidIdentifier");
}

#[tokio::test]
async fn test_iaas_global_resources_use_is1a() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/zone/is1a/api/cloud/1.1/commonserviceitem"))
        .and(header("authorization", "Basic dG9rZW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "CommonServiceItems": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = IaasClient::new(reqwest::Client::new(), &endpoints, &creds());
    assert!(client.common_service_items().list_dns().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_apprun_clusters_clamp_page_size() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/api/apprun-dedicated/1.0/clusters"))
        .and(query_param("maxItems", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clusters": [{"clusterID": "0d3f4a4e-5a0b-4a4b-9c5e-8f1f8f8f8f8f", "name": "main"}],
            "nextCursor": "abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AppRunClient::new(reqwest::Client::new(), endpoints.apprun_dedicated, &creds());
    let page = client
        .clusters(ListParams {
            max_items: Some(1),
            cursor: None,
        })
        .await
        .unwrap();
    assert_eq!(page.items[0].name, "main");
    assert!(page.truncated);
    assert_eq!(page.next_cursor.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_apprun_malformed_uuid_fails_before_request() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = AppRunClient::new(reqwest::Client::new(), endpoints.apprun_dedicated, &creds());
    let err = client.version("not-a-uuid", 1).await.unwrap_err();
    assert!(matches!(err, CloudError::InvalidIdentifier { what: "application ID", .. }));
}

#[tokio::test]
async fn test_monitoring_follows_pages() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    let base = "/cloud/api/monitoring/1.0/metrics/storages/42/keys/";
    Mock::given(method("GET"))
        .and(path(base))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 2, "uid": "k2", "token": "t2", "description": ""}],
            "next": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(base))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "uid": "k1", "token": "t1", "description": "first"}],
            "next": "page=2"
        })))
        .mount(&server)
        .await;

    let client = MonitoringClient::new(reqwest::Client::new(), endpoints.monitoring, &creds());
    let keys = client.metrics_access_keys("42").await.unwrap();
    let ids: Vec<_> = keys.iter().map(|k| k.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn test_monitoring_stops_at_page_limit() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::for_host(&server.uri());
    Mock::given(method("GET"))
        .and(path("/cloud/api/monitoring/1.0/metrics/storages/42/keys/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "uid": "k1", "token": "t1", "description": ""}],
            "next": "page=next"
        })))
        .expect(50)
        .mount(&server)
        .await;

    let client = MonitoringClient::new(reqwest::Client::new(), endpoints.monitoring, &creds());
    let keys = client.metrics_access_keys("42").await.unwrap();
    assert_eq!(keys.len(), 50);
}

#[tokio::test]
async fn test_prometheus_non_success_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prometheus/api/v1/query_range"))
        .and(query_param("query", "up{job=\"node\"}"))
        .and(query_param("step", "15s"))
        .and(header("authorization", "Bearer metrics-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "errorType": "bad_data",
            "error": "invalid parameter"
        })))
        .mount(&server)
        .await;

    let client = PrometheusClient::new(reqwest::Client::new(), &server.uri(), "metrics-token");
    let err = client
        .query_range(&QueryRangeParams {
            query: "up{job=\"node\"}".to_string(),
            start: 1_700_000_000,
            end: 1_700_003_600,
            step: "15s".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(200));
    assert!(matches!(err, CloudError::Backend { kind: BackendKind::Monitoring, .. }));
}

#[tokio::test]
async fn test_registry_bearer_challenge() {
    let server = MockServer::start().await;
    let challenge = format!(
        r#"Bearer realm="{}/token",service="registry",scope="registry:catalog:*""#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/v2/_catalog"))
        .and(header("authorization", "Bearer registry-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repositories": ["app", "team/api"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/_catalog"))
        .respond_with(ResponseTemplate::new(401).insert_header("WWW-Authenticate", challenge.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("service", "registry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "registry-token"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::new(reqwest::Client::new(), &server.uri(), "user", "password");
    let images = client.images().await.unwrap();
    let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["app", "team/api"]);
}

#[tokio::test]
async fn test_registry_tag_without_manifest_has_zero_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/app/tags/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "app",
            "tags": ["v1", "broken"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/app/manifests/v1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Docker-Content-Digest", "sha256:abc")
                .set_body_json(json!({
                    "schemaVersion": 2,
                    "config": {"size": 100},
                    "layers": [{"size": 1000}, {"size": 2000}]
                })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/app/manifests/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = RegistryClient::new(reqwest::Client::new(), &server.uri(), "", "");
    let tags = client.tags("app").await.unwrap();
    assert_eq!(tags[0].size, 3100);
    assert_eq!(tags[0].digest, "sha256:abc");
    assert_eq!(tags[1].size, 0);
    assert_eq!(tags[1].digest, "");
}
