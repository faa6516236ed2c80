//! Container registry image browser (Docker Registry HTTP API v2)
//!
//! Registries answer either to basic auth directly or with a bearer token
//! challenge. Without a user name and password the registry is read
//! anonymously.

use crate::transport::{Auth, HttpBackend, ensure_scheme, join_url};
use reqwest::header::{ACCEPT, LINK, WWW_AUTHENTICATE};
use reqwest::{Method, RequestBuilder, StatusCode};
use sakpanel_cloud::view::de;
use sakpanel_cloud::{BackendKind, CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;

const CATALOG_PAGE_SIZE: u32 = 100;
/// Upper bound on catalog pages followed
const MAX_CATALOG_PAGES: u32 = 100;

const MANIFEST_TYPES: &str = "application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.oci.image.manifest.v1+json, \
     application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.index.v1+json";

const DIGEST_HEADER: &str = "Docker-Content-Digest";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryImage {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryTag {
    pub name: String,
    /// Layers plus config; 0 when the manifest could not be read
    pub size: i64,
    pub digest: String,
}

#[derive(Clone)]
struct Login {
    username: String,
    password: String,
}

/// Registry handle for one FQDN
pub struct RegistryClient {
    http: HttpBackend,
    base: String,
    login: Option<Login>,
    token: Mutex<Option<String>>,
}

impl fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryClient")
            .field("base", &self.base)
            .field("user", &self.login.as_ref().map(|l| l.username.as_str()))
            .finish_non_exhaustive()
    }
}

impl RegistryClient {
    /// Anonymous unless both `username` and `password` are non-empty.
    pub fn new(http: reqwest::Client, fqdn: &str, username: &str, password: &str) -> Self {
        let login = (!username.is_empty() && !password.is_empty()).then(|| Login {
            username: username.to_string(),
            password: password.to_string(),
        });
        Self {
            http: HttpBackend::new(http, BackendKind::Registry, Auth::Anonymous),
            base: join_url(&ensure_scheme(fqdn), "v2"),
            login,
            token: Mutex::new(None),
        }
    }

    /// Repository names from `/v2/_catalog`, following `Link` pagination
    pub async fn images(&self) -> Result<Vec<RegistryImage>> {
        let mut url = format!("{}/_catalog?n={}", self.base, CATALOG_PAGE_SIZE);
        let mut images = Vec::new();

        for _ in 0..MAX_CATALOG_PAGES {
            let (status, headers, body) = self.get(&url, None).await?;
            if !status.is_success() {
                return Err(self.http.status_error(status, &body));
            }
            let catalog: ApiCatalog = self.http.decode(status, &body)?;
            images.extend(
                catalog
                    .repositories
                    .into_iter()
                    .map(|name| RegistryImage { name }),
            );

            match headers
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_link)
            {
                Some(next) => url = self.resolve(&next),
                None => break,
            }
        }
        Ok(images)
    }

    /// Tags of one image with their manifest digest and size
    pub async fn tags(&self, image: &str) -> Result<Vec<RegistryTag>> {
        let image = repository_arg(image)?;
        let url = format!("{}/{}/tags/list", self.base, image);
        let (status, _, body) = self.get(&url, None).await?;
        if !status.is_success() {
            return Err(self.http.status_error(status, &body));
        }
        let list: ApiTagList = self.http.decode(status, &body)?;

        let mut tags = Vec::with_capacity(list.tags.len());
        for name in list.tags {
            match self.manifest(image, &name).await {
                Ok((size, digest)) => tags.push(RegistryTag { name, size, digest }),
                Err(e) => {
                    tracing::debug!("Manifest for {}:{} unavailable: {}", image, name, e);
                    tags.push(RegistryTag {
                        name,
                        size: 0,
                        digest: String::new(),
                    });
                }
            }
        }
        Ok(tags)
    }

    async fn manifest(&self, image: &str, tag: &str) -> Result<(i64, String)> {
        let url = format!("{}/{}/manifests/{}", self.base, image, tag);
        let (status, headers, body) = self.get(&url, Some(MANIFEST_TYPES)).await?;
        if !status.is_success() {
            return Err(self.http.status_error(status, &body));
        }
        let digest = headers
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let manifest: ApiManifest = self.http.decode(status, &body)?;
        Ok((manifest.size(body.len()), digest))
    }

    /// GET with the current credentials, answering one bearer challenge.
    async fn get(
        &self,
        url: &str,
        accept: Option<&str>,
    ) -> Result<(StatusCode, reqwest::header::HeaderMap, Vec<u8>)> {
        let cached = self.token.lock().await.clone();
        let response = self.send(url, accept, cached.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return self.read(response).await;
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(BearerChallenge::parse);
        let Some(challenge) = challenge else {
            return self.read(response).await;
        };

        let token = self.fetch_token(&challenge).await?;
        *self.token.lock().await = Some(token.clone());
        let response = self.send(url, accept, Some(&token)).await?;
        self.read(response).await
    }

    async fn send(
        &self,
        url: &str,
        accept: Option<&str>,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut request = self.authorize(self.http.request(Method::GET, url), token);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        request.send().await.map_err(|e| self.http.transport_error(e))
    }

    async fn read(
        &self,
        response: reqwest::Response,
    ) -> Result<(StatusCode, reqwest::header::HeaderMap, Vec<u8>)> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.http.transport_error(e))?;
        tracing::debug!("[registry] status={}", status.as_u16());
        Ok((status, headers, body.to_vec()))
    }

    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match (token, &self.login) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(login)) => request.basic_auth(&login.username, Some(&login.password)),
            (None, None) => request,
        }
    }

    async fn fetch_token(&self, challenge: &BearerChallenge) -> Result<String> {
        let mut query = Vec::new();
        if let Some(service) = &challenge.service {
            query.push(("service", service.as_str()));
        }
        if let Some(scope) = &challenge.scope {
            query.push(("scope", scope.as_str()));
        }
        let request = self
            .authorize(self.http.request(Method::GET, &challenge.realm), None)
            .query(&query);
        let token: ApiToken = self.http.json(request).await?;
        token
            .token
            .or(token.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CloudError::backend(
                    BackendKind::Registry,
                    None,
                    "token endpoint returned no token",
                )
            })
    }

    /// `Link` targets are usually relative to the registry host.
    fn resolve(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            return link.to_string();
        }
        let host = self.base.trim_end_matches("/v2");
        join_url(host, link)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BearerChallenge {
    realm: String,
    service: Option<String>,
    scope: Option<String>,
}

impl BearerChallenge {
    /// Parse `Bearer realm="...",service="...",scope="..."`.
    fn parse(header: &str) -> Option<Self> {
        let (scheme, params) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let mut values: HashMap<String, String> = HashMap::new();
        let mut rest = params.trim();
        while !rest.is_empty() {
            let (key, after) = rest.split_once('=')?;
            let key = key.trim().trim_start_matches(',').trim().to_ascii_lowercase();
            let after = after.trim_start();
            let (value, remaining) = match after.strip_prefix('"') {
                Some(quoted) => {
                    let end = quoted.find('"')?;
                    (&quoted[..end], &quoted[end + 1..])
                }
                None => match after.find(',') {
                    Some(end) => (&after[..end], &after[end..]),
                    None => (after, ""),
                },
            };
            values.insert(key, value.to_string());
            rest = remaining.trim_start().trim_start_matches(',').trim_start();
        }

        Some(Self {
            realm: values.remove("realm")?,
            service: values.remove("service"),
            scope: values.remove("scope"),
        })
    }
}

/// Target of `Link: </v2/_catalog?last=x&n=100>; rel="next"`
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        params
            .contains("rel=\"next\"")
            .then(|| target.trim().trim_start_matches('<').trim_end_matches('>').to_string())
    })
}

/// Repository names may be nested (`team/app`) but never escape the path.
fn repository_arg(image: &str) -> Result<&str> {
    let image = image.trim().trim_matches('/');
    if image.is_empty()
        || image.contains(['?', '#', ':', '@'])
        || image.split('/').any(|s| s.is_empty() || s == "." || s == "..")
    {
        return Err(CloudError::invalid_id("image name", image));
    }
    Ok(image)
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiCatalog {
    #[serde(default, deserialize_with = "de::null_default")]
    repositories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTagList {
    #[serde(default, deserialize_with = "de::null_default")]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiToken {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiManifest {
    #[serde(default)]
    config: Option<ApiDescriptor>,
    #[serde(default, deserialize_with = "de::null_default")]
    layers: Vec<ApiDescriptor>,
    /// Present on manifest lists and OCI indexes
    #[serde(default)]
    manifests: Option<Vec<ApiDescriptor>>,
}

#[derive(Debug, Deserialize)]
struct ApiDescriptor {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    size: i64,
}

impl ApiManifest {
    /// Image size; an index has no single image, so its own length is used.
    fn size(&self, raw_len: usize) -> i64 {
        if self.manifests.is_some() {
            return raw_len as i64;
        }
        let layers: i64 = self.layers.iter().map(|l| l.size).sum();
        layers + self.config.as_ref().map(|c| c.size).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_challenge() {
        let challenge = BearerChallenge::parse(
            r#"Bearer realm="https://auth.example.com/token",service="registry.example.com",scope="repository:app:pull""#,
        )
        .unwrap();
        assert_eq!(challenge.realm, "https://auth.example.com/token");
        assert_eq!(challenge.service.as_deref(), Some("registry.example.com"));
        assert_eq!(challenge.scope.as_deref(), Some("repository:app:pull"));

        assert!(BearerChallenge::parse(r#"Basic realm="registry""#).is_none());
        assert!(BearerChallenge::parse(r#"Bearer service="x""#).is_none());
    }

    #[test]
    fn test_next_link() {
        assert_eq!(
            next_link(r#"</v2/_catalog?last=b&n=100>; rel="next""#).as_deref(),
            Some("/v2/_catalog?last=b&n=100")
        );
        assert_eq!(next_link(r#"</v2/_catalog>; rel="prev""#), None);
    }

    #[test]
    fn test_manifest_size() {
        let manifest: ApiManifest = serde_json::from_str(
            r#"{"config":{"size":1000},"layers":[{"size":2000},{"size":3000}]}"#,
        )
        .unwrap();
        assert_eq!(manifest.size(0), 6000);

        let index: ApiManifest =
            serde_json::from_str(r#"{"manifests":[{"size":500}]}"#).unwrap();
        assert_eq!(index.size(321), 321);
    }

    #[test]
    fn test_repository_arg() {
        assert_eq!(repository_arg("team/app").unwrap(), "team/app");
        assert!(repository_arg("../etc").is_err());
        assert!(repository_arg("app:latest").is_err());
        assert!(repository_arg("").is_err());
    }

    #[test]
    fn test_login_requires_both_parts() {
        let client = RegistryClient::new(reqwest::Client::new(), "r.example.com", "user", "");
        assert!(client.login.is_none());
        assert_eq!(client.base, "https://r.example.com/v2");
        let client = RegistryClient::new(reqwest::Client::new(), "r.example.com", "user", "hunter2");
        assert!(client.login.is_some());
        assert!(!format!("{:?}", client).contains("hunter2"));
    }
}
