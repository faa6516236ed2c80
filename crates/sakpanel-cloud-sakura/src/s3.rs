//! S3-compatible data plane for object storage sites
//!
//! Authenticated with an object storage access key pair, not the profile
//! token. Path-style addressing is required by the Sakura endpoints.

use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use flate2::read::MultiGzDecoder;
use sakpanel_cloud::view::format_unix;
use sakpanel_cloud::{BackendKind, CloudError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::transport::ensure_scheme;

/// Region name sent in signatures; the endpoints ignore it
const REGION: &str = "jp-north-1";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: String,
    pub storage_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsResult {
    pub objects: Vec<ObjectInfo>,
    /// Common prefixes under the `/` delimiter
    pub prefixes: Vec<String>,
    pub is_truncated: bool,
    /// `""` on the last page
    pub next_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsParams {
    pub prefix: Option<String>,
    pub continuation_token: Option<String>,
    pub max_keys: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPreview {
    pub content: String,
    pub truncated: bool,
    pub total_size: i64,
    pub read_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonlPreview {
    /// Parsed lines; a line that is not JSON is kept as a string
    pub lines: Vec<Value>,
    pub truncated: bool,
    pub total_read: usize,
}

/// Bucket as listed by the site's S3 endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct S3Bucket {
    pub name: String,
    pub creation_date: String,
}

/// S3 client bound to one site endpoint and access key
#[derive(Clone)]
pub struct S3Session {
    client: Client,
    endpoint: String,
}

impl fmt::Debug for S3Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Session")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl S3Session {
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str) -> Self {
        let endpoint = ensure_scheme(endpoint);
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(REGION))
            .endpoint_url(endpoint.clone())
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "sakpanel",
            ))
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(config),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn list_buckets(&self) -> Result<Vec<S3Bucket>> {
        tracing::debug!("[objectStorage] ListBuckets {}", self.endpoint);
        let output = self.client.list_buckets().send().await.map_err(s3_error)?;
        Ok(output
            .buckets()
            .iter()
            .map(|b| S3Bucket {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b
                    .creation_date()
                    .map(|d| format_unix(d.secs()))
                    .unwrap_or_default(),
            })
            .collect())
    }

    /// One page of objects under `prefix`, split at `/`
    pub async fn list_objects(
        &self,
        bucket: &str,
        params: ListObjectsParams,
    ) -> Result<ListObjectsResult> {
        tracing::debug!("[objectStorage] ListObjectsV2 bucket={}", bucket);
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .delimiter("/")
            .set_prefix(params.prefix.filter(|p| !p.is_empty()))
            .set_continuation_token(params.continuation_token.filter(|t| !t.is_empty()))
            .set_max_keys(params.max_keys.filter(|n| *n > 0))
            .send()
            .await
            .map_err(s3_error)?;

        let objects = output
            .contents()
            .iter()
            .map(|o| ObjectInfo {
                key: o.key().unwrap_or_default().to_string(),
                size: o.size().unwrap_or_default(),
                last_modified: o
                    .last_modified()
                    .map(|d| format_unix(d.secs()))
                    .unwrap_or_default(),
                storage_class: o
                    .storage_class()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect();
        let prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        Ok(ListObjectsResult {
            objects,
            prefixes,
            is_truncated: output.is_truncated().unwrap_or_default(),
            next_token: output
                .next_continuation_token()
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Stream an object to `dest`. A partial file is removed on failure.
    pub async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64> {
        tracing::debug!("[objectStorage] GetObject bucket={} -> {}", bucket, dest.display());
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(s3_error)?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut body = output.body;
        let written = async {
            let mut written = 0u64;
            while let Some(chunk) = body.try_next().await.map_err(|e| {
                CloudError::backend(BackendKind::ObjectStorage, None, e.to_string())
            })? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<_, CloudError>(written)
        }
        .await;

        match written {
            Ok(written) => Ok(written),
            Err(e) => {
                drop(file);
                if let Err(remove) = tokio::fs::remove_file(dest).await {
                    tracing::debug!("Removing partial download failed: {}", remove);
                }
                Err(e)
            }
        }
    }

    /// First `max_bytes` of an object as text
    pub async fn preview_text(&self, bucket: &str, key: &str, max_bytes: u64) -> Result<TextPreview> {
        let (bytes, total) = self.read_head(bucket, key, max_bytes).await?;
        let read_size = bytes.len() as i64;
        Ok(TextPreview {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            truncated: total > read_size,
            total_size: total,
            read_size,
        })
    }

    /// Up to `max_lines` JSON lines from a gzip object, reading at most
    /// `max_bytes` of compressed data
    pub async fn preview_gzip_jsonl(
        &self,
        bucket: &str,
        key: &str,
        max_bytes: u64,
        max_lines: usize,
    ) -> Result<JsonlPreview> {
        let (bytes, total) = self.read_head(bucket, key, max_bytes).await?;
        let mut preview = decode_jsonl(&bytes, max_lines)?;
        preview.truncated |= total > bytes.len() as i64;
        Ok(preview)
    }

    /// Ranged read of the object head. Returns the bytes and the full size.
    async fn read_head(&self, bucket: &str, key: &str, max_bytes: u64) -> Result<(Vec<u8>, i64)> {
        tracing::debug!("[objectStorage] GetObject bucket={} range=0-{}", bucket, max_bytes);
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .range(format!("bytes=0-{}", max_bytes.saturating_sub(1)))
            .send()
            .await
            .map_err(s3_error)?;

        let total = output
            .content_range()
            .and_then(range_total)
            .or(output.content_length())
            .unwrap_or_default();
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| CloudError::backend(BackendKind::ObjectStorage, None, e.to_string()))?
            .to_vec();
        Ok((bytes, total))
    }
}

/// Total size from a `Content-Range: bytes 0-99/1234` header
fn range_total(content_range: &str) -> Option<i64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

/// Decode a (possibly cut off) gzip stream line by line.
fn decode_jsonl(compressed: &[u8], max_lines: usize) -> Result<JsonlPreview> {
    let mut reader = BufReader::new(MultiGzDecoder::new(compressed));
    let mut lines = Vec::new();
    let mut truncated = false;
    let mut buf = String::new();

    loop {
        if lines.len() >= max_lines {
            buf.clear();
            truncated = !matches!(reader.read_line(&mut buf), Ok(0));
            break;
        }
        buf.clear();
        match reader.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = buf.trim_end_matches(['\n', '\r']);
                if line.trim().is_empty() {
                    continue;
                }
                lines.push(
                    serde_json::from_str(line).unwrap_or_else(|_| Value::String(line.to_string())),
                );
            }
            // The ranged read cut the stream short
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                truncated = true;
                break;
            }
            Err(e) => {
                return Err(CloudError::backend(
                    BackendKind::ObjectStorage,
                    None,
                    format!("gzip decode failed: {}", e),
                ));
            }
        }
    }

    Ok(JsonlPreview {
        total_read: lines.len(),
        lines,
        truncated,
    })
}

/// Map an SDK failure to a backend error, keeping the HTTP status.
pub(crate) fn s3_error<E>(err: SdkError<E, HttpResponse>) -> CloudError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let message = match err.message() {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => DisplayErrorContext(&err).to_string(),
    };
    CloudError::backend(BackendKind::ObjectStorage, status, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_range_total() {
        assert_eq!(range_total("bytes 0-1023/5000"), Some(5000));
        assert_eq!(range_total("bytes */0"), Some(0));
        assert_eq!(range_total("bytes 0-1/*"), None);
    }

    #[test]
    fn test_decode_jsonl_complete() {
        let data = gzip("{\"a\":1}\n\nnot json\n{\"b\":2}\n");
        let preview = decode_jsonl(&data, 100).unwrap();
        assert_eq!(preview.total_read, 3);
        assert_eq!(preview.lines[0]["a"], 1);
        assert_eq!(preview.lines[1], Value::String("not json".to_string()));
        assert!(!preview.truncated);
    }

    #[test]
    fn test_decode_jsonl_line_limit() {
        let data = gzip("{\"n\":1}\n{\"n\":2}\n{\"n\":3}\n");
        let preview = decode_jsonl(&data, 2).unwrap();
        assert_eq!(preview.total_read, 2);
        assert!(preview.truncated);

        let preview = decode_jsonl(&data, 3).unwrap();
        assert!(!preview.truncated);
    }

    #[test]
    fn test_decode_jsonl_cut_stream() {
        let body: String = (0..200).map(|n| format!("{{\"n\":{}}}\n", n)).collect();
        let data = gzip(&body);
        let cut = &data[..data.len() / 2];
        let preview = decode_jsonl(cut, 1000).unwrap();
        assert!(preview.truncated);
        assert!(preview.total_read < 200);
    }

    #[test]
    fn test_session_debug_hides_keys() {
        let session = S3Session::new("s3.isk01.sakurastorage.jp", "AKID", "very-secret");
        let debug = format!("{:?}", session);
        assert!(debug.contains("https://s3.isk01.sakurastorage.jp"));
        assert!(!debug.contains("very-secret"));
    }
}
