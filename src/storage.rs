use async_trait::async_trait;
use aws_sdk_s3 as s3;
use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    error::StorageError,
    models::{BlobListing, BlobMetadata, BlobObject},
};

// 1. StorageService Contract
/// StorageService
///
/// Contract for the object store holding course assets. The real S3 client
/// (`S3StorageClient`) and the in-memory mock (`MockStorageService`) both implement it,
/// so blob handlers never know which one they talk to.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup to provision
    /// the MinIO bucket.
    async fn ensure_bucket_exists(&self);

    /// Lists blobs whose key starts with `prefix`.
    ///
    /// `limit` and `cursor` are handed to the store untouched; the returned `cursor` is
    /// the continuation token of the next page.
    async fn list_blobs(
        &self,
        prefix: Option<&str>,
        limit: Option<i32>,
        cursor: Option<&str>,
    ) -> Result<BlobListing, StorageError>;

    /// Fetches the metadata of the blob addressed by its public URL.
    async fn head_blob(&self, url: &str) -> Result<BlobMetadata, StorageError>;
}

// 2. The Real Implementation (S3/MinIO/Supabase)
/// S3StorageClient
///
/// AWS SDK client talking to any S3-compatible gateway:
/// - **Local:** Dockerized MinIO instance.
/// - **Production:** Supabase Storage S3 endpoint.
///
/// `force_path_style(true)` is required by both gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    // `{endpoint}/{bucket}`: prefix of every public blob URL handed out.
    public_base: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Constructs the S3 client using credentials and configuration from AppConfig.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            bucket_name: bucket.to_string(),
            public_base: format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// ensure_bucket_exists
    ///
    /// CreateBucket is idempotent for our purposes: an "already owned" answer is ignored.
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!("create_bucket skipped: {:?}", e);
        }
    }

    async fn list_blobs(
        &self,
        prefix: Option<&str>,
        limit: Option<i32>,
        cursor: Option<&str>,
    ) -> Result<BlobListing, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .set_prefix(prefix.map(str::to_string))
            .set_max_keys(limit)
            .set_continuation_token(cursor.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_bucket() {
                    StorageError::NotFound(service_error.to_string())
                } else {
                    StorageError::Unavailable(service_error.to_string())
                }
            })?;

        let blobs = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(BlobObject {
                    url: self.public_url(key),
                    pathname: key.to_string(),
                    size: object.size().unwrap_or(0),
                    uploaded_at: object.last_modified().and_then(to_chrono),
                })
            })
            .collect();

        Ok(BlobListing {
            blobs,
            has_more: output.is_truncated().unwrap_or(false),
            cursor: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn head_blob(&self, url: &str) -> Result<BlobMetadata, StorageError> {
        let key = object_key_from_url(url, &self.bucket_name)?;

        let output = self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    StorageError::NotFound(format!("Blob not found: {}", url))
                } else {
                    StorageError::Unavailable(service_error.to_string())
                }
            })?;

        Ok(BlobMetadata {
            url: self.public_url(&key),
            pathname: key,
            size: output.content_length().unwrap_or(0),
            content_type: output.content_type().map(str::to_string),
            content_disposition: output.content_disposition().map(str::to_string),
            cache_control: output.cache_control().map(str::to_string),
            uploaded_at: output.last_modified().and_then(to_chrono),
        })
    }
}

fn to_chrono(value: &s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(value.secs(), value.subsec_nanos())
}

/// object_key_from_url
///
/// Resolves the object key from a public blob URL. The key is everything after the
/// bucket segment of the path, which covers both `{endpoint}/{bucket}/{key}` and the
/// Supabase form `/storage/v1/object/public/{bucket}/{key}`. Percent-encoded
/// segments are kept as-is.
pub fn object_key_from_url(raw: &str, bucket: &str) -> Result<String, StorageError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| StorageError::InvalidUrl(format!("Invalid blob URL '{}': {}", raw, e)))?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();

    let key = segments
        .iter()
        .position(|segment| *segment == bucket)
        .map(|idx| segments[idx + 1..].join("/"))
        .filter(|key| !key.is_empty())
        .ok_or_else(|| StorageError::NotFound(format!("Blob not found: {}", raw)))?;

    Ok(key)
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// In-memory `StorageService` for handler tests. Listing pages through `blobs` (sorted by
/// pathname) and uses the index of the next entry as its cursor. Clones share one call
/// counter, so a test can keep a clone and inspect it after handing the mock to the app.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    pub blobs: Vec<BlobMetadata>,
    calls: Arc<AtomicUsize>,
}

pub const MOCK_STORAGE_FAILURE: &str = "Mock Storage Error: Simulation requested";
const MOCK_DEFAULT_PAGE: usize = 1000;

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_blobs(mut blobs: Vec<BlobMetadata>) -> Self {
        blobs.sort_by(|a, b| a.pathname.cmp(&b.pathname));
        Self {
            blobs,
            ..Self::default()
        }
    }

    /// Number of `list_blobs` and `head_blob` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {
        // No-op in mock environment.
    }

    async fn list_blobs(
        &self,
        prefix: Option<&str>,
        limit: Option<i32>,
        cursor: Option<&str>,
    ) -> Result<BlobListing, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(StorageError::Unavailable(MOCK_STORAGE_FAILURE.to_string()));
        }

        let matching: Vec<&BlobMetadata> = self
            .blobs
            .iter()
            .filter(|b| prefix.is_none_or(|p| b.pathname.starts_with(p)))
            .collect();

        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let page = limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(MOCK_DEFAULT_PAGE);
        let end = start.saturating_add(page).min(matching.len());
        // An empty page ends the listing instead of handing back the same cursor.
        let has_more = page > 0 && end < matching.len();

        let blobs = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|b| BlobObject {
                url: b.url.clone(),
                pathname: b.pathname.clone(),
                size: b.size,
                uploaded_at: b.uploaded_at,
            })
            .collect();

        Ok(BlobListing {
            blobs,
            has_more,
            cursor: has_more.then(|| end.to_string()),
        })
    }

    async fn head_blob(&self, url: &str) -> Result<BlobMetadata, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(StorageError::Unavailable(MOCK_STORAGE_FAILURE.to_string()));
        }

        self.blobs
            .iter()
            .find(|b| b.url == url)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("Blob not found: {}", url)))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
