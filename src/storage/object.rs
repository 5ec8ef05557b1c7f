//! `object_store` backed blob store (S3, R2, GCS, Azure, local, memory)

use super::store::{BlobReader, BlobStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use tokio_util::io::StreamReader;

/// Options applied when building cloud clients
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// HTTP proxy for cloud requests
    pub proxy_url: Option<String>,
}

/// Blob store parsed from a URL
#[derive(Debug, Clone)]
pub struct ObjectBlobStore {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
    /// Bucket, container or directory, for logging
    location: String,
}

impl ObjectBlobStore {
    /// Wrap an existing object store
    pub fn new(store: Arc<dyn ObjectStore>, scheme: impl Into<String>) -> Self {
        Self {
            store,
            prefix: String::new(),
            scheme: scheme.into(),
            location: String::new(),
        }
    }

    /// Create an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory")
    }

    /// Set the path prefix objects are resolved under
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Parse a store URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `memory://` - In-process memory (testing)
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    ///
    /// Credentials are read from each provider's standard environment
    /// variables (`AWS_*`, `GOOGLE_*`, `AZURE_STORAGE_*`).
    pub fn parse(url: &str, options: &StoreOptions) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, false, options)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true, options)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url, options)
        } else if url.starts_with("az://") {
            Self::parse_azure(url, options)
        } else if url.starts_with("memory://") {
            let prefix = url.trim_start_matches("memory://").trim_matches('/');
            Ok(Self::in_memory().with_prefix(prefix))
        } else {
            Self::parse_local(url)
        }
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool, options: &StoreOptions) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = split_bucket(url, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // R2 endpoint: https://<account_id>.r2.cloudflarestorage.com
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }
        if let Some(proxy) = &options.proxy_url {
            builder = builder.with_proxy_url(proxy);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            location: bucket.to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str, options: &StoreOptions) -> Result<Self> {
        let (bucket, prefix) = split_bucket(url, "gs")?;

        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket);
        if let Some(proxy) = &options.proxy_url {
            builder = builder.with_proxy_url(proxy);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            location: bucket.to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str, options: &StoreOptions) -> Result<Self> {
        let (container, prefix) = split_bucket(url, "az")?;

        let mut builder = MicrosoftAzureBuilder::from_env().with_container_name(container);
        if let Some(proxy) = &options.proxy_url {
            builder = builder.with_proxy_url(proxy);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            location: container.to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        if path.is_empty() {
            return Err(Error::config("Empty local store path"));
        }

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            location: path.to_string(),
        })
    }

    /// Get the scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the path prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve an object name under the prefix
    fn path(&self, name: &str) -> ObjectPath {
        let name = name.trim_start_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(name)
        } else {
            ObjectPath::from(format!("{}/{name}", self.prefix.trim_end_matches('/')))
        }
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn fetch(&self, name: &str) -> Result<BlobReader> {
        let path = self.path(name);
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| fetch_error(name, e))?;

        let stream = result
            .into_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        Ok(Box::new(StreamReader::new(stream)))
    }

    async fn size(&self, name: &str) -> Result<u64> {
        let path = self.path(name);
        let meta = self
            .store
            .head(&path)
            .await
            .map_err(|e| fetch_error(name, e))?;
        Ok(meta.size as u64)
    }

    async fn store(&self, name: &str, data: Bytes) -> Result<()> {
        let path = self.path(name);
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| store_error(name, e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        match (self.location.is_empty(), self.prefix.is_empty()) {
            (true, true) => format!("{}://", self.scheme),
            (true, false) => format!("{}://{}", self.scheme, self.prefix),
            (false, true) => format!("{}://{}", self.scheme, self.location),
            (false, false) => format!("{}://{}/{}", self.scheme, self.location, self.prefix),
        }
    }
}

/// Split `scheme://bucket/prefix` into bucket and prefix
fn split_bucket<'u>(url: &'u str, scheme: &str) -> Result<(&'u str, String)> {
    let without_scheme = url
        .strip_prefix(&format!("{scheme}://"))
        .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {url}")))?;

    let (bucket, prefix) = match without_scheme.find('/') {
        Some(idx) => (
            &without_scheme[..idx],
            without_scheme[idx + 1..].trim_end_matches('/').to_string(),
        ),
        None => (without_scheme, String::new()),
    };

    if bucket.is_empty() {
        return Err(Error::config(format!("Missing bucket in {scheme} URL: {url}")));
    }
    Ok((bucket, prefix))
}

/// Map an object store read failure
fn fetch_error(name: &str, err: object_store::Error) -> Error {
    match err {
        object_store::Error::NotFound { .. } => Error::not_found(name),
        other => Error::fetch(name, other.to_string()),
    }
}

/// Map an object store write failure; permanent refusals are not retryable
fn store_error(name: &str, err: object_store::Error) -> Error {
    match err {
        err @ (object_store::Error::InvalidPath { .. }
        | object_store::Error::NotSupported { .. }
        | object_store::Error::AlreadyExists { .. }
        | object_store::Error::Precondition { .. }) => {
            Error::store_rejected(name, err.to_string())
        }
        other => Error::store(name, other.to_string()),
    }
}
