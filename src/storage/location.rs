//! Storage location backed by `object_store`

use crate::config::Credentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;

/// A resolved storage location: an object store and the key prefix inside it
#[derive(Debug, Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme (s3, r2, gs, az, file)
    scheme: String,
    /// Location as given, without trailing slash
    url: String,
    /// Filesystem root for local locations
    local_root: Option<PathBuf>,
}

impl StorageLocation {
    /// Open a location for writing; local directories are created if missing
    pub fn for_output(url: &str, credentials: &Credentials) -> Result<Self> {
        Self::parse(url, credentials, true)
    }

    /// Open a location for reading; a local directory must already exist
    pub fn for_input(url: &str, credentials: &Credentials) -> Result<Self> {
        Self::parse(url, credentials, false)
    }

    fn parse(url: &str, credentials: &Credentials, create: bool) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, false, credentials)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true, credentials)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url)
        } else if url.starts_with("az://") {
            Self::parse_azure(url)
        } else {
            Self::parse_local(url, create)
        }
    }

    /// Split `scheme://bucket/prefix` into bucket and prefix
    fn split_bucket<'a>(url: &'a str, scheme: &str) -> Result<(&'a str, String)> {
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
            return Err(Error::config(format!("Missing bucket name in URL: {url}")));
        }
        Ok((bucket, prefix))
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool, credentials: &Credentials) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = Self::split_bucket(url, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        if let Some(key) = &credentials.aws_access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &credentials.aws_secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(region) = &credentials.aws_region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &credentials.endpoint {
            builder = builder.with_endpoint(endpoint);
        } else if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            url: url.trim_end_matches('/').to_string(),
            local_root: None,
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let (bucket, prefix) = Self::split_bucket(url, "gs")?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            url: url.trim_end_matches('/').to_string(),
            local_root: None,
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let (container, prefix) = Self::split_bucket(url, "az")?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            url: url.trim_end_matches('/').to_string(),
            local_root: None,
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        if path.is_empty() {
            return Err(Error::config("Empty local path"));
        }

        if create {
            std::fs::create_dir_all(path)
                .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;
        } else if !std::path::Path::new(path).is_dir() {
            return Err(Error::FileNotFound {
                path: path.to_string(),
            });
        }

        let root = std::fs::canonicalize(path)?;
        let store = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            url: path.trim_end_matches('/').to_string(),
            local_root: Some(root),
        })
    }

    /// Check if this is a cloud location (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The location as given
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Human-readable location of a key under this location
    pub fn display_path(&self, relative: &str) -> String {
        if relative.is_empty() {
            self.url.clone()
        } else {
            format!("{}/{}", self.url, relative.trim_start_matches('/'))
        }
    }

    fn object_path(&self, relative: &str) -> ObjectPath {
        let relative = relative.trim_matches('/');
        match (self.prefix.is_empty(), relative.is_empty()) {
            (true, _) => ObjectPath::from(relative),
            (false, true) => ObjectPath::from(self.prefix.as_str()),
            (false, false) => ObjectPath::from(format!("{}/{relative}", self.prefix)),
        }
    }

    /// Strip this location's prefix from a full object key
    fn relative_key(&self, location: &ObjectPath) -> String {
        let key = location.as_ref();
        if self.prefix.is_empty() {
            return key.to_string();
        }
        key.strip_prefix(self.prefix.as_str())
            .map_or(key, |rest| rest.trim_start_matches('/'))
            .to_string()
    }

    /// List every object under `relative_prefix`, as sorted relative keys
    pub async fn list(&self, relative_prefix: &str) -> Result<Vec<String>> {
        if let Some(root) = &self.local_root {
            if !root.join(relative_prefix.trim_matches('/')).exists() {
                return Ok(Vec::new());
            }
        }

        let prefix = self.object_path(relative_prefix);
        let listing = if prefix.as_ref().is_empty() {
            self.store.list(None)
        } else {
            self.store.list(Some(&prefix))
        };

        let metas: Vec<_> = listing.try_collect().await?;
        let mut keys: Vec<String> = metas
            .iter()
            .map(|meta| self.relative_key(&meta.location))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Read an object fully into memory
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        let path = self.object_path(relative);
        let result = self.store.get(&path).await?;
        Ok(result.bytes().await?)
    }

    /// Write bytes to an object, replacing it if present
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(relative);
        self.store.put(&path, data.into()).await?;
        Ok(self.display_path(relative))
    }

    /// Remove every object under `relative_prefix`; returns the number removed
    pub async fn delete_prefix(&self, relative_prefix: &str) -> Result<usize> {
        let keys = self.list(relative_prefix).await?;
        for key in &keys {
            self.store.delete(&self.object_path(key)).await?;
        }

        // The local store leaves empty partition directories behind
        if let Some(root) = &self.local_root {
            let dir = root.join(relative_prefix.trim_matches('/'));
            if !relative_prefix.trim_matches('/').is_empty() && dir.is_dir() {
                tokio::fs::remove_dir_all(&dir).await?;
            }
        }

        Ok(keys.len())
    }
}
