//! Blob store abstraction

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

/// Streaming body of a fetched object
pub type BlobReader = Box<dyn AsyncRead + Send + Unpin>;

/// Named, opaque byte objects held outside the process
///
/// Implementations are shared between runs without locking; callers must not
/// assume exclusive access to an object name.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Open an object for streaming reads
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) for a missing object.
    async fn fetch(&self, name: &str) -> Result<BlobReader>;

    /// Size of an object in bytes
    async fn size(&self, name: &str) -> Result<u64>;

    /// Write an object, replacing any previous version
    async fn store(&self, name: &str, data: Bytes) -> Result<()>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}
