pub mod sakani;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::listing::Listing;

/// The only collaborator that touches network fetch details. An empty
/// snapshot is a normal outcome, distinct from a fetch failure.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Listing>, FetchError>;
}
