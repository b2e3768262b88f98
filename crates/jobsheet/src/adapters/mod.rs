mod multi_site;
mod remote_api;

pub use multi_site::MultiSiteAdapter;
pub use remote_api::{
    REMOTIVE_COLUMNS, REMOTIVE_SOURCE, RemoteApiAdapter, RemoteApiError, parse_remote_jobs,
};

use crate::types::{SearchQuery, SourceFetch};

use async_trait::async_trait;

/// One external job source.
///
/// `fetch` never fails: a source that cannot be reached yields an empty
/// batch with the reason recorded in [`SourceFetch::failures`].
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, query: &SearchQuery) -> SourceFetch;
}
