//! Process metadata port (interface).

use std::collections::HashMap;

use crate::domain::ProcessMetadata;
use crate::error::Result;

/// Port for resolving process names and command lines.
pub trait MetadataSource: Send + Sync {
    /// Resolve many pids with a single query.
    ///
    /// Pids absent from the returned map were not found by the query.
    fn query_batch(
        &self,
        pids: &[u32],
    ) -> impl std::future::Future<Output = Result<HashMap<u32, ProcessMetadata>>> + Send;

    /// Resolve one pid. Used when the batch query fails.
    fn query_one(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<ProcessMetadata>> + Send;
}
