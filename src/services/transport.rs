/// Collaborator seams of the group service.
/// Both traits are object-safe so the service can hold them as trait objects
/// and tests can substitute instrumented fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GroupEvent, HistoryRecord, UpsertMode};
use crate::node::Node;

/// Request/response exchange over the established connection.
///
/// Implementations own everything connection-shaped: assigning the request
/// id, matching the asynchronously delivered response tree back to its
/// request, and turning error-shaped responses into
/// [`GroupError::Protocol`](crate::GroupError::Protocol) before the tree
/// reaches this crate. A tree handed back from `query` is therefore always a
/// success response.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Sends one request tree and resolves with its matched response.
    async fn query(&self, request: Node) -> Result<Node>;
}

/// Local event fan-out and chat-history writes.
///
/// Called for side effects an operation produces beyond its return value:
/// patched messages, synthesized history records, refreshed metadata
/// snapshots.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Inserts or replaces a record in local chat history.
    async fn upsert_record(&self, record: HistoryRecord, mode: UpsertMode) -> Result<()>;

    /// Publishes an event to the application.
    async fn emit(&self, event: GroupEvent) -> Result<()>;
}
