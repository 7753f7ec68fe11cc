/// Service layer of the group crate.
/// Wires the operation catalog to its transport and event collaborators.

pub mod group_service;
pub mod serial;
pub mod transport;

pub use group_service::GroupService;
pub use serial::SerialQueue;
pub use transport::{EventSink, QueryTransport};
