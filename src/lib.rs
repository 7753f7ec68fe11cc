/// Arbor group management library
/// Builds group requests as attributed trees, decodes server responses into
/// metadata snapshots, and drives the invite acceptance flow. Transport and
/// event delivery stay behind traits supplied by the embedding client.

pub mod decode;
pub mod error;
pub mod models;
pub mod node;
pub mod requests;
pub mod services;

pub use error::{GroupError, Result};
pub use models::{
    Community, GroupEvent, GroupInvite, GroupMetadata, GroupParticipant, GroupSetting,
    GroupSummary, HistoryRecord, HistoryStub, InviteKey, Jid, JoinRequest, MemberAddMode,
    MessageKey, MessageUpdate, ParticipantAction, ParticipantRole, ParticipantStatus,
    RequestAction, UpsertMode,
};
pub use node::{Node, NodeContent};
pub use services::{EventSink, GroupService, QueryTransport};
