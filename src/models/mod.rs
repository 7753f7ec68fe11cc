/// Data models for the group layer.
/// Defines jids, metadata snapshots, invites, and history records.

pub mod jid;
pub mod message;
pub mod metadata;

pub use jid::{Jid, GROUP_DOMAIN};
pub use message::{
    new_message_id, GroupEvent, GroupInvite, HistoryRecord, HistoryStub, InviteKey, MessageKey,
    MessageUpdate, UpsertMode,
};
pub use metadata::{
    Community, GroupMetadata, GroupParticipant, GroupSetting, GroupSummary, JoinRequest,
    MemberAddMode, ParticipantAction, ParticipantRole, ParticipantStatus, RequestAction,
    STATUS_OK,
};
