/// Message-adjacent models: keys addressing individual messages, group
/// invites, and the synthetic history records emitted while accepting an
/// invite delivered over chat.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jid::Jid;
use super::metadata::GroupMetadata;

/// Stable address of one message inside one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageKey {
    pub chat: Jid,
    pub id: String,
    pub from_me: bool,
    /// Author inside a group chat; absent in one-to-one chats.
    pub participant: Option<Jid>,
}

/// Invite to a group, as carried inside a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInvite {
    pub group: Jid,
    pub code: String,
    pub expiration: i64,
    pub group_name: Option<String>,
}

/// Where an invite came from. Acceptance needs the inviter's address either
/// way; only a full message key lets us also rewrite the originating message
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InviteKey {
    /// Only the inviting participant is known.
    Sender(Jid),
    /// The full key of the chat message that carried the invite.
    Message(MessageKey),
}

impl InviteKey {
    /// The inviting admin. For a message key that is the author when one is
    /// recorded, otherwise the chat itself (in a direct chat the counterpart
    /// is the inviter).
    pub fn sender(&self) -> &Jid {
        match self {
            InviteKey::Sender(jid) => jid,
            InviteKey::Message(key) => key.participant.as_ref().unwrap_or(&key.chat),
        }
    }

    pub fn message_key(&self) -> Option<&MessageKey> {
        match self {
            InviteKey::Sender(_) => None,
            InviteKey::Message(key) => Some(key),
        }
    }
}

/// Kind of system notice a synthetic history record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryStub {
    GroupCreate,
    SubjectChange,
    ParticipantAdd,
    ParticipantRemove,
    ParticipantPromote,
    ParticipantDemote,
}

/// How an upserted record enters local history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertMode {
    /// Silently appended, as during history sync.
    Append,
    /// Surfaced to the user like a freshly received message.
    Notify,
}

/// Synthetic chat-history entry describing a group event, e.g. "alice was
/// added". Carries no body; renderers derive the text from the stub kind and
/// its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub key: MessageKey,
    pub stub: HistoryStub,
    /// Subjects of the notice, e.g. the participants that were added.
    pub stub_params: Vec<Jid>,
    /// Actor the notice is attributed to.
    pub participant: Option<Jid>,
    pub timestamp: i64,
}

/// Patch to an already stored message, keyed by its address. Only the invite
/// payload is rewritable today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub key: MessageKey,
    pub invite: GroupInvite,
}

/// Local event fanned out to the application alongside the return value of
/// an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupEvent {
    /// In-place edits to stored messages.
    MessagesUpdate(Vec<MessageUpdate>),
    /// Fresh metadata snapshots for known groups.
    GroupsUpdate(Vec<GroupMetadata>),
}

/// Generates an id for a locally created message record.
pub fn new_message_id() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}
