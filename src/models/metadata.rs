/// Group metadata model. Snapshots are rebuilt from scratch out of every
/// response tree; nothing here is mutated in place or cached by this crate.

use serde::{Deserialize, Serialize};

use super::jid::Jid;

/// Status code reported for a participant the server accepted.
pub const STATUS_OK: &str = "200";

/// Admin standing of one group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Member,
    Admin,
    SuperAdmin,
}

impl ParticipantRole {
    /// Role carried in a participant node's `type` attribute; an absent or
    /// unknown attribute means a plain member.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("admin") => ParticipantRole::Admin,
            Some("superadmin") => ParticipantRole::SuperAdmin,
            _ => ParticipantRole::Member,
        }
    }
}

/// One entry of a group's participant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupParticipant {
    pub jid: Jid,
    pub role: ParticipantRole,
    /// Alternate (privacy-preserving) identifier, when the server announces
    /// one alongside the canonical jid.
    pub alt_jid: Option<Jid>,
}

/// Community facts of a group. Present iff the group node carried a `parent`
/// or `linked_parent` child; a plain group has none of this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    /// The group is itself a community parent.
    pub parent: bool,
    /// Member lists of sibling sub-groups are hidden from each other.
    pub incognito: bool,
    /// Ordinary members may create sub-groups under this community.
    pub allow_non_admin_sub_group_creation: bool,
    /// Approval mode sub-groups inherit. Sourced only from the `parent`
    /// node's attribute; a linked child group does not carry it.
    pub membership_approval_mode: Option<String>,
    /// The community this group is linked under, when it is a sub-group.
    pub linked_parent: Option<Jid>,
    /// This group is the community's default sub-group.
    pub default_sub_group: bool,
}

/// Who may add participants to a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberAddMode {
    #[default]
    AdminAdd,
    AllMemberAdd,
}

impl MemberAddMode {
    pub fn as_wire(&self) -> &'static str {
        match self {
            MemberAddMode::AdminAdd => "admin_add",
            MemberAddMode::AllMemberAdd => "all_member_add",
        }
    }

    pub(crate) fn from_wire(text: Option<&str>) -> Self {
        match text {
            Some("all_member_add") => MemberAddMode::AllMemberAdd,
            _ => MemberAddMode::AdminAdd,
        }
    }
}

/// Normalized snapshot of one group, rebuilt per response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadata {
    /// Canonical, domain-qualified group id.
    pub id: Jid,
    pub subject: String,
    pub subject_owner: Option<Jid>,
    pub subject_time: Option<i64>,
    /// Count of current participants. Always derived from the participant
    /// list, never read from a transmitted attribute.
    pub size: usize,
    pub creation: Option<i64>,
    /// Normalized creator address; absent for some group types.
    pub owner: Option<Jid>,
    pub description: Option<String>,
    /// Version token of the current description, referenced as `prev` by the
    /// next edit.
    pub description_id: Option<String>,
    pub community: Option<Community>,
    pub member_add_mode: MemberAddMode,
    /// Only admins may change group settings.
    pub restrict: bool,
    /// Only admins may send messages.
    pub announce: bool,
    /// Joining requires admin approval.
    pub join_approval_mode: bool,
    pub participants: Vec<GroupParticipant>,
    /// Disappearing-message timer in seconds. `None` means the timer is not
    /// configured at all, which is distinct from an explicit zero.
    pub ephemeral_duration: Option<u64>,
}

/// Lightweight projection of a community sub-group entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub jid: Jid,
    pub subject: String,
    pub subject_time: Option<i64>,
    /// Participant count as announced by the listing. Unlike full metadata
    /// this projection has no participant list to count.
    pub size: Option<usize>,
    pub default_sub_group: bool,
}

/// A pending request to join a group running in join-approval mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub jid: Jid,
    pub method: Option<String>,
    pub requested_at: Option<i64>,
}

/// Membership mutation applied to a batch of participants. Selects both the
/// request tag and how the response is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantAction {
    Add,
    Remove,
    Promote,
    Demote,
}

impl ParticipantAction {
    pub fn tag(&self) -> &'static str {
        match self {
            ParticipantAction::Add => "add",
            ParticipantAction::Remove => "remove",
            ParticipantAction::Promote => "promote",
            ParticipantAction::Demote => "demote",
        }
    }
}

/// Decision applied to a batch of pending join requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestAction {
    Approve,
    Reject,
}

impl RequestAction {
    pub fn tag(&self) -> &'static str {
        match self {
            RequestAction::Approve => "approve",
            RequestAction::Reject => "reject",
        }
    }
}

/// Boolean policy flags a group admin can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupSetting {
    /// Only admins may send messages.
    Announce,
    /// Only admins may change group settings.
    Locked,
}

impl GroupSetting {
    pub fn tag(&self, enabled: bool) -> &'static str {
        match (self, enabled) {
            (GroupSetting::Announce, true) => "announcement",
            (GroupSetting::Announce, false) => "not_announcement",
            (GroupSetting::Locked, true) => "locked",
            (GroupSetting::Locked, false) => "unlocked",
        }
    }
}

/// Per-participant outcome of a membership mutation. A call can succeed
/// overall while individual participants fail; this is a report, not an
/// error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStatus {
    pub jid: Jid,
    /// Server-reported error code, or [`STATUS_OK`] when the participant was
    /// accepted.
    pub status: String,
}

impl ParticipantStatus {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}
