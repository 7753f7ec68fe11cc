/// Request-tree builders for the group namespace.
/// Each builder produces the payload node of one operation; [`iq`] wraps a
/// payload in the addressed envelope the server routes on. Builders are pure
/// and hold no state, so every request shape is testable without a transport.

use crate::models::{GroupSetting, Jid, MemberAddMode, ParticipantAction, RequestAction};
use crate::node::{attrs, Attrs, Node};

/// Namespace all group operations are served under.
pub const GROUP_NAMESPACE: &str = "arbor:g2";

/// Direction of an iq exchange: `get` reads state, `set` mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IqMode {
    Get,
    Set,
}

impl IqMode {
    pub fn as_wire(&self) -> &'static str {
        match self {
            IqMode::Get => "get",
            IqMode::Set => "set",
        }
    }
}

/// Wraps a payload in the iq envelope addressed to `to`. Request ids are not
/// set here; the transport assigns them when it takes ownership of
/// correlation.
pub fn iq(to: &Jid, mode: IqMode, content: Vec<Node>) -> Node {
    Node::with_children(
        "iq",
        attrs(&[
            ("type", mode.as_wire()),
            ("xmlns", GROUP_NAMESPACE),
            ("to", to.as_str()),
        ]),
        content,
    )
}

/// Full metadata fetch, participants included.
pub fn metadata_query() -> Node {
    Node::with_attrs("query", attrs(&[("request", "interactive")]))
}

/// Group creation. `key` is a fresh client-generated token the server uses to
/// deduplicate retries of the same creation.
pub fn create_group(subject: &str, key: &str, participants: &[Jid]) -> Node {
    Node::with_children(
        "create",
        attrs(&[("subject", subject), ("key", key)]),
        participant_nodes(participants),
    )
}

/// Community creation: a group creation carrying the community markers and,
/// optionally, an initial versioned description.
pub fn create_community(subject: &str, key: &str, description: Option<(&str, &str)>) -> Node {
    let mut children = Vec::new();
    if let Some((id, body)) = description {
        children.push(description_set(id, None, body));
    }
    children.push(Node::with_attrs(
        "parent",
        attrs(&[("default_membership_approval_mode", "request_required")]),
    ));
    children.push(Node::new("allow_non_admin_sub_group_creation"));
    children.push(Node::new("create_general_chat"));
    Node::with_children(
        "create",
        attrs(&[("subject", subject), ("key", key)]),
        children,
    )
}

/// Listing of the sub-groups linked under a community.
pub fn sub_groups() -> Node {
    Node::new("sub_groups")
}

/// Community deactivation.
pub fn delete_parent() -> Node {
    Node::new("delete_parent")
}

/// Leaving a group. Addressed to the group server, with the group itself
/// named in the payload rather than the envelope.
pub fn leave_group(group: &Jid) -> Node {
    Node::with_children(
        "leave",
        Attrs::new(),
        vec![Node::with_attrs("group", attrs(&[("id", group.as_str())]))],
    )
}

/// Subject rename. The subject travels as byte content, not an attribute.
pub fn subject_update(subject: &str) -> Node {
    Node::with_bytes("subject", Attrs::new(), subject.as_bytes())
}

/// Membership mutation over a batch of participants. The action picks the
/// payload tag; participants are one child each, in caller order.
pub fn participants_update(action: ParticipantAction, participants: &[Jid]) -> Node {
    Node::with_children(action.tag(), Attrs::new(), participant_nodes(participants))
}

/// Description replacement. `id` versions the new text; `prev` names the
/// version being replaced and is omitted when the group had none.
pub fn description_set(id: &str, prev: Option<&str>, body: &str) -> Node {
    let mut a = attrs(&[("id", id)]);
    if let Some(prev) = prev {
        a.insert("prev".to_string(), prev.to_string());
    }
    Node::with_children(
        "description",
        a,
        vec![Node::with_bytes("body", Attrs::new(), body.as_bytes())],
    )
}

/// Description removal, flagged on the same tag instead of a separate verb.
pub fn description_delete(prev: Option<&str>) -> Node {
    let mut a = attrs(&[("delete", "true")]);
    if let Some(prev) = prev {
        a.insert("prev".to_string(), prev.to_string());
    }
    Node::with_attrs("description", a)
}

/// Shared invite code: `get` reads the current code, `set` revokes it and
/// mints a replacement.
pub fn invite() -> Node {
    Node::new("invite")
}

/// Code-bearing invite payload: `get` previews the group behind a code,
/// `set` joins it.
pub fn invite_with_code(code: &str) -> Node {
    Node::with_attrs("invite", attrs(&[("code", code)]))
}

/// Acceptance of an invite that arrived over chat, echoing the invite's
/// code and expiry back with the inviting admin.
pub fn accept_invite(code: &str, expiration: i64, admin: &Jid) -> Node {
    Node::with_attrs(
        "accept",
        attrs(&[
            ("code", code),
            ("expiration", &expiration.to_string()),
            ("admin", admin.as_str()),
        ]),
    )
}

/// Withdrawal of a personal invitation previously sent to `invitee`.
pub fn revoke_direct_invite(invitee: &Jid) -> Node {
    Node::with_children(
        "revoke",
        Attrs::new(),
        vec![Node::with_attrs(
            "participant",
            attrs(&[("jid", invitee.as_str())]),
        )],
    )
}

/// Disappearing-message toggle. A positive duration arms the timer; zero
/// disarms it with the dedicated negative tag.
pub fn ephemeral_toggle(expiration: u64) -> Node {
    if expiration > 0 {
        Node::with_attrs(
            "ephemeral",
            attrs(&[("expiration", &expiration.to_string())]),
        )
    } else {
        Node::new("not_ephemeral")
    }
}

/// Policy flag update. Flag and polarity collapse into a single bare tag.
pub fn setting_update(setting: GroupSetting, enabled: bool) -> Node {
    Node::new(setting.tag(enabled))
}

/// Member-add mode update; the mode travels as byte content.
pub fn member_add_mode(mode: MemberAddMode) -> Node {
    Node::with_bytes("member_add_mode", Attrs::new(), mode.as_wire().as_bytes())
}

/// Join-approval mode update.
pub fn join_approval_mode(enabled: bool) -> Node {
    let state = if enabled { "on" } else { "off" };
    Node::with_children(
        "membership_approval_mode",
        Attrs::new(),
        vec![Node::with_attrs("group_join", attrs(&[("state", state)]))],
    )
}

/// Listing of pending join requests.
pub fn membership_requests() -> Node {
    Node::new("membership_approval_requests")
}

/// Resolution of pending join requests: the decision tag nests the affected
/// participants.
pub fn membership_requests_action(action: RequestAction, participants: &[Jid]) -> Node {
    Node::with_children(
        "membership_requests_action",
        Attrs::new(),
        vec![Node::with_children(
            action.tag(),
            Attrs::new(),
            participant_nodes(participants),
        )],
    )
}

/// Bulk listing of every group the caller participates in, with participant
/// lists and descriptions included.
pub fn participating() -> Node {
    Node::with_children(
        "participating",
        Attrs::new(),
        vec![Node::new("participants"), Node::new("description")],
    )
}

fn participant_nodes(participants: &[Jid]) -> Vec<Node> {
    participants
        .iter()
        .map(|jid| Node::with_attrs("participant", attrs(&[("jid", jid.as_str())])))
        .collect()
}
