/// Structural decoding of response trees into the metadata model.
/// Decoders tolerate what the protocol marks optional and fail with
/// [`GroupError::Decode`] on structure a success response guarantees.

use crate::error::{GroupError, Result};
use crate::models::{
    Community, GroupMetadata, GroupParticipant, GroupSummary, Jid, JoinRequest, MemberAddMode,
    ParticipantRole, ParticipantStatus, STATUS_OK,
};
use crate::node::Node;

/// Boolean policy flags travel as bare tags; the child's existence is the
/// value and its content is ignored.
fn presence(node: &Node, tag: &str) -> bool {
    node.child(tag).is_some()
}

/// Decodes the `group` child of a response envelope into a metadata
/// snapshot.
pub fn extract_group_metadata(response: &Node) -> Result<GroupMetadata> {
    let group = response
        .child("group")
        .ok_or_else(|| GroupError::decode("response has no group node"))?;
    group_node_metadata(group)
}

/// Decodes one `group` node. Bulk listings call this per entry; single-group
/// responses go through [`extract_group_metadata`].
pub fn group_node_metadata(group: &Node) -> Result<GroupMetadata> {
    let id = group
        .attr("id")
        .ok_or_else(|| GroupError::decode("group node missing id"))?;

    let participants = group
        .children("participant")
        .into_iter()
        .map(decode_participant)
        .collect::<Result<Vec<_>>>()?;

    let description_node = group.child("description");

    Ok(GroupMetadata {
        id: Jid::group(id),
        subject: group.attr("subject").unwrap_or_default().to_string(),
        subject_owner: group.attr("s_o").map(Jid::new),
        subject_time: group.attr("s_t").and_then(|v| v.parse().ok()),
        // The count is derived, never trusted from an attribute.
        size: participants.len(),
        creation: group.attr("creation").and_then(|v| v.parse().ok()),
        owner: group.attr("creator").map(|v| Jid::new(v).normalized()),
        description: description_node.and_then(|n| n.child_text("body")),
        description_id: description_node
            .and_then(|n| n.attr("id"))
            .map(str::to_string),
        community: decode_community(group),
        member_add_mode: MemberAddMode::from_wire(
            group.child_text("member_add_mode").as_deref(),
        ),
        restrict: presence(group, "locked"),
        announce: presence(group, "announcement"),
        join_approval_mode: presence(group, "membership_approval_mode"),
        participants,
        ephemeral_duration: decode_ephemeral(group)?,
    })
}

fn decode_participant(node: &Node) -> Result<GroupParticipant> {
    let jid = node
        .attr("jid")
        .ok_or_else(|| GroupError::decode("participant node missing jid"))?;
    Ok(GroupParticipant {
        jid: Jid::new(jid),
        role: ParticipantRole::from_attr(node.attr("type")),
        alt_jid: node.attr("lid").map(Jid::new),
    })
}

/// Community facts exist only when the group node carries a `parent` or
/// `linked_parent` child; any other flags alone do not make a community.
fn decode_community(group: &Node) -> Option<Community> {
    let parent = group.child("parent");
    let linked_parent = group.child("linked_parent");
    if parent.is_none() && linked_parent.is_none() {
        return None;
    }
    Some(Community {
        parent: parent.is_some(),
        incognito: presence(group, "incognito"),
        allow_non_admin_sub_group_creation: presence(
            group,
            "allow_non_admin_sub_group_creation",
        ),
        // Inherited approval mode is announced only on the parent node
        // itself; a linked child never carries it.
        membership_approval_mode: parent
            .and_then(|n| n.attr("default_membership_approval_mode"))
            .map(str::to_string),
        linked_parent: linked_parent
            .and_then(|n| n.attr("jid"))
            .map(Jid::group),
        default_sub_group: presence(group, "default_sub_group"),
    })
}

/// An absent `ephemeral` child means no timer is configured, which callers
/// must be able to tell apart from a timer explicitly set to zero.
fn decode_ephemeral(group: &Node) -> Result<Option<u64>> {
    match group.child("ephemeral") {
        None => Ok(None),
        Some(node) => {
            let raw = node
                .attr("expiration")
                .ok_or_else(|| GroupError::decode("ephemeral node missing expiration"))?;
            let seconds = raw
                .parse()
                .map_err(|_| GroupError::decode("ephemeral expiration is not a number"))?;
            Ok(Some(seconds))
        }
    }
}

/// Per-participant outcomes of a membership mutation. The container being
/// absent or a participant lacking a jid yields fewer entries rather than an
/// error; partial failure is data here, not a fault.
pub fn participant_statuses(container: Option<&Node>) -> Vec<ParticipantStatus> {
    match container {
        None => Vec::new(),
        Some(node) => node
            .children("participant")
            .into_iter()
            .filter_map(|p| {
                let jid = p.attr("jid")?;
                Some(ParticipantStatus {
                    jid: Jid::new(jid),
                    status: p.attr("error").unwrap_or(STATUS_OK).to_string(),
                })
            })
            .collect(),
    }
}

/// Reads the shared invite code out of an invite read or revoke response.
pub fn invite_code(response: &Node) -> Result<String> {
    response
        .child("invite")
        .and_then(|n| n.attr("code"))
        .map(str::to_string)
        .ok_or_else(|| GroupError::decode("response has no invite code"))
}

/// Decodes a community's sub-group listing.
pub fn sub_group_summaries(response: &Node) -> Result<Vec<GroupSummary>> {
    let listing = response
        .child("sub_groups")
        .ok_or_else(|| GroupError::decode("response has no sub_groups node"))?;
    listing
        .children("group")
        .into_iter()
        .map(|node| {
            let id = node
                .attr("id")
                .ok_or_else(|| GroupError::decode("sub-group entry missing id"))?;
            Ok(GroupSummary {
                jid: Jid::group(id),
                subject: node.attr("subject").unwrap_or_default().to_string(),
                subject_time: node.attr("s_t").and_then(|v| v.parse().ok()),
                size: node.attr("size").and_then(|v| v.parse().ok()),
                default_sub_group: presence(node, "default_sub_group"),
            })
        })
        .collect()
}

/// Decodes the pending join requests of a group in join-approval mode.
pub fn join_requests(response: &Node) -> Result<Vec<JoinRequest>> {
    let listing = response
        .child("membership_approval_requests")
        .ok_or_else(|| GroupError::decode("response has no membership_approval_requests node"))?;
    listing
        .children("membership_approval_request")
        .into_iter()
        .map(|node| {
            let jid = node
                .attr("jid")
                .ok_or_else(|| GroupError::decode("join request missing jid"))?;
            Ok(JoinRequest {
                jid: Jid::new(jid),
                method: node.attr("request_method").map(str::to_string),
                requested_at: node.attr("request_time").and_then(|v| v.parse().ok()),
            })
        })
        .collect()
}

/// Reads the joined group's jid out of a code-acceptance response.
pub fn joined_group(response: &Node) -> Result<Jid> {
    let group = response
        .child("group")
        .ok_or_else(|| GroupError::decode("acceptance response has no group node"))?;
    let jid = group
        .attr("jid")
        .ok_or_else(|| GroupError::decode("group node missing jid"))?;
    Ok(Jid::group(jid))
}

/// Decodes the bulk membership listing. Entries that fail to decode are
/// skipped with a warning so one malformed group cannot hide the rest.
pub fn participating_groups(response: &Node) -> Result<Vec<GroupMetadata>> {
    let groups = response
        .child("groups")
        .ok_or_else(|| GroupError::decode("response has no groups node"))?;
    let mut out = Vec::new();
    for node in groups.children("group") {
        match group_node_metadata(node) {
            Ok(metadata) => out.push(metadata),
            Err(err) => log::warn!("skipping undecodable group entry: {}", err),
        }
    }
    Ok(out)
}
