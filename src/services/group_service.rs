/// Group service: the operation catalog over the query transport.
/// Builds request trees, dispatches them, decodes the responses, and runs
/// the one stateful flow (invite acceptance) with ordered local side
/// effects. The service itself keeps no group state; every snapshot comes
/// from a response tree.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::decode;
use crate::error::Result;
use crate::models::{
    new_message_id, GroupEvent, GroupInvite, GroupMetadata, GroupSetting, GroupSummary,
    HistoryRecord, HistoryStub, InviteKey, Jid, JoinRequest, MemberAddMode, MessageKey,
    MessageUpdate, ParticipantAction, ParticipantStatus, RequestAction, UpsertMode,
};
use crate::node::Node;
use crate::requests::{self, IqMode};
use crate::services::{EventSink, QueryTransport, SerialQueue};

#[derive(Clone)]
pub struct GroupService {
    transport: Arc<dyn QueryTransport>,
    events: Arc<dyn EventSink>,
    /// Local identity, recorded as the added member in synthesized join
    /// notices.
    me: Jid,
    accept_queue: SerialQueue,
}

impl GroupService {
    /// Must be called inside a tokio runtime; the acceptance queue starts
    /// its consumer task here.
    pub fn new(transport: Arc<dyn QueryTransport>, events: Arc<dyn EventSink>, me: Jid) -> Self {
        GroupService {
            transport,
            events,
            me,
            accept_queue: SerialQueue::new(),
        }
    }

    /// Wraps a payload in the iq envelope and exchanges it.
    async fn group_query(&self, to: &Jid, mode: IqMode, content: Vec<Node>) -> Result<Node> {
        let payload_tag = content
            .first()
            .map(|node| node.tag.clone())
            .unwrap_or_default();
        log::debug!("sending {} '{}' to {}", mode.as_wire(), payload_tag, to);
        self.transport.query(requests::iq(to, mode, content)).await
    }

    /// Fetch the full metadata snapshot of a group.
    pub async fn fetch_metadata(&self, group: &Jid) -> Result<GroupMetadata> {
        let response = self
            .group_query(group, IqMode::Get, vec![requests::metadata_query()])
            .await?;
        decode::extract_group_metadata(&response)
    }

    /// Create a group with the given initial participants.
    pub async fn create_group(
        &self,
        subject: &str,
        participants: &[Jid],
    ) -> Result<GroupMetadata> {
        let key = new_message_id();
        let response = self
            .group_query(
                &Jid::group_server(),
                IqMode::Set,
                vec![requests::create_group(subject, &key, participants)],
            )
            .await?;
        decode::extract_group_metadata(&response)
    }

    /// Create a community, optionally with an initial description.
    pub async fn create_community(
        &self,
        subject: &str,
        description: Option<&str>,
    ) -> Result<GroupMetadata> {
        let key = new_message_id();
        let description = description.map(|body| (new_message_id(), body));
        let response = self
            .group_query(
                &Jid::group_server(),
                IqMode::Set,
                vec![requests::create_community(
                    subject,
                    &key,
                    description.as_ref().map(|(id, body)| (id.as_str(), *body)),
                )],
            )
            .await?;
        decode::extract_group_metadata(&response)
    }

    /// List the sub-groups linked under a community.
    pub async fn list_sub_groups(&self, community: &Jid) -> Result<Vec<GroupSummary>> {
        let response = self
            .group_query(community, IqMode::Get, vec![requests::sub_groups()])
            .await?;
        decode::sub_group_summaries(&response)
    }

    /// Deactivate a community.
    pub async fn deactivate_community(&self, community: &Jid) -> Result<()> {
        self.group_query(community, IqMode::Set, vec![requests::delete_parent()])
            .await?;
        Ok(())
    }

    /// Leave a group. The request goes to the group server, with the group
    /// named in the payload.
    pub async fn leave_group(&self, group: &Jid) -> Result<()> {
        self.group_query(
            &Jid::group_server(),
            IqMode::Set,
            vec![requests::leave_group(group)],
        )
        .await?;
        Ok(())
    }

    /// Rename a group.
    pub async fn update_subject(&self, group: &Jid, subject: &str) -> Result<()> {
        self.group_query(group, IqMode::Set, vec![requests::subject_update(subject)])
            .await?;
        Ok(())
    }

    /// Add, remove, promote, or demote a batch of participants. Returns the
    /// per-participant outcomes; individual rejections are entries here, not
    /// errors.
    pub async fn update_participants(
        &self,
        group: &Jid,
        action: ParticipantAction,
        participants: &[Jid],
    ) -> Result<Vec<ParticipantStatus>> {
        let response = self
            .group_query(
                group,
                IqMode::Set,
                vec![requests::participants_update(action, participants)],
            )
            .await?;
        Ok(decode::participant_statuses(response.child(action.tag())))
    }

    /// Replace the group description, or delete it by passing `None`. The
    /// current version token is fetched first so the edit chains onto it.
    pub async fn update_description(&self, group: &Jid, description: Option<&str>) -> Result<()> {
        let prev = self.fetch_metadata(group).await?.description_id;
        let payload = match description {
            Some(body) => requests::description_set(&new_message_id(), prev.as_deref(), body),
            None => requests::description_delete(prev.as_deref()),
        };
        self.group_query(group, IqMode::Set, vec![payload]).await?;
        Ok(())
    }

    /// Read the group's current shared invite code.
    pub async fn invite_code(&self, group: &Jid) -> Result<String> {
        let response = self
            .group_query(group, IqMode::Get, vec![requests::invite()])
            .await?;
        decode::invite_code(&response)
    }

    /// Revoke the shared invite code and return its replacement.
    pub async fn revoke_invite(&self, group: &Jid) -> Result<String> {
        let response = self
            .group_query(group, IqMode::Set, vec![requests::invite()])
            .await?;
        decode::invite_code(&response)
    }

    /// Preview the group behind an invite code without joining it.
    pub async fn invite_info(&self, code: &str) -> Result<GroupMetadata> {
        let response = self
            .group_query(
                &Jid::group_server(),
                IqMode::Get,
                vec![requests::invite_with_code(code)],
            )
            .await?;
        decode::extract_group_metadata(&response)
    }

    /// Join a group through its shared invite code. Returns the joined
    /// group's jid.
    pub async fn accept_invite_code(&self, code: &str) -> Result<Jid> {
        let response = self
            .group_query(
                &Jid::group_server(),
                IqMode::Set,
                vec![requests::invite_with_code(code)],
            )
            .await?;
        decode::joined_group(&response)
    }

    /// Accept an invite that arrived over chat. Acceptances run strictly one
    /// at a time, so the query and local side effects of one acceptance
    /// never interleave with another's.
    pub async fn accept_invite_message(&self, key: InviteKey, invite: GroupInvite) -> Result<Jid> {
        let service = self.clone();
        self.accept_queue
            .run(async move { service.accept_invite_inner(key, invite).await })
            .await
    }

    async fn accept_invite_inner(&self, key: InviteKey, invite: GroupInvite) -> Result<Jid> {
        let admin = key.sender().clone();
        let response = self
            .group_query(
                &invite.group,
                IqMode::Set,
                vec![requests::accept_invite(
                    &invite.code,
                    invite.expiration,
                    &admin,
                )],
            )
            .await?;

        // The join happened server-side; the local effects below are
        // best-effort and never roll it back. Both run only when the caller
        // holds the full message key; a bare sender key touches no local
        // state.
        if let Some(message_key) = key.message_key() {
            // Zero out the carried invite so the message cannot be used to
            // join twice.
            let consumed = GroupInvite {
                group: invite.group.clone(),
                code: String::new(),
                expiration: 0,
                group_name: invite.group_name.clone(),
            };
            let update = MessageUpdate {
                key: message_key.clone(),
                invite: consumed,
            };
            if let Err(e) = self
                .events
                .emit(GroupEvent::MessagesUpdate(vec![update]))
                .await
            {
                log::warn!("Failed to expire invite message: {}", e);
            }

            // Surface the join in local history as a participant-add notice.
            let record = HistoryRecord {
                key: MessageKey {
                    chat: invite.group.clone(),
                    id: new_message_id(),
                    from_me: false,
                    participant: Some(admin.clone()),
                },
                stub: HistoryStub::ParticipantAdd,
                stub_params: vec![self.me.clone()],
                participant: Some(admin),
                timestamp: Utc::now().timestamp(),
            };
            if let Err(e) = self.events.upsert_record(record, UpsertMode::Notify).await {
                log::warn!("Failed to record group join: {}", e);
            }
        }

        match response.attr("from") {
            Some(from) => Ok(Jid::group(from)),
            None => Ok(invite.group),
        }
    }

    /// Withdraw a personal invitation previously sent to `invitee`.
    pub async fn revoke_direct_invite(&self, group: &Jid, invitee: &Jid) -> Result<()> {
        self.group_query(
            group,
            IqMode::Set,
            vec![requests::revoke_direct_invite(invitee)],
        )
        .await?;
        Ok(())
    }

    /// Arm the disappearing-message timer with a positive duration in
    /// seconds, or disarm it with zero.
    pub async fn toggle_ephemeral(&self, group: &Jid, expiration: u64) -> Result<()> {
        self.group_query(
            group,
            IqMode::Set,
            vec![requests::ephemeral_toggle(expiration)],
        )
        .await?;
        Ok(())
    }

    /// Set one of the boolean policy flags.
    pub async fn update_setting(
        &self,
        group: &Jid,
        setting: GroupSetting,
        enabled: bool,
    ) -> Result<()> {
        self.group_query(
            group,
            IqMode::Set,
            vec![requests::setting_update(setting, enabled)],
        )
        .await?;
        Ok(())
    }

    /// Choose whether only admins or all members may add participants.
    pub async fn set_member_add_mode(&self, group: &Jid, mode: MemberAddMode) -> Result<()> {
        self.group_query(group, IqMode::Set, vec![requests::member_add_mode(mode)])
            .await?;
        Ok(())
    }

    /// Turn the join-approval requirement on or off.
    pub async fn set_join_approval_mode(&self, group: &Jid, enabled: bool) -> Result<()> {
        self.group_query(
            group,
            IqMode::Set,
            vec![requests::join_approval_mode(enabled)],
        )
        .await?;
        Ok(())
    }

    /// List the pending join requests of a group.
    pub async fn list_join_requests(&self, group: &Jid) -> Result<Vec<JoinRequest>> {
        let response = self
            .group_query(group, IqMode::Get, vec![requests::membership_requests()])
            .await?;
        decode::join_requests(&response)
    }

    /// Approve or reject a batch of pending join requests. Same
    /// partial-failure semantics as [`update_participants`](Self::update_participants).
    pub async fn resolve_join_requests(
        &self,
        group: &Jid,
        action: RequestAction,
        participants: &[Jid],
    ) -> Result<Vec<ParticipantStatus>> {
        let response = self
            .group_query(
                group,
                IqMode::Set,
                vec![requests::membership_requests_action(action, participants)],
            )
            .await?;
        let container = response
            .child("membership_requests_action")
            .and_then(|node| node.child(action.tag()));
        Ok(decode::participant_statuses(container))
    }

    /// Fetch every group the local identity participates in, keyed by group
    /// jid. The refreshed snapshots are also published as a
    /// [`GroupEvent::GroupsUpdate`].
    pub async fn fetch_all_participating(&self) -> Result<HashMap<Jid, GroupMetadata>> {
        let response = self
            .group_query(
                &Jid::group_server(),
                IqMode::Get,
                vec![requests::participating()],
            )
            .await?;
        let groups = decode::participating_groups(&response)?;
        let by_jid: HashMap<Jid, GroupMetadata> = groups
            .iter()
            .map(|metadata| (metadata.id.clone(), metadata.clone()))
            .collect();

        if let Err(e) = self.events.emit(GroupEvent::GroupsUpdate(groups)).await {
            log::warn!("Failed to publish refreshed group snapshots: {}", e);
        }
        Ok(by_jid)
    }
}
