//! `pipes_organization_member`.
//!
//! A member is invited either by user handle or by email. Handle invites can
//! be addressed directly; email invites only show up in the member list until
//! the invitee signs up, so they are looked up by scanning it.

use async_trait::async_trait;
use tracing::info;

use super::{check_one_of, found, with_timestamps, Resource};
use crate::api::{InviteOrgMemberRequest, OrgMember, UpdateOrgMemberRequest};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::state::ResourceState;

const ROLES: &[&str] = &["member", "owner"];

pub struct OrganizationMemberResource;

/// Who the member resource points at.
#[derive(Clone, Copy)]
enum Invitee<'a> {
    Handle(&'a str),
    Email(&'a str),
}

impl<'a> Invitee<'a> {
    fn from_state(state: &'a ResourceState) -> Result<Self, ProviderError> {
        match (state.get_str("user_handle"), state.get_str("email")) {
            (Some(handle), _) => Ok(Self::Handle(handle)),
            (None, Some(email)) => Ok(Self::Email(email)),
            (None, None) => Err(ProviderError::Validation(
                "one of 'user_handle' or 'email' must be set".to_string(),
            )),
        }
    }

    fn key(&self) -> &'a str {
        match *self {
            Self::Handle(handle) => handle,
            Self::Email(email) => email,
        }
    }
}

async fn find_member(
    ctx: &ProviderContext,
    org: &str,
    invitee: &Invitee<'_>,
) -> Result<Option<OrgMember>, ProviderError> {
    match *invitee {
        Invitee::Handle(handle) => found(ctx.client().get_org_member(org, handle).await),
        Invitee::Email(email) => {
            let members = ctx.client().list_org_members(org).await?;
            Ok(members.into_iter().find(|m| {
                m.member_email()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            }))
        },
    }
}

/// Copy API fields into state. `user_handle` and `email` stay as configured.
fn write_state(state: &mut ResourceState, org: &str, key: &str, member: OrgMember) {
    let display_name = member.user.as_ref().and_then(|u| u.display_name.clone());
    state
        .set("id", compose_id(&[org, key]))
        .set("organization", org)
        .set("organization_member_id", member.id)
        .set_opt("user_id", member.user_id)
        .set("role", member.role)
        .set("status", member.status)
        .set_opt("display_name", display_name)
        .set_opt("created_at", member.created_at)
        .set_opt("updated_at", member.updated_at)
        .set_opt("version_id", member.version_id);
}

/// Handle to address the member by, if it has one.
fn member_handle<'a>(invitee: &Invitee<'a>, member: &'a Option<OrgMember>) -> Option<&'a str> {
    match *invitee {
        Invitee::Handle(handle) => Some(handle),
        Invitee::Email(_) => member.as_ref().and_then(OrgMember::user_handle),
    }
}

#[async_trait]
impl Resource for OrganizationMemberResource {
    fn type_name(&self) -> &'static str {
        "pipes_organization_member"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("Membership of a user, or a pending invitation, in an organization.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", Attribute::required_string().with_force_new())
                .with_attribute(
                    "user_handle",
                    Attribute::optional_string()
                        .with_force_new()
                        .with_description("Handle of the user to invite. Conflicts with email."),
                )
                .with_attribute(
                    "email",
                    Attribute::optional_string()
                        .with_force_new()
                        .with_description("Email address to invite. Conflicts with user_handle."),
                )
                .with_attribute(
                    "role",
                    Attribute::required_string().with_description("Either member or owner."),
                )
                .with_attribute("organization_member_id", Attribute::computed_string())
                .with_attribute("user_id", Attribute::computed_string())
                .with_attribute("status", Attribute::computed_string())
                .with_attribute("display_name", Attribute::computed_string()),
        )
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        match (config.get_str("user_handle"), config.get_str("email")) {
            (Some(_), Some(_)) => diagnostics.push(
                Diagnostic::error("Conflicting attributes")
                    .with_detail("only one of user_handle or email can be set")
                    .with_attribute("email"),
            ),
            (None, None) => diagnostics.push(
                Diagnostic::error("Missing invitee")
                    .with_detail("one of user_handle or email must be set")
                    .with_attribute("user_handle"),
            ),
            _ => {},
        }
        diagnostics.extend(check_one_of(config, "role", ROLES));
        diagnostics
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let org = planned.require_str("organization")?.to_string();
        let invitee = Invitee::from_state(&planned)?;
        let key = invitee.key().to_string();
        let request = InviteOrgMemberRequest {
            handle: planned.get_string("user_handle"),
            email: match invitee {
                Invitee::Email(email) => Some(email.to_string()),
                Invitee::Handle(_) => None,
            },
            role: planned.require_str("role")?.to_string(),
        };

        let member = ctx.client().invite_org_member(&org, &request).await?;
        info!(organization = %org, member = %key, role = %member.role, "Invited organization member");

        write_state(&mut planned, &org, &key, member);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let org = current.require_str("organization")?.to_string();
        let invitee = Invitee::from_state(&current)?;
        let key = invitee.key().to_string();
        let Some(member) = find_member(ctx, &org, &invitee).await? else {
            return Ok(None);
        };

        write_state(&mut current, &org, &key, member);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let org = planned.require_str("organization")?.to_string();
        let invitee = Invitee::from_state(&planned)?;
        let key = invitee.key().to_string();
        let request = UpdateOrgMemberRequest {
            role: planned.require_str("role")?.to_string(),
        };

        let existing = match invitee {
            Invitee::Handle(_) => None,
            Invitee::Email(_) => find_member(ctx, &org, &invitee).await?,
        };
        let handle = member_handle(&invitee, &existing).ok_or_else(|| {
            ProviderError::InvalidRequest(format!(
                "the invitation to {} has not been accepted yet, so its role cannot be changed",
                key
            ))
        })?;

        let member = ctx.client().update_org_member(&org, handle, &request).await?;
        info!(organization = %org, member = %key, role = %member.role, "Updated organization member");

        write_state(&mut planned, &org, &key, member);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let org = current.require_str("organization")?;
        let invitee = Invitee::from_state(&current)?;

        match invitee {
            Invitee::Handle(handle) => ctx.client().delete_org_member(org, handle).await?,
            Invitee::Email(email) => {
                let existing = find_member(ctx, org, &invitee).await?;
                match member_handle(&invitee, &existing) {
                    Some(handle) => ctx.client().delete_org_member(org, handle).await?,
                    None => ctx.client().delete_org_invite(org, email).await?,
                }
            },
        }
        info!(organization = %org, member = %invitee.key(), "Removed organization member");
        Ok(())
    }

    async fn import_state(&self, _ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [org, member] = split_id::<2>(id, "{organization}/{user_handle or email}")?;
        let mut state = ResourceState::new();
        state.set("organization", org);
        if member.contains('@') {
            state.set("email", member);
        } else {
            state.set("user_handle", member);
        }
        Ok(state)
    }
}
