use std::collections::BTreeSet;

use async_graphql::{Context, Enum};
use infra::models::Role;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::AppError;

/// Something a signed-in caller may do. Browsing events and sending
/// inquiries need no session at all. Roles grant capabilities cumulatively, so a
/// resolver asks for the capability and never compares roles itself.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    RequestParticipation,
    ApplyForOrganizer,
    ManageOwnSettings,
    CreateEvents,
    ManageOwnEvents,
    ManageAllEvents,
    ReviewOrganizerApplications,
    ManageAnnouncements,
    ManageNews,
    ManageVenues,
    ManageInquiries,
    ViewUsers,
    ManageUserRoles,
}

/// What `role` adds on top of the roles below it.
fn granted(role: Role) -> &'static [Capability] {
    use Capability::*;
    match role {
        Role::Participant => &[RequestParticipation, ApplyForOrganizer, ManageOwnSettings],
        Role::Organizer => &[CreateEvents, ManageOwnEvents],
        Role::Admin => &[
            ManageAllEvents,
            ReviewOrganizerApplications,
            ManageAnnouncements,
            ManageNews,
            ManageVenues,
            ManageInquiries,
            ViewUsers,
        ],
        Role::SuperAdmin => &[ManageUserRoles],
    }
}

const ROLES: [Role; 4] = [Role::Participant, Role::Organizer, Role::Admin, Role::SuperAdmin];

pub fn capabilities(role: Role) -> BTreeSet<Capability> {
    ROLES
        .iter()
        .filter(|r| **r <= role)
        .flat_map(|r| granted(*r).iter().copied())
        .collect()
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    ROLES
        .iter()
        .filter(|r| **r <= role)
        .any(|r| granted(*r).contains(&capability))
}

pub fn current_session<'a>(ctx: &Context<'a>) -> Option<&'a Session> {
    ctx.data_opt::<Session>()
}

pub fn require_session<'a>(ctx: &Context<'a>) -> Result<&'a Session, AppError> {
    current_session(ctx).ok_or_else(|| AppError::Unauthorized("sign in required".into()))
}

pub fn require<'a>(ctx: &Context<'a>, capability: Capability) -> Result<&'a Session, AppError> {
    let session = require_session(ctx)?;
    if !session.can(capability) {
        return Err(AppError::Forbidden(format!("{capability:?} is not granted to {}", session.role())));
    }
    Ok(session)
}

/// Owners pass with `own`, everyone else needs `any`.
pub fn require_owner_or<'a>(
    ctx: &Context<'a>,
    owner: Option<Uuid>,
    own: Capability,
    any: Capability,
) -> Result<&'a Session, AppError> {
    let session = require_session(ctx)?;
    let is_owner = owner == Some(session.user_id());
    if (is_owner && session.can(own)) || session.can(any) {
        return Ok(session);
    }
    Err(AppError::Forbidden("only the owner or an administrator may do this".into()))
}
