use async_graphql::{Context, Object, Result, ID};
use infra::models::{EventStatus, ParticipationRequest as RequestRecord};
use infra::repos::{NewParticipationRequest, OrganizerApplicationRepo, ParticipationRequestRepo};
use infra::workflow::Decision;
use tracing::info;

use crate::auth::permissions::{require, require_owner_or, require_session};
use crate::auth::Capability;
use crate::error::AppError;
use crate::gql::source;
use crate::gql::subscriptions::publish_participation_update;
use crate::gql::types::{
    parse_id, ApplicationDecision, OrganizerApplication, OrganizerApplicationInput,
    ParticipationRequest, ParticipationUpdate, RequestParticipationInput, RequestStatus,
};
use crate::state::AppState;

fn publish(request: &RequestRecord) {
    publish_participation_update(ParticipationUpdate {
        request_id: request.id.into(),
        event_id: request.event_id.into(),
        status: request.status.into(),
    });
}

#[derive(Default)]
pub struct RequestQuery;

#[Object]
impl RequestQuery {
    /// Requests for one event, oldest first. Event owner or admin only.
    async fn event_requests(&self, ctx: &Context<'_>, event_id: ID) -> Result<Vec<ParticipationRequest>> {
        let state = ctx.data::<AppState>()?;
        let event_id = parse_id(&event_id)?;
        let event = state
            .events
            .get(event_id, source(ctx))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id}")))?;
        require_owner_or(
            ctx,
            event.creator_id,
            Capability::ManageOwnEvents,
            Capability::ManageAllEvents,
        )?;

        let requests = ParticipationRequestRepo::new(state.store.clone())
            .list_for_event(event_id)
            .await?;
        Ok(requests.into_iter().map(Into::into).collect())
    }

    async fn my_participation_requests(&self, ctx: &Context<'_>) -> Result<Vec<ParticipationRequest>> {
        let session = require_session(ctx)?;
        let state = ctx.data::<AppState>()?;
        let requests = ParticipationRequestRepo::new(state.store.clone())
            .list_for_user(session.user_id())
            .await?;
        Ok(requests.into_iter().map(Into::into).collect())
    }

    async fn organizer_applications(
        &self,
        ctx: &Context<'_>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<OrganizerApplication>> {
        require(ctx, Capability::ReviewOrganizerApplications)?;
        let state = ctx.data::<AppState>()?;
        let applications = OrganizerApplicationRepo::new(state.store.clone())
            .list(status.map(Into::into))
            .await?;
        Ok(applications.into_iter().map(Into::into).collect())
    }

    async fn my_organizer_applications(&self, ctx: &Context<'_>) -> Result<Vec<OrganizerApplication>> {
        let session = require_session(ctx)?;
        let state = ctx.data::<AppState>()?;
        let applications = OrganizerApplicationRepo::new(state.store.clone())
            .list_for_user(session.user_id())
            .await?;
        Ok(applications.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct RequestMutation;

impl RequestMutation {
    async fn decide_participation(
        &self,
        ctx: &Context<'_>,
        id: ID,
        decision: Decision,
    ) -> Result<ParticipationRequest> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let repo = ParticipationRequestRepo::new(state.store.clone());
        let request = repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("participation request {id}")))?;
        let event = state
            .events
            .get(request.event_id, source(ctx))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {}", request.event_id)))?;
        let session = require_owner_or(
            ctx,
            event.creator_id,
            Capability::ManageOwnEvents,
            Capability::ManageAllEvents,
        )?;

        let decided = repo
            .decide(id, decision, session.user_id(), event.max_participants, state.now())
            .await?;
        info!(
            request_id = %id,
            event_id = %decided.event_id,
            status = %decided.status,
            by = %session.user_id(),
            "decided participation request"
        );
        publish(&decided);
        Ok(decided.into())
    }

    async fn decide_application(
        &self,
        ctx: &Context<'_>,
        id: ID,
        decision: Decision,
    ) -> Result<ApplicationDecision> {
        let session = require(ctx, Capability::ReviewOrganizerApplications)?;
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;

        let outcome = OrganizerApplicationRepo::new(state.store.clone())
            .decide(id, decision, session.user_id(), state.now())
            .await?;
        info!(
            application_id = %id,
            status = %outcome.application.status,
            promoted = outcome.promoted_user.is_some(),
            by = %session.user_id(),
            "decided organizer application"
        );
        Ok(outcome.into())
    }
}

#[Object]
impl RequestMutation {
    async fn request_participation(
        &self,
        ctx: &Context<'_>,
        input: RequestParticipationInput,
    ) -> Result<ParticipationRequest> {
        let session = require(ctx, Capability::RequestParticipation)?;
        let state = ctx.data::<AppState>()?;
        let event_id = parse_id(&input.event_id)?;

        let event = state
            .events
            .get(event_id, session.source())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id}")))?;
        if event.status != EventStatus::Recruiting {
            return Err(AppError::Conflict(format!("event is {}, not recruiting", event.status)).into());
        }
        if event.creator_id == Some(session.user_id()) {
            return Err(AppError::Conflict("organizers cannot join their own event".into()).into());
        }

        let request = ParticipationRequestRepo::new(state.store.clone())
            .create(
                NewParticipationRequest {
                    event_id,
                    user_id: session.user_id(),
                    user_name: session.user.name.clone(),
                    user_email: session.user.email.clone(),
                    message: input.message,
                },
                state.now(),
            )
            .await?;
        info!(request_id = %request.id, event_id = %event_id, user_id = %session.user_id(), "participation requested");
        publish(&request);
        Ok(request.into())
    }

    async fn approve_participation(&self, ctx: &Context<'_>, id: ID) -> Result<ParticipationRequest> {
        self.decide_participation(ctx, id, Decision::Approve).await
    }

    async fn reject_participation(&self, ctx: &Context<'_>, id: ID) -> Result<ParticipationRequest> {
        self.decide_participation(ctx, id, Decision::Reject).await
    }

    /// Remove the caller's own request, whatever its status.
    async fn withdraw_participation(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let session = require_session(ctx)?;
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let repo = ParticipationRequestRepo::new(state.store.clone());

        let request = repo
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("participation request {id}")))?;
        if request.user_id != session.user_id() {
            return Err(AppError::Forbidden("only the requester may withdraw a request".into()).into());
        }
        repo.remove(id).await?;
        info!(request_id = %id, user_id = %session.user_id(), "participation withdrawn");
        Ok(true)
    }

    async fn apply_for_organizer(
        &self,
        ctx: &Context<'_>,
        input: OrganizerApplicationInput,
    ) -> Result<OrganizerApplication> {
        let session = require(ctx, Capability::ApplyForOrganizer)?;
        let state = ctx.data::<AppState>()?;
        let application = OrganizerApplicationRepo::new(state.store.clone())
            .submit(&session.user, input.into(), state.now())
            .await?;
        info!(application_id = %application.id, user_id = %session.user_id(), "organizer application submitted");
        Ok(application.into())
    }

    async fn approve_organizer_application(&self, ctx: &Context<'_>, id: ID) -> Result<ApplicationDecision> {
        self.decide_application(ctx, id, Decision::Approve).await
    }

    async fn reject_organizer_application(&self, ctx: &Context<'_>, id: ID) -> Result<ApplicationDecision> {
        self.decide_application(ctx, id, Decision::Reject).await
    }
}
