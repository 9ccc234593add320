use async_graphql::{Context, Object, Result, ID};
use infra::filters::EventFilter;
use infra::models::NewEvent;
use infra::regions::Region as InfraRegion;
use tracing::info;

use crate::auth::permissions::{require, require_owner_or};
use crate::auth::Capability;
use crate::error::AppError;
use crate::gql::source;
use crate::gql::types::{
    parse_id, CreateEventInput, Event, EventFilterInput, EventList, RegionInfo, UpdateEventInput,
};
use crate::state::AppState;

#[derive(Default)]
pub struct EventQuery;

#[Object]
impl EventQuery {
    /// Upcoming events matching `filter`, newly created ones first, then
    /// by date.
    async fn events(&self, ctx: &Context<'_>, filter: Option<EventFilterInput>) -> Result<EventList> {
        let state = ctx.data::<AppState>()?;
        let filter: EventFilter = filter.unwrap_or_default().into();
        let listing = state.events.list(&filter, &state.clock, source(ctx)).await?;
        Ok(EventList {
            events: listing.events.into_iter().map(Into::into).collect(),
            date_issues: listing.date_issues.into_iter().map(Into::into).collect(),
        })
    }

    async fn event(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Event>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let event = state.events.get(id, source(ctx)).await?;
        Ok(event.map(|e| Event::from_record(e, state.now())))
    }

    /// Everything the caller has organized, past events included.
    async fn my_events(&self, ctx: &Context<'_>) -> Result<Vec<Event>> {
        let session = require(ctx, Capability::ManageOwnEvents)?;
        let state = ctx.data::<AppState>()?;
        let now = state.now();
        let events = state
            .events
            .list_by_creator(session.user_id(), session.source())
            .await?;
        Ok(events.into_iter().map(|e| Event::from_record(e, now)).collect())
    }

    async fn regions(&self) -> Vec<RegionInfo> {
        InfraRegion::ALL
            .iter()
            .map(|r| RegionInfo {
                region: (*r).into(),
                prefectures: r.prefectures().iter().map(|p| p.to_string()).collect(),
            })
            .collect()
    }
}

#[derive(Default)]
pub struct EventMutation;

#[Object]
impl EventMutation {
    async fn create_event(&self, ctx: &Context<'_>, input: CreateEventInput) -> Result<Event> {
        let session = require(ctx, Capability::CreateEvents)?;
        let state = ctx.data::<AppState>()?;
        let now = state.now();

        let new_event: NewEvent = input.into();
        let event = state
            .events
            .create(new_event, Some(session.user_id()), now, session.source())
            .await?;
        info!(event_id = %event.id, creator = %session.user_id(), "created event");
        Ok(Event::from_record(event, now))
    }

    async fn update_event(&self, ctx: &Context<'_>, id: ID, input: UpdateEventInput) -> Result<Event> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let existing = state
            .events
            .get(id, source(ctx))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {id}")))?;
        let session = require_owner_or(
            ctx,
            existing.creator_id,
            Capability::ManageOwnEvents,
            Capability::ManageAllEvents,
        )?;

        let now = state.now();
        let event = state.events.update(id, input.into(), now, session.source()).await?;
        info!(event_id = %id, by = %session.user_id(), "updated event");
        Ok(Event::from_record(event, now))
    }

    async fn delete_event(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let existing = state
            .events
            .get(id, source(ctx))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {id}")))?;
        let session = require_owner_or(
            ctx,
            existing.creator_id,
            Capability::ManageOwnEvents,
            Capability::ManageAllEvents,
        )?;

        state.events.delete(id, state.now(), session.source()).await?;
        info!(event_id = %id, by = %session.user_id(), "deleted event");
        Ok(true)
    }
}
