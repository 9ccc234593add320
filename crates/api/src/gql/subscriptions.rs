use async_graphql::{Context, Result, Subscription, ID};
use futures_util::Stream;
use once_cell::sync::Lazy;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::auth::permissions::{require, require_owner_or};
use crate::auth::Capability;
use crate::error::AppError;
use crate::gql::source;
use crate::gql::types::{parse_id, ParticipationUpdate};
use crate::state::AppState;

static PARTICIPATION_UPDATES: Lazy<broadcast::Sender<ParticipationUpdate>> =
    Lazy::new(|| broadcast::channel(256).0);

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Participation requests as they are created and decided. Event owners
    /// pass `eventId` to follow their event; admins may omit it to follow
    /// every event.
    async fn participation_updates(
        &self,
        ctx: &Context<'_>,
        event_id: Option<ID>,
    ) -> Result<impl Stream<Item = ParticipationUpdate>> {
        match &event_id {
            Some(id) => {
                let state = ctx.data::<AppState>()?;
                let parsed = parse_id(id)?;
                let event = state
                    .events
                    .get(parsed, source(ctx))
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("event {parsed}")))?;
                require_owner_or(
                    ctx,
                    event.creator_id,
                    Capability::ManageOwnEvents,
                    Capability::ManageAllEvents,
                )?;
            }
            None => {
                require(ctx, Capability::ManageAllEvents)?;
            }
        }

        Ok(
            BroadcastStream::new(PARTICIPATION_UPDATES.subscribe()).filter_map(move |received| {
                // lagged receivers skip what they missed
                let update = received.ok()?;
                match &event_id {
                    Some(id) if *id != update.event_id => None,
                    _ => Some(update),
                }
            }),
        )
    }
}

pub fn publish_participation_update(update: ParticipationUpdate) {
    // no subscribers is not an error
    let _ = PARTICIPATION_UPDATES.send(update);
}

pub fn subscriber_count() -> usize {
    PARTICIPATION_UPDATES.receiver_count()
}
