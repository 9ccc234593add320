use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dates::{parse_event_date, parse_time};
use crate::error::{StoreError, StoreResult};
use crate::filters::{self, EventFilter, EventListing};
use crate::models::{Event, EventPatch, NewEvent};
use crate::regions::is_known_prefecture;
use crate::repos::EventRepo;
use crate::store::{keys, LocalStore};

/// Where event reads and writes should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Postgres when configured, local store when it is absent or failing.
    #[default]
    Auto,
    /// Demo sessions never touch the database.
    LocalOnly,
}

/// Event access across the optional database, the local store and the
/// built-in seed list.
///
/// Every read merges all three sources by id and keeps the most recently
/// updated copy, so local records shadow seed records (how seed events get
/// edited or deleted) and events written locally while the database was
/// down stay visible once it is back. A successful database write drops
/// the local copy. A failing database is logged and bypassed, never retried.
#[derive(Clone)]
pub struct EventStore {
    remote: Option<EventRepo>,
    local: LocalStore,
    seeds: Arc<Vec<Event>>,
}

impl EventStore {
    pub fn new(remote: Option<EventRepo>, local: LocalStore, seeds: Vec<Event>) -> Self {
        Self {
            remote,
            local,
            seeds: Arc::new(seeds),
        }
    }

    pub fn remote(&self) -> Option<&EventRepo> {
        self.remote.as_ref()
    }

    fn remote_for(&self, source: Source) -> Option<&EventRepo> {
        match source {
            Source::Auto => self.remote.as_ref(),
            Source::LocalOnly => None,
        }
    }

    async fn remote_events(&self, source: Source) -> Vec<Event> {
        let Some(repo) = self.remote_for(source) else {
            return Vec::new();
        };
        match repo.list_active().await {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "remote event listing failed, using local events");
                Vec::new()
            }
        }
    }

    async fn remote_event(&self, id: Uuid, source: Source) -> Option<Event> {
        let repo = self.remote_for(source)?;
        match repo.get(id).await {
            Ok(found) => found,
            Err(err) => {
                warn!(event_id = %id, error = %err, "remote event lookup failed, using local events");
                None
            }
        }
    }

    /// Drop the local copy of an event the database now holds.
    async fn forget_local(&self, id: Uuid) -> StoreResult<()> {
        if self.local.delete::<Event>(&id.to_string()).await? {
            debug!(event_id = %id, "local event copy superseded by the database");
        }
        Ok(())
    }

    /// Every live event, unfiltered.
    pub async fn load_all(&self, source: Source) -> StoreResult<Vec<Event>> {
        let remote = self.remote_events(source).await;
        let local = self.local.list::<Event>().await?;

        let mut by_id: HashMap<Uuid, Event> = HashMap::new();
        for event in self.seeds.iter().cloned().chain(remote).chain(local) {
            keep_newest(&mut by_id, event);
        }
        Ok(by_id.into_values().filter(|e| !e.is_deleted()).collect())
    }

    pub async fn list(
        &self,
        filter: &EventFilter,
        clock: &Clock,
        source: Source,
    ) -> StoreResult<EventListing> {
        let events = self.load_all(source).await?;
        let listing = filters::apply(events, filter, clock.today(), clock.now());
        debug!(
            shown = listing.events.len(),
            unreadable = listing.date_issues.len(),
            "listed events"
        );
        Ok(listing)
    }

    pub async fn get(&self, id: Uuid, source: Source) -> StoreResult<Option<Event>> {
        let candidates = [
            self.seeds.iter().find(|e| e.id == id).cloned(),
            self.remote_event(id, source).await,
            self.local.get::<Event>(&id.to_string()).await?,
        ];

        let mut by_id = HashMap::new();
        for event in candidates.into_iter().flatten() {
            keep_newest(&mut by_id, event);
        }
        Ok(by_id.remove(&id).filter(|e| !e.is_deleted()))
    }

    /// Events created by `creator`, past ones included, newest first.
    pub async fn list_by_creator(&self, creator: Uuid, source: Source) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .load_all(source)
            .await?
            .into_iter()
            .filter(|e| e.creator_id == Some(creator))
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    pub async fn create(
        &self,
        new_event: NewEvent,
        creator: Option<Uuid>,
        now: DateTime<Utc>,
        source: Source,
    ) -> StoreResult<Event> {
        let event = new_event.into_event(creator, now);
        validate(&event)?;

        if let Some(repo) = self.remote_for(source) {
            match repo.insert(&event).await {
                Ok(()) => return Ok(event),
                Err(err) => warn!(event_id = %event.id, error = %err, "remote insert failed, storing locally"),
            }
        }
        self.local.put(&event).await?;
        Ok(event)
    }

    /// Seed events and events so far held only locally are inserted into
    /// the database on their first successful remote update.
    pub async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        now: DateTime<Utc>,
        source: Source,
    ) -> StoreResult<Event> {
        let mut event = self
            .get(id, source)
            .await?
            .ok_or_else(|| StoreError::not_found(keys::CREATED_EVENTS, id))?;
        patch.apply(&mut event, now);
        validate(&event)?;

        if let Some(repo) = self.remote_for(source) {
            let written = match repo.update(&event).await {
                Ok(true) => Ok(()),
                Ok(false) => repo.insert(&event).await,
                Err(err) => Err(err),
            };
            match written {
                Ok(()) => {
                    self.forget_local(id).await?;
                    return Ok(event);
                }
                Err(err) => warn!(event_id = %id, error = %err, "remote update failed, storing locally"),
            }
        }
        self.local.put(&event).await?;
        Ok(event)
    }

    /// Soft delete: the record stays, stamped with `deleted_at`.
    pub async fn delete(&self, id: Uuid, now: DateTime<Utc>, source: Source) -> StoreResult<()> {
        let mut event = self
            .get(id, source)
            .await?
            .ok_or_else(|| StoreError::not_found(keys::CREATED_EVENTS, id))?;

        if let Some(repo) = self.remote_for(source) {
            match repo.soft_delete(id, now).await {
                Ok(true) => {
                    self.forget_local(id).await?;
                    return Ok(());
                }
                // Not in the database: a seed or a locally held event.
                Ok(false) => {}
                Err(err) => warn!(event_id = %id, error = %err, "remote delete failed, deleting locally"),
            }
        }

        event.deleted_at = Some(now);
        event.updated_at = now;
        self.local.put(&event).await
    }
}

/// Keep whichever copy of an event was updated last. Later sources win
/// ties, so callers pass seeds, then database rows, then local records.
fn keep_newest(by_id: &mut HashMap<Uuid, Event>, event: Event) {
    match by_id.get(&event.id) {
        Some(existing) if existing.updated_at > event.updated_at => {}
        _ => {
            by_id.insert(event.id, event);
        }
    }
}

fn validate(event: &Event) -> StoreResult<()> {
    let invalid = |msg: String| Err(StoreError::InvalidInput(msg));

    if event.name.trim().is_empty() {
        return invalid("event name must not be empty".into());
    }
    if let Err(err) = parse_event_date(&event.event_date) {
        return invalid(err.to_string());
    }
    if !is_known_prefecture(&event.prefecture) {
        return invalid(format!("unknown prefecture: {}", event.prefecture));
    }
    if event.max_participants.is_some_and(|n| n <= 0) {
        return invalid("max participants must be positive".into());
    }
    if event.entry_fee.is_some_and(|fee| fee < 0) {
        return invalid("entry fee must not be negative".into());
    }

    let start = event.start_time.as_deref().map(parse_time).transpose();
    let end = event.end_time.as_deref().map(parse_time).transpose();
    match (start, end) {
        (Err(err), _) | (_, Err(err)) => invalid(err.to_string()),
        (Ok(Some(start)), Ok(Some(end))) if end <= start => {
            invalid("end time must be after start time".into())
        }
        _ => Ok(()),
    }
}
