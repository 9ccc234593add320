use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};
use infra::repos::{FavoritesRepo, SettingsRepo, UserFilter, UserRepo};
use tracing::{info, warn};

use crate::auth::permissions::{current_session, require, require_session};
use crate::auth::{capabilities, Capability};
use crate::error::AppError;
use crate::gql::types::{
    parse_id, Event, NotificationSettings, NotificationSettingsInput, PrivacySettings,
    PrivacySettingsInput, Role, User,
};
use crate::state::AppState;

#[derive(Default)]
pub struct AccountQuery;

#[Object]
impl AccountQuery {
    async fn server_time(&self, ctx: &Context<'_>) -> Result<DateTime<Utc>> {
        Ok(ctx.data::<AppState>()?.now())
    }

    /// The caller, or null when anonymous.
    async fn me(&self, ctx: &Context<'_>) -> Option<User> {
        current_session(ctx).map(|s| s.user.clone().into())
    }

    /// What the caller may do. Empty for anonymous callers.
    async fn my_capabilities(&self, ctx: &Context<'_>) -> Vec<Capability> {
        current_session(ctx)
            .map(|s| capabilities(s.role()).into_iter().collect())
            .unwrap_or_default()
    }

    async fn users(&self, ctx: &Context<'_>, search: Option<String>, role: Option<Role>) -> Result<Vec<User>> {
        require(ctx, Capability::ViewUsers)?;
        let state = ctx.data::<AppState>()?;
        let users = UserRepo::new(state.store.clone())
            .list(UserFilter {
                search: search.filter(|s| !s.trim().is_empty()),
                role: role.map(Into::into),
            })
            .await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn notification_settings(&self, ctx: &Context<'_>) -> Result<NotificationSettings> {
        let session = require(ctx, Capability::ManageOwnSettings)?;
        let state = ctx.data::<AppState>()?;
        let settings = SettingsRepo::new(state.store.clone())
            .notification(session.user_id())
            .await?;
        Ok(settings.into())
    }

    async fn privacy_settings(&self, ctx: &Context<'_>) -> Result<PrivacySettings> {
        let session = require(ctx, Capability::ManageOwnSettings)?;
        let state = ctx.data::<AppState>()?;
        let settings = SettingsRepo::new(state.store.clone())
            .privacy(session.user_id())
            .await?;
        Ok(settings.into())
    }

    /// Favorite events that still exist. Deleted ones are skipped.
    async fn favorite_events(&self, ctx: &Context<'_>) -> Result<Vec<Event>> {
        let session = require_session(ctx)?;
        let state = ctx.data::<AppState>()?;
        let ids = FavoritesRepo::new(state.store.clone())
            .list(session.user_id())
            .await?;

        let now = state.now();
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            match state.events.get(id, session.source()).await? {
                Some(event) if !event.is_deleted() => events.push(Event::from_record(event, now)),
                _ => warn!(event_id = %id, user_id = %session.user_id(), "favorite refers to a missing event"),
            }
        }
        Ok(events)
    }
}

#[derive(Default)]
pub struct AccountMutation;

#[Object]
impl AccountMutation {
    async fn set_user_role(&self, ctx: &Context<'_>, user_id: ID, role: Role) -> Result<User> {
        let session = require(ctx, Capability::ManageUserRoles)?;
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&user_id)?;
        if user_id == session.user_id() {
            return Err(AppError::Forbidden("cannot change your own role".into()).into());
        }

        let user = UserRepo::new(state.store.clone())
            .set_role(user_id, role.into(), state.now())
            .await?;
        info!(user_id = %user_id, role = %user.role, by = %session.user_id(), "changed user role");
        Ok(user.into())
    }

    async fn update_notification_settings(
        &self,
        ctx: &Context<'_>,
        input: NotificationSettingsInput,
    ) -> Result<NotificationSettings> {
        let session = require(ctx, Capability::ManageOwnSettings)?;
        let state = ctx.data::<AppState>()?;
        let repo = SettingsRepo::new(state.store.clone());

        let mut settings = repo.notification(session.user_id()).await?;
        if let Some(v) = input.email_on_request {
            settings.email_on_request = v;
        }
        if let Some(v) = input.email_on_decision {
            settings.email_on_decision = v;
        }
        if let Some(v) = input.news_digest {
            settings.news_digest = v;
        }
        repo.save_notification(&settings).await?;
        Ok(settings.into())
    }

    async fn update_privacy_settings(
        &self,
        ctx: &Context<'_>,
        input: PrivacySettingsInput,
    ) -> Result<PrivacySettings> {
        let session = require(ctx, Capability::ManageOwnSettings)?;
        let state = ctx.data::<AppState>()?;
        let repo = SettingsRepo::new(state.store.clone());

        let mut settings = repo.privacy(session.user_id()).await?;
        if let Some(v) = input.show_profile {
            settings.show_profile = v;
        }
        if let Some(v) = input.show_participation_history {
            settings.show_participation_history = v;
        }
        repo.save_privacy(&settings).await?;
        Ok(settings.into())
    }

    /// Returns whether the event is a favorite afterwards.
    async fn toggle_favorite(&self, ctx: &Context<'_>, event_id: ID) -> Result<bool> {
        let session = require_session(ctx)?;
        let state = ctx.data::<AppState>()?;
        let event_id = parse_id(&event_id)?;
        if state.events.get(event_id, session.source()).await?.is_none() {
            return Err(AppError::NotFound(format!("event {event_id}")).into());
        }
        let favorite = FavoritesRepo::new(state.store.clone())
            .toggle(session.user_id(), event_id)
            .await?;
        Ok(favorite)
    }
}
