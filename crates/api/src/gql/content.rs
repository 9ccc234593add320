use async_graphql::{Context, Object, Result, ID};
use infra::repos::{InquiryRepo, NewAnnouncement, NewInquiry, NewNewsArticle, NewVenue, NewsPatch, VenuePatch, VenueRepo};
use tracing::info;

use crate::auth::permissions::{current_session, require};
use crate::auth::Capability;
use crate::gql::types::{
    parse_id, Announcement, CreateAnnouncementInput, CreateNewsInput, CreateVenueInput, Inquiry,
    InquiryStatus, NewsArticle, SubmitInquiryInput, UpdateNewsInput, UpdateVenueInput, Venue,
};
use crate::state::AppState;

#[derive(Default)]
pub struct ContentQuery;

#[Object]
impl ContentQuery {
    /// Active announcements, newest first.
    async fn announcements(&self, ctx: &Context<'_>) -> Result<Vec<Announcement>> {
        let state = ctx.data::<AppState>()?;
        let rows = state.announcements().list_active().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_announcements(&self, ctx: &Context<'_>) -> Result<Vec<Announcement>> {
        require(ctx, Capability::ManageAnnouncements)?;
        let state = ctx.data::<AppState>()?;
        let rows = state.announcements().list_all().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Published articles, newest first.
    async fn news(&self, ctx: &Context<'_>) -> Result<Vec<NewsArticle>> {
        let state = ctx.data::<AppState>()?;
        let rows = state.news().list_published().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Drafts are only visible to news editors.
    async fn news_article(&self, ctx: &Context<'_>, id: ID) -> Result<Option<NewsArticle>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let editor = current_session(ctx).is_some_and(|s| s.can(Capability::ManageNews));
        let article = state
            .news()
            .get(id)
            .await?
            .filter(|a| a.is_published || editor);
        Ok(article.map(Into::into))
    }

    async fn all_news(&self, ctx: &Context<'_>) -> Result<Vec<NewsArticle>> {
        require(ctx, Capability::ManageNews)?;
        let state = ctx.data::<AppState>()?;
        let rows = state.news().list_all().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn venues(&self, ctx: &Context<'_>, prefecture: Option<String>) -> Result<Vec<Venue>> {
        let state = ctx.data::<AppState>()?;
        let rows = VenueRepo::new(state.store.clone())
            .list_active(prefecture.as_deref())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_venues(&self, ctx: &Context<'_>) -> Result<Vec<Venue>> {
        require(ctx, Capability::ManageVenues)?;
        let state = ctx.data::<AppState>()?;
        let rows = VenueRepo::new(state.store.clone()).list_all().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn inquiries(&self, ctx: &Context<'_>, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>> {
        require(ctx, Capability::ManageInquiries)?;
        let state = ctx.data::<AppState>()?;
        let rows = InquiryRepo::new(state.store.clone())
            .list(status.map(Into::into))
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    async fn create_announcement(&self, ctx: &Context<'_>, input: CreateAnnouncementInput) -> Result<Announcement> {
        let session = require(ctx, Capability::ManageAnnouncements)?;
        let state = ctx.data::<AppState>()?;
        let announcement = state
            .announcements()
            .create(
                NewAnnouncement {
                    title: input.title,
                    content: input.content,
                    category: input.category.into(),
                },
                state.now(),
            )
            .await?;
        info!(announcement_id = %announcement.id, by = %session.user_id(), "created announcement");
        Ok(announcement.into())
    }

    async fn set_announcement_active(&self, ctx: &Context<'_>, id: ID, active: bool) -> Result<Announcement> {
        require(ctx, Capability::ManageAnnouncements)?;
        let state = ctx.data::<AppState>()?;
        let announcement = state.announcements().set_active(parse_id(&id)?, active).await?;
        Ok(announcement.into())
    }

    async fn delete_announcement(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let session = require(ctx, Capability::ManageAnnouncements)?;
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        state.announcements().delete(id).await?;
        info!(announcement_id = %id, by = %session.user_id(), "deleted announcement");
        Ok(true)
    }

    async fn create_news(&self, ctx: &Context<'_>, input: CreateNewsInput) -> Result<NewsArticle> {
        let session = require(ctx, Capability::ManageNews)?;
        let state = ctx.data::<AppState>()?;
        let article = state
            .news()
            .create(
                NewNewsArticle {
                    title: input.title,
                    summary: input.summary,
                    body: input.body,
                    category: input.category.into(),
                    publish: input.publish,
                },
                state.now(),
            )
            .await?;
        info!(article_id = %article.id, by = %session.user_id(), "created news article");
        Ok(article.into())
    }

    async fn update_news(&self, ctx: &Context<'_>, id: ID, input: UpdateNewsInput) -> Result<NewsArticle> {
        require(ctx, Capability::ManageNews)?;
        let state = ctx.data::<AppState>()?;
        let patch = NewsPatch {
            title: input.title,
            summary: input.summary,
            body: input.body,
            category: input.category.map(Into::into),
        };
        let article = state.news().update(parse_id(&id)?, patch, state.now()).await?;
        Ok(article.into())
    }

    async fn set_news_published(&self, ctx: &Context<'_>, id: ID, published: bool) -> Result<NewsArticle> {
        require(ctx, Capability::ManageNews)?;
        let state = ctx.data::<AppState>()?;
        let article = state
            .news()
            .set_published(parse_id(&id)?, published, state.now())
            .await?;
        Ok(article.into())
    }

    async fn delete_news(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let session = require(ctx, Capability::ManageNews)?;
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        state.news().delete(id).await?;
        info!(article_id = %id, by = %session.user_id(), "deleted news article");
        Ok(true)
    }

    async fn create_venue(&self, ctx: &Context<'_>, input: CreateVenueInput) -> Result<Venue> {
        require(ctx, Capability::ManageVenues)?;
        let state = ctx.data::<AppState>()?;
        let venue = VenueRepo::new(state.store.clone())
            .create(
                NewVenue {
                    name: input.name,
                    address: input.address,
                    prefecture: input.prefecture,
                    facilities: input.facilities.into_iter().collect(),
                },
                state.now(),
            )
            .await?;
        Ok(venue.into())
    }

    async fn update_venue(&self, ctx: &Context<'_>, id: ID, input: UpdateVenueInput) -> Result<Venue> {
        require(ctx, Capability::ManageVenues)?;
        let state = ctx.data::<AppState>()?;
        let patch = VenuePatch {
            name: input.name,
            address: input.address,
            prefecture: input.prefecture,
            facilities: input.facilities.map(|f| f.into_iter().collect()),
        };
        let venue = VenueRepo::new(state.store.clone())
            .update(parse_id(&id)?, patch, state.now())
            .await?;
        Ok(venue.into())
    }

    /// Venues are never removed, only hidden from public listings.
    async fn set_venue_active(&self, ctx: &Context<'_>, id: ID, active: bool) -> Result<Venue> {
        require(ctx, Capability::ManageVenues)?;
        let state = ctx.data::<AppState>()?;
        let venue = VenueRepo::new(state.store.clone())
            .set_active(parse_id(&id)?, active, state.now())
            .await?;
        Ok(venue.into())
    }

    /// Open to anyone, signed in or not.
    async fn submit_inquiry(&self, ctx: &Context<'_>, input: SubmitInquiryInput) -> Result<Inquiry> {
        let state = ctx.data::<AppState>()?;
        let inquiry = InquiryRepo::new(state.store.clone())
            .submit(
                NewInquiry {
                    name: input.name,
                    email: input.email,
                    subject: input.subject,
                    message: input.message,
                    category: input.category.into(),
                },
                state.now(),
            )
            .await?;
        info!(inquiry_id = %inquiry.id, "inquiry submitted");
        Ok(inquiry.into())
    }

    async fn set_inquiry_status(&self, ctx: &Context<'_>, id: ID, status: InquiryStatus) -> Result<Inquiry> {
        require(ctx, Capability::ManageInquiries)?;
        let state = ctx.data::<AppState>()?;
        let inquiry = InquiryRepo::new(state.store.clone())
            .set_status(parse_id(&id)?, status.into(), state.now())
            .await?;
        Ok(inquiry.into())
    }

    /// Record a reply and resolve the inquiry.
    async fn reply_inquiry(&self, ctx: &Context<'_>, id: ID, reply: String) -> Result<Inquiry> {
        let session = require(ctx, Capability::ManageInquiries)?;
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id)?;
        let inquiry = InquiryRepo::new(state.store.clone())
            .reply(id, reply, state.now())
            .await?;
        info!(inquiry_id = %id, by = %session.user_id(), "inquiry answered");
        Ok(inquiry.into())
    }
}
