use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use infra::dates::{is_new_event, parse_event_date};
use infra::filters::{self, ListedEvent};
use infra::models;
use infra::repos::ParticipationRequestRepo;
use uuid::Uuid;

use crate::error::AppError;
use crate::gql::scalars::Yen;
use crate::state::AppState;

pub fn parse_id(id: &ID) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.as_str()).map_err(|_| AppError::BadRequest(format!("invalid id: {}", id.as_str())))
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::EventType")]
pub enum EventType {
    Tournament,
    Practice,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::EventStatus")]
pub enum EventStatus {
    Recruiting,
    Closed,
    Finished,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::RequestStatus")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::Role")]
pub enum Role {
    Participant,
    Organizer,
    Admin,
    SuperAdmin,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::regions::Region")]
pub enum Region {
    Hokkaido,
    Tohoku,
    Kanto,
    Chubu,
    Kinki,
    Chugoku,
    Shikoku,
    Kyushu,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::AnnouncementCategory")]
pub enum AnnouncementCategory {
    General,
    Event,
    Maintenance,
    Important,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::NewsCategory")]
pub enum NewsCategory {
    Tournament,
    Practice,
    Community,
    Notice,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::InquiryCategory")]
pub enum InquiryCategory {
    General,
    Event,
    Account,
    Bug,
    Other,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::InquiryStatus")]
pub enum InquiryStatus {
    Open,
    InProgress,
    Resolved,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Event {
    pub id: ID,
    pub name: String,
    pub event_type: EventType,
    /// Date as entered, ISO or Japanese style.
    pub event_date: String,
    /// `eventDate` read as a calendar date, null when unreadable.
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: String,
    pub prefecture: String,
    pub region: Option<Region>,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<Yen>,
    pub beginner_friendly: bool,
    pub description: Option<String>,
    pub creator_id: Option<ID>,
    pub status: EventStatus,
    /// Created within the last three days.
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub uuid: Uuid,
}

impl Event {
    fn build(e: models::Event, date: Option<NaiveDate>, is_new: bool) -> Self {
        Self {
            id: e.id.into(),
            uuid: e.id,
            region: infra::regions::Region::of(&e.prefecture).map(Into::into),
            name: e.name,
            event_type: e.event_type.into(),
            event_date: e.event_date,
            date,
            start_time: e.start_time,
            end_time: e.end_time,
            venue: e.venue,
            prefecture: e.prefecture,
            max_participants: e.max_participants,
            entry_fee: e.entry_fee.map(Yen),
            beginner_friendly: e.beginner_friendly,
            description: e.description,
            creator_id: e.creator_id.map(Into::into),
            status: e.status.into(),
            is_new,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }

    pub fn from_record(e: models::Event, now: DateTime<Utc>) -> Self {
        let date = parse_event_date(&e.event_date).ok();
        let is_new = is_new_event(e.created_at, now);
        Self::build(e, date, is_new)
    }
}

impl From<ListedEvent> for Event {
    fn from(listed: ListedEvent) -> Self {
        Self::build(listed.event, Some(listed.date), listed.is_new)
    }
}

#[ComplexObject]
impl Event {
    /// Approved participation requests so far.
    async fn approved_count(&self, ctx: &Context<'_>) -> Result<i32> {
        let state = ctx.data::<AppState>()?;
        let count = ParticipationRequestRepo::new(state.store.clone())
            .approved_count(self.uuid)
            .await?;
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }
}

#[derive(SimpleObject, Clone)]
pub struct DateIssue {
    pub event_id: ID,
    pub event_name: String,
    pub raw_date: String,
}

impl From<filters::DateIssue> for DateIssue {
    fn from(issue: filters::DateIssue) -> Self {
        Self {
            event_id: issue.event_id.into(),
            event_name: issue.event_name,
            raw_date: issue.raw_date,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct EventList {
    pub events: Vec<Event>,
    /// Events left out because their date could not be read.
    pub date_issues: Vec<DateIssue>,
}

#[derive(SimpleObject, Clone)]
pub struct RegionInfo {
    pub region: Region,
    pub prefectures: Vec<String>,
}

#[derive(InputObject, Default)]
pub struct EventFilterInput {
    pub event_type: Option<EventType>,
    pub prefecture: Option<String>,
    pub region: Option<Region>,
    pub beginner_friendly: Option<bool>,
    #[graphql(validator(minimum = 1, maximum = 12))]
    pub month: Option<u32>,
    pub date: Option<NaiveDate>,
    #[graphql(default)]
    pub include_past: bool,
}

impl From<EventFilterInput> for filters::EventFilter {
    fn from(input: EventFilterInput) -> Self {
        Self {
            event_type: input.event_type.map(Into::into),
            prefecture: input.prefecture.filter(|p| !p.trim().is_empty()),
            region: input.region.map(Into::into),
            beginner_friendly: input.beginner_friendly,
            month: input.month,
            date: input.date,
            include_past: input.include_past,
        }
    }
}

#[derive(InputObject)]
pub struct CreateEventInput {
    pub name: String,
    pub event_type: EventType,
    pub event_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: String,
    pub prefecture: String,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<Yen>,
    #[graphql(default)]
    pub beginner_friendly: bool,
    pub description: Option<String>,
}

impl From<CreateEventInput> for models::NewEvent {
    fn from(input: CreateEventInput) -> Self {
        Self {
            name: input.name,
            event_type: input.event_type.into(),
            event_date: input.event_date,
            start_time: input.start_time,
            end_time: input.end_time,
            venue: input.venue,
            prefecture: input.prefecture,
            max_participants: input.max_participants,
            entry_fee: input.entry_fee.map(|y| y.0),
            beginner_friendly: input.beginner_friendly,
            description: input.description,
        }
    }
}

#[derive(InputObject, Default)]
pub struct UpdateEventInput {
    pub name: Option<String>,
    pub event_type: Option<EventType>,
    pub event_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: Option<String>,
    pub prefecture: Option<String>,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<Yen>,
    pub beginner_friendly: Option<bool>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
}

impl From<UpdateEventInput> for models::EventPatch {
    fn from(input: UpdateEventInput) -> Self {
        Self {
            name: input.name,
            event_type: input.event_type.map(Into::into),
            event_date: input.event_date,
            start_time: input.start_time,
            end_time: input.end_time,
            venue: input.venue,
            prefecture: input.prefecture,
            max_participants: input.max_participants,
            entry_fee: input.entry_fee.map(|y| y.0),
            beginner_friendly: input.beginner_friendly,
            description: input.description,
            status: input.status.map(Into::into),
        }
    }
}

// ---------------------------------------------------------------------------
// Participation requests and organizer applications
// ---------------------------------------------------------------------------

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct ParticipationRequest {
    pub id: ID,
    pub event_id: ID,
    pub user_id: ID,
    pub user_name: String,
    pub user_email: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<ID>,
    #[graphql(skip)]
    pub event_uuid: Uuid,
}

impl From<models::ParticipationRequest> for ParticipationRequest {
    fn from(r: models::ParticipationRequest) -> Self {
        Self {
            id: r.id.into(),
            event_id: r.event_id.into(),
            event_uuid: r.event_id,
            user_id: r.user_id.into(),
            user_name: r.user_name,
            user_email: r.user_email,
            message: r.message,
            status: r.status.into(),
            created_at: r.created_at,
            processed_at: r.processed_at,
            processed_by: r.processed_by.map(Into::into),
        }
    }
}

#[ComplexObject]
impl ParticipationRequest {
    async fn event(&self, ctx: &Context<'_>) -> Result<Option<Event>> {
        let state = ctx.data::<AppState>()?;
        let source = crate::gql::source(ctx);
        let event = state.events.get(self.event_uuid, source).await?;
        Ok(event.map(|e| Event::from_record(e, state.now())))
    }
}

/// Pushed to subscribers whenever a participation request changes state.
#[derive(SimpleObject, Clone, Debug)]
pub struct ParticipationUpdate {
    pub request_id: ID,
    pub event_id: ID,
    pub status: RequestStatus,
}

#[derive(InputObject)]
pub struct RequestParticipationInput {
    pub event_id: ID,
    pub message: Option<String>,
}

#[derive(SimpleObject, Clone)]
pub struct OrganizerApplication {
    pub id: ID,
    pub user_id: ID,
    pub user_name: String,
    pub user_email: String,
    pub reason: String,
    pub experience: Option<String>,
    pub plan: Option<String>,
    pub location: Option<String>,
    pub frequency: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<ID>,
}

impl From<models::OrganizerApplication> for OrganizerApplication {
    fn from(a: models::OrganizerApplication) -> Self {
        Self {
            id: a.id.into(),
            user_id: a.user_id.into(),
            user_name: a.user_name,
            user_email: a.user_email,
            reason: a.reason,
            experience: a.experience,
            plan: a.plan,
            location: a.location,
            frequency: a.frequency,
            status: a.status.into(),
            created_at: a.created_at,
            processed_at: a.processed_at,
            processed_by: a.processed_by.map(Into::into),
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct ApplicationDecision {
    pub application: OrganizerApplication,
    /// The applicant after promotion, when the decision changed their role.
    pub promoted_user: Option<User>,
}

impl From<infra::workflow::ApplicationDecision> for ApplicationDecision {
    fn from(d: infra::workflow::ApplicationDecision) -> Self {
        Self {
            application: d.application.into(),
            promoted_user: d.promoted_user.map(Into::into),
        }
    }
}

#[derive(InputObject)]
pub struct OrganizerApplicationInput {
    pub reason: String,
    pub experience: Option<String>,
    pub plan: Option<String>,
    pub location: Option<String>,
    pub frequency: Option<String>,
}

impl From<OrganizerApplicationInput> for infra::repos::NewOrganizerApplication {
    fn from(input: OrganizerApplicationInput) -> Self {
        Self {
            reason: input.reason,
            experience: input.experience,
            plan: input.plan,
            location: input.location,
            frequency: input.frequency,
        }
    }
}

// ---------------------------------------------------------------------------
// Announcements, news, venues, inquiries
// ---------------------------------------------------------------------------

#[derive(SimpleObject, Clone)]
pub struct Announcement {
    pub id: ID,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<models::Announcement> for Announcement {
    fn from(a: models::Announcement) -> Self {
        Self {
            id: a.id.into(),
            title: a.title,
            content: a.content,
            category: a.category.into(),
            is_active: a.is_active,
            created_at: a.created_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateAnnouncementInput {
    pub title: String,
    pub content: String,
    #[graphql(default_with = "AnnouncementCategory::General")]
    pub category: AnnouncementCategory,
}

#[derive(SimpleObject, Clone)]
pub struct NewsArticle {
    pub id: ID,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub category: NewsCategory,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::NewsArticle> for NewsArticle {
    fn from(n: models::NewsArticle) -> Self {
        Self {
            id: n.id.into(),
            title: n.title,
            summary: n.summary,
            body: n.body,
            category: n.category.into(),
            is_published: n.is_published,
            published_at: n.published_at,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateNewsInput {
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    #[graphql(default_with = "NewsCategory::Notice")]
    pub category: NewsCategory,
    #[graphql(default)]
    pub publish: bool,
}

#[derive(InputObject, Default)]
pub struct UpdateNewsInput {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub category: Option<NewsCategory>,
}

#[derive(SimpleObject, Clone)]
pub struct Venue {
    pub id: ID,
    pub name: String,
    pub address: String,
    pub prefecture: String,
    pub region: Option<Region>,
    pub facilities: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::Venue> for Venue {
    fn from(v: models::Venue) -> Self {
        Self {
            id: v.id.into(),
            region: infra::regions::Region::of(&v.prefecture).map(Into::into),
            name: v.name,
            address: v.address,
            prefecture: v.prefecture,
            facilities: v.facilities.into_iter().collect(),
            is_active: v.is_active,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateVenueInput {
    pub name: String,
    pub address: String,
    pub prefecture: String,
    #[graphql(default)]
    pub facilities: Vec<String>,
}

#[derive(InputObject, Default)]
pub struct UpdateVenueInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub prefecture: Option<String>,
    pub facilities: Option<Vec<String>>,
}

#[derive(SimpleObject, Clone)]
pub struct Inquiry {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub category: InquiryCategory,
    pub status: InquiryStatus,
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::Inquiry> for Inquiry {
    fn from(i: models::Inquiry) -> Self {
        Self {
            id: i.id.into(),
            name: i.name,
            email: i.email,
            subject: i.subject,
            message: i.message,
            category: i.category.into(),
            status: i.status.into(),
            reply: i.reply,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(InputObject)]
pub struct SubmitInquiryInput {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[graphql(default_with = "InquiryCategory::General")]
    pub category: InquiryCategory,
}

// ---------------------------------------------------------------------------
// Users and settings
// ---------------------------------------------------------------------------

#[derive(SimpleObject, Clone)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<models::User> for User {
    fn from(u: models::User) -> Self {
        Self {
            id: u.id.into(),
            email: u.email,
            name: u.name,
            role: u.role.into(),
            created_at: u.created_at,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(InputObject)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(SimpleObject, Clone)]
pub struct NotificationSettings {
    pub email_on_request: bool,
    pub email_on_decision: bool,
    pub news_digest: bool,
}

impl From<models::NotificationSettings> for NotificationSettings {
    fn from(s: models::NotificationSettings) -> Self {
        Self {
            email_on_request: s.email_on_request,
            email_on_decision: s.email_on_decision,
            news_digest: s.news_digest,
        }
    }
}

#[derive(InputObject)]
pub struct NotificationSettingsInput {
    pub email_on_request: Option<bool>,
    pub email_on_decision: Option<bool>,
    pub news_digest: Option<bool>,
}

#[derive(SimpleObject, Clone)]
pub struct PrivacySettings {
    pub show_profile: bool,
    pub show_participation_history: bool,
}

impl From<models::PrivacySettings> for PrivacySettings {
    fn from(s: models::PrivacySettings) -> Self {
        Self {
            show_profile: s.show_profile,
            show_participation_history: s.show_participation_history,
        }
    }
}

#[derive(InputObject)]
pub struct PrivacySettingsInput {
    pub show_profile: Option<bool>,
    pub show_participation_history: Option<bool>,
}
