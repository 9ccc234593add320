use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{keys, Record};

/// Declares a string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("invalid {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Tournament,
    Practice,
}

text_enum!(EventType {
    Tournament => "tournament",
    Practice => "practice",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Recruiting,
    Closed,
    Finished,
}

text_enum!(EventStatus {
    Recruiting => "recruiting",
    Closed => "closed",
    Finished => "finished",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub event_type: EventType,
    /// Free-form: `YYYY-MM-DD` or `YYYY年MM月DD日`.
    pub event_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: String,
    pub prefecture: String,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<i32>,
    #[serde(default)]
    pub beginner_friendly: bool,
    pub description: Option<String>,
    pub creator_id: Option<Uuid>,
    #[serde(default)]
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Record for Event {
    const COLLECTION: &'static str = keys::CREATED_EVENTS;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub event_type: EventType,
    pub event_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: String,
    pub prefecture: String,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<i32>,
    pub beginner_friendly: bool,
    pub description: Option<String>,
}

impl NewEvent {
    pub fn into_event(self, creator_id: Option<Uuid>, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: self.name,
            event_type: self.event_type,
            event_date: self.event_date,
            start_time: self.start_time,
            end_time: self.end_time,
            venue: self.venue,
            prefecture: self.prefecture,
            max_participants: self.max_participants,
            entry_fee: self.entry_fee,
            beginner_friendly: self.beginner_friendly,
            description: self.description,
            creator_id,
            status: EventStatus::Recruiting,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub name: Option<String>,
    pub event_type: Option<EventType>,
    pub event_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub venue: Option<String>,
    pub prefecture: Option<String>,
    pub max_participants: Option<i32>,
    pub entry_fee: Option<i32>,
    pub beginner_friendly: Option<bool>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
}

impl EventPatch {
    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            event.name = v;
        }
        if let Some(v) = self.event_type {
            event.event_type = v;
        }
        if let Some(v) = self.event_date {
            event.event_date = v;
        }
        if let Some(v) = self.start_time {
            event.start_time = Some(v);
        }
        if let Some(v) = self.end_time {
            event.end_time = Some(v);
        }
        if let Some(v) = self.venue {
            event.venue = v;
        }
        if let Some(v) = self.prefecture {
            event.prefecture = v;
        }
        if let Some(v) = self.max_participants {
            event.max_participants = Some(v);
        }
        if let Some(v) = self.entry_fee {
            event.entry_fee = Some(v);
        }
        if let Some(v) = self.beginner_friendly {
            event.beginner_friendly = v;
        }
        if let Some(v) = self.description {
            event.description = Some(v);
        }
        if let Some(v) = self.status {
            event.status = v;
        }
        event.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

text_enum!(RequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRequest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
}

impl Record for ParticipationRequest {
    const COLLECTION: &'static str = keys::PARTICIPATION_REQUESTS;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerApplication {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub processed_by: Option<Uuid>,
}

impl Record for OrganizerApplication {
    const COLLECTION: &'static str = keys::ORGANIZER_APPLICATIONS;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Announcements and news
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementCategory {
    #[default]
    General,
    Event,
    Maintenance,
    Important,
}

text_enum!(AnnouncementCategory {
    General => "general",
    Event => "event",
    Maintenance => "maintenance",
    Important => "important",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Announcement {
    const COLLECTION: &'static str = keys::ANNOUNCEMENTS;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Tournament,
    Practice,
    Community,
    #[default]
    Notice,
}

text_enum!(NewsCategory {
    Tournament => "tournament",
    Practice => "practice",
    Community => "community",
    Notice => "notice",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub category: NewsCategory,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for NewsArticle {
    const COLLECTION: &'static str = keys::NEWS_ARTICLES;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Venues and inquiries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub prefecture: String,
    #[serde(default)]
    pub facilities: BTreeSet<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Venue {
    const COLLECTION: &'static str = keys::VENUES;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryCategory {
    #[default]
    General,
    Event,
    Account,
    Bug,
    Other,
}

text_enum!(InquiryCategory {
    General => "general",
    Event => "event",
    Account => "account",
    Bug => "bug",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

text_enum!(InquiryStatus {
    Open => "open",
    InProgress => "in_progress",
    Resolved => "resolved",
});

impl InquiryStatus {
    /// Inquiries only move forward: open, in progress, resolved.
    pub fn can_move_to(self, next: InquiryStatus) -> bool {
        let rank = |s: InquiryStatus| match s {
            InquiryStatus::Open => 0,
            InquiryStatus::InProgress => 1,
            InquiryStatus::Resolved => 2,
        };
        rank(next) >= rank(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: Uuid,
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

impl Record for Inquiry {
    const COLLECTION: &'static str = keys::INQUIRIES;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Users and per-user settings
// ---------------------------------------------------------------------------

/// Ordered by privilege: each role includes everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    #[serde(alias = "user")]
    Participant,
    Organizer,
    Admin,
    SuperAdmin,
}

text_enum!(Role {
    Participant => "participant",
    Organizer => "organizer",
    Admin => "admin",
    SuperAdmin => "super_admin",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    const COLLECTION: &'static str = keys::USERS;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Points at the locally simulated session user. The user itself lives in
/// the users collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemoUser {
    pub user_id: Uuid,
}

impl DemoUser {
    pub const KEY: &'static str = "current";
}

impl Record for DemoUser {
    const COLLECTION: &'static str = keys::DEMO_USER;

    fn key(&self) -> String {
        Self::KEY.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub user_id: Uuid,
    pub email_on_request: bool,
    pub email_on_decision: bool,
    pub news_digest: bool,
}

impl NotificationSettings {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_on_request: true,
            email_on_decision: true,
            news_digest: false,
        }
    }
}

impl Record for NotificationSettings {
    const COLLECTION: &'static str = keys::NOTIFICATION_SETTINGS;

    fn key(&self) -> String {
        self.user_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub user_id: Uuid,
    pub show_profile: bool,
    pub show_participation_history: bool,
}

impl PrivacySettings {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            show_profile: true,
            show_participation_history: false,
        }
    }
}

impl Record for PrivacySettings {
    const COLLECTION: &'static str = keys::PRIVACY_SETTINGS;

    fn key(&self) -> String {
        self.user_id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorites {
    pub user_id: Uuid,
    pub event_ids: BTreeSet<Uuid>,
}

impl Record for Favorites {
    const COLLECTION: &'static str = keys::FAVORITES;

    fn key(&self) -> String {
        self.user_id.to_string()
    }
}
