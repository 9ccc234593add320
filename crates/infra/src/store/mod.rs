pub mod local;

use serde::{de::DeserializeOwned, Serialize};

pub use local::{LocalStore, Tx};

/// Collection names. Each one is an id-keyed map persisted as a single JSON
/// document.
pub mod keys {
    pub const CREATED_EVENTS: &str = "created_events";
    pub const ANNOUNCEMENTS: &str = "announcements";
    pub const NEWS_ARTICLES: &str = "news_articles";
    pub const INQUIRIES: &str = "admin_inquiries";
    pub const ORGANIZER_APPLICATIONS: &str = "practice_requests";
    pub const PARTICIPATION_REQUESTS: &str = "practice_participation_requests";
    pub const DEMO_USER: &str = "demo_user";
    pub const USERS: &str = "users";
    pub const NOTIFICATION_SETTINGS: &str = "notification_settings";
    pub const PRIVACY_SETTINGS: &str = "privacy_settings";
    pub const FAVORITES: &str = "favorites";
    pub const VENUES: &str = "venues";
}

/// A value stored in one named collection under a string key.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn key(&self) -> String;
}
