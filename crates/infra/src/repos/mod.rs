pub mod announcements;
pub mod events;
pub mod favorites;
pub mod inquiries;
pub mod news;
pub mod organizer_applications;
pub mod participation_requests;
pub mod settings;
pub mod users;
pub mod venues;

pub use announcements::{AnnouncementRepo, NewAnnouncement};
pub use events::EventRepo;
pub use favorites::FavoritesRepo;
pub use inquiries::{InquiryRepo, NewInquiry};
pub use news::{NewNewsArticle, NewsPatch, NewsRepo};
pub use organizer_applications::{NewOrganizerApplication, OrganizerApplicationRepo};
pub use participation_requests::{NewParticipationRequest, ParticipationRequestRepo};
pub use settings::SettingsRepo;
pub use users::{NewUser, UserFilter, UserRepo};
pub use venues::{NewVenue, VenuePatch, VenueRepo};

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::store::{Record, Tx};

/// Drop the oldest records until one more fits under `capacity`.
/// Returns what was evicted.
pub(crate) fn evict_oldest<T, F>(tx: &mut Tx<'_>, capacity: usize, created_at: F) -> StoreResult<Vec<T>>
where
    T: Record,
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut records = tx.list::<T>()?;
    records.sort_by_key(|r| created_at(r));

    let keep = capacity.max(1) - 1;
    let excess = records.len().saturating_sub(keep);
    let evicted: Vec<T> = records.into_iter().take(excess).collect();
    for record in &evicted {
        tx.delete::<T>(&record.key());
    }
    Ok(evicted)
}

pub(crate) fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(crate::error::StoreError::InvalidInput(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}
