use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Announcement, AnnouncementCategory};
use crate::store::{keys, LocalStore};

use super::{evict_oldest, require_text};

pub const DEFAULT_ANNOUNCEMENT_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
}

/// Bounded announcement list: inserting past capacity evicts the oldest.
#[derive(Clone)]
pub struct AnnouncementRepo {
    store: LocalStore,
    capacity: usize,
}

impl AnnouncementRepo {
    pub fn new(store: LocalStore, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub async fn create(&self, new: NewAnnouncement, now: DateTime<Utc>) -> StoreResult<Announcement> {
        require_text("title", &new.title)?;
        require_text("content", &new.content)?;

        let capacity = self.capacity;
        self.store
            .transaction(|tx| {
                let evicted = evict_oldest::<Announcement, _>(tx, capacity, |a| a.created_at)?;
                for old in &evicted {
                    info!(announcement_id = %old.id, "evicted oldest announcement");
                }

                let announcement = Announcement {
                    id: Uuid::new_v4(),
                    title: new.title,
                    content: new.content,
                    category: new.category,
                    is_active: true,
                    created_at: now,
                };
                tx.put(&announcement)?;
                Ok(announcement)
            })
            .await
    }

    /// Newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Announcement>> {
        let mut all = self.store.list::<Announcement>().await?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    pub async fn list_active(&self) -> StoreResult<Vec<Announcement>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|a| a.is_active)
            .collect())
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> StoreResult<Announcement> {
        self.store
            .transaction(|tx| {
                let mut announcement: Announcement = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::ANNOUNCEMENTS, id))?;
                announcement.is_active = is_active;
                tx.put(&announcement)?;
                Ok(announcement)
            })
            .await
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        if self.store.delete::<Announcement>(&id.to_string()).await? {
            Ok(())
        } else {
            Err(StoreError::not_found(keys::ANNOUNCEMENTS, id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn notice(title: &str) -> NewAnnouncement {
        NewAnnouncement {
            title: title.into(),
            content: "本文".into(),
            category: AnnouncementCategory::General,
        }
    }

    #[tokio::test]
    async fn eleventh_announcement_evicts_the_oldest() {
        let repo = AnnouncementRepo::new(LocalStore::in_memory(), DEFAULT_ANNOUNCEMENT_CAPACITY);
        let start = Utc::now();
        let mut first_id = None;
        for i in 0..11 {
            let created = repo
                .create(notice(&format!("n{i}")), start + Duration::minutes(i))
                .await
                .unwrap();
            first_id.get_or_insert(created.id);
        }

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), DEFAULT_ANNOUNCEMENT_CAPACITY);
        assert!(all.iter().all(|a| Some(a.id) != first_id));
        assert_eq!(all[0].title, "n10");
        assert_eq!(all.last().unwrap().title, "n1");
    }

    #[tokio::test]
    async fn inactive_announcements_are_hidden() {
        let repo = AnnouncementRepo::new(LocalStore::in_memory(), 5);
        let a = repo.create(notice("a"), Utc::now()).await.unwrap();
        repo.create(notice("b"), Utc::now()).await.unwrap();

        repo.set_active(a.id, false).await.unwrap();
        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "b");
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let repo = AnnouncementRepo::new(LocalStore::in_memory(), 5);
        assert!(repo.create(notice("  "), Utc::now()).await.is_err());
    }
}
