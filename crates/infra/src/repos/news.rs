use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{NewsArticle, NewsCategory};
use crate::store::{keys, LocalStore};

use super::{evict_oldest, require_text};

pub const DEFAULT_NEWS_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
pub struct NewNewsArticle {
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub category: NewsCategory,
    pub publish: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewsPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub category: Option<NewsCategory>,
}

#[derive(Clone)]
pub struct NewsRepo {
    store: LocalStore,
    capacity: usize,
}

impl NewsRepo {
    pub fn new(store: LocalStore, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub async fn create(&self, new: NewNewsArticle, now: DateTime<Utc>) -> StoreResult<NewsArticle> {
        require_text("title", &new.title)?;
        require_text("body", &new.body)?;

        let capacity = self.capacity;
        self.store
            .transaction(|tx| {
                for old in evict_oldest::<NewsArticle, _>(tx, capacity, |n| n.created_at)? {
                    info!(article_id = %old.id, "evicted oldest news article");
                }

                let article = NewsArticle {
                    id: Uuid::new_v4(),
                    title: new.title,
                    summary: new.summary,
                    body: new.body,
                    category: new.category,
                    is_published: new.publish,
                    published_at: new.publish.then_some(now),
                    created_at: now,
                    updated_at: now,
                };
                tx.put(&article)?;
                Ok(article)
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<NewsArticle>> {
        self.store.get(&id.to_string()).await
    }

    pub async fn update(&self, id: Uuid, patch: NewsPatch, now: DateTime<Utc>) -> StoreResult<NewsArticle> {
        self.modify(id, |article| {
            if let Some(title) = patch.title {
                require_text("title", &title)?;
                article.title = title;
            }
            if let Some(summary) = patch.summary {
                article.summary = Some(summary);
            }
            if let Some(body) = patch.body {
                require_text("body", &body)?;
                article.body = body;
            }
            if let Some(category) = patch.category {
                article.category = category;
            }
            article.updated_at = now;
            Ok(())
        })
        .await
    }

    /// The first publication time is kept when an article is re-published.
    pub async fn set_published(&self, id: Uuid, published: bool, now: DateTime<Utc>) -> StoreResult<NewsArticle> {
        self.modify(id, |article| {
            article.is_published = published;
            if published && article.published_at.is_none() {
                article.published_at = Some(now);
            }
            article.updated_at = now;
            Ok(())
        })
        .await
    }

    async fn modify<F>(&self, id: Uuid, f: F) -> StoreResult<NewsArticle>
    where
        F: FnOnce(&mut NewsArticle) -> StoreResult<()>,
    {
        self.store
            .transaction(|tx| {
                let mut article: NewsArticle = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::NEWS_ARTICLES, id))?;
                f(&mut article)?;
                tx.put(&article)?;
                Ok(article)
            })
            .await
    }

    /// Published articles, most recently published first.
    pub async fn list_published(&self) -> StoreResult<Vec<NewsArticle>> {
        let mut published: Vec<_> = self
            .store
            .list::<NewsArticle>()
            .await?
            .into_iter()
            .filter(|n| n.is_published)
            .collect();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(published)
    }

    pub async fn list_all(&self) -> StoreResult<Vec<NewsArticle>> {
        let mut all = self.store.list::<NewsArticle>().await?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        if self.store.delete::<NewsArticle>(&id.to_string()).await? {
            Ok(())
        } else {
            Err(StoreError::not_found(keys::NEWS_ARTICLES, id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(title: &str) -> NewNewsArticle {
        NewNewsArticle {
            title: title.into(),
            summary: None,
            body: "大会結果のお知らせ".into(),
            category: NewsCategory::Tournament,
            publish: false,
        }
    }

    #[tokio::test]
    async fn drafts_stay_hidden_until_published() {
        let repo = NewsRepo::new(LocalStore::in_memory(), DEFAULT_NEWS_CAPACITY);
        let now = Utc::now();
        let article = repo.create(draft("結果"), now).await.unwrap();
        assert!(repo.list_published().await.unwrap().is_empty());

        let published = repo.set_published(article.id, true, now + Duration::hours(1)).await.unwrap();
        assert_eq!(published.published_at, Some(now + Duration::hours(1)));

        repo.set_published(article.id, false, now + Duration::hours(2)).await.unwrap();
        let republished = repo.set_published(article.id, true, now + Duration::hours(3)).await.unwrap();
        assert_eq!(republished.published_at, Some(now + Duration::hours(1)));
        assert_eq!(repo.list_published().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_blank_body_and_keeps_record() {
        let repo = NewsRepo::new(LocalStore::in_memory(), DEFAULT_NEWS_CAPACITY);
        let article = repo.create(draft("結果"), Utc::now()).await.unwrap();
        let patch = NewsPatch {
            body: Some(" ".into()),
            ..Default::default()
        };
        assert!(repo.update(article.id, patch, Utc::now()).await.is_err());
        assert_eq!(repo.get(article.id).await.unwrap().unwrap().body, article.body);
    }

    #[tokio::test]
    async fn capacity_is_enforced() {
        let repo = NewsRepo::new(LocalStore::in_memory(), 2);
        let start = Utc::now();
        for i in 0..3 {
            repo.create(draft(&format!("a{i}")), start + Duration::minutes(i)).await.unwrap();
        }
        let titles: Vec<_> = repo.list_all().await.unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["a2", "a1"]);
    }
}
