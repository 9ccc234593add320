use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Inquiry, InquiryCategory, InquiryStatus};
use crate::store::{keys, LocalStore};

use super::require_text;

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub category: InquiryCategory,
}

#[derive(Clone)]
pub struct InquiryRepo {
    store: LocalStore,
}

impl InquiryRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn submit(&self, new: NewInquiry, now: DateTime<Utc>) -> StoreResult<Inquiry> {
        require_text("name", &new.name)?;
        require_text("subject", &new.subject)?;
        require_text("message", &new.message)?;
        if !new.email.contains('@') {
            return Err(StoreError::InvalidInput(format!("invalid email: {}", new.email)));
        }

        let inquiry = Inquiry {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email.trim().to_string(),
            subject: new.subject,
            message: new.message,
            category: new.category,
            status: InquiryStatus::Open,
            reply: None,
            created_at: now,
            updated_at: now,
        };
        self.store.put(&inquiry).await?;
        Ok(inquiry)
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<Inquiry>> {
        self.store.get(&id.to_string()).await
    }

    /// Newest first.
    pub async fn list(&self, status: Option<InquiryStatus>) -> StoreResult<Vec<Inquiry>> {
        let mut inquiries: Vec<_> = self
            .store
            .list::<Inquiry>()
            .await?
            .into_iter()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .collect();
        inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inquiries)
    }

    pub async fn set_status(&self, id: Uuid, status: InquiryStatus, now: DateTime<Utc>) -> StoreResult<Inquiry> {
        self.modify(id, now, |inquiry| {
            if !inquiry.status.can_move_to(status) {
                return Err(StoreError::Conflict(format!(
                    "inquiry cannot move from {} back to {status}",
                    inquiry.status
                )));
            }
            inquiry.status = status;
            Ok(())
        })
        .await
    }

    /// Record a reply and close the inquiry.
    pub async fn reply(&self, id: Uuid, reply: String, now: DateTime<Utc>) -> StoreResult<Inquiry> {
        require_text("reply", &reply)?;
        self.modify(id, now, |inquiry| {
            inquiry.reply = Some(reply);
            inquiry.status = InquiryStatus::Resolved;
            Ok(())
        })
        .await
    }

    async fn modify<F>(&self, id: Uuid, now: DateTime<Utc>, f: F) -> StoreResult<Inquiry>
    where
        F: FnOnce(&mut Inquiry) -> StoreResult<()>,
    {
        self.store
            .transaction(|tx| {
                let mut inquiry: Inquiry = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::INQUIRIES, id))?;
                f(&mut inquiry)?;
                inquiry.updated_at = now;
                tx.put(&inquiry)?;
                Ok(inquiry)
            })
            .await
    }
}
