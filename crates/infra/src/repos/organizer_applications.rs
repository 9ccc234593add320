use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{OrganizerApplication, RequestStatus, Role, User};
use crate::store::{keys, LocalStore};
use crate::workflow::{decide_application, ApplicationDecision, Decision};

use super::require_text;

#[derive(Debug, Clone)]
pub struct NewOrganizerApplication {
    pub reason: String,
    pub experience: Option<String>,
    pub plan: Option<String>,
    pub location: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Clone)]
pub struct OrganizerApplicationRepo {
    store: LocalStore,
}

impl OrganizerApplicationRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        applicant: &User,
        new_application: NewOrganizerApplication,
        now: DateTime<Utc>,
    ) -> StoreResult<OrganizerApplication> {
        require_text("reason", &new_application.reason)?;
        if applicant.role >= Role::Organizer {
            return Err(StoreError::Conflict(
                "user can already organize events".into(),
            ));
        }

        self.store
            .transaction(|tx| {
                let pending = tx
                    .list::<OrganizerApplication>()?
                    .into_iter()
                    .any(|a| a.user_id == applicant.id && a.status == RequestStatus::Pending);
                if pending {
                    return Err(StoreError::Conflict(
                        "an application is already pending".into(),
                    ));
                }

                let application = OrganizerApplication {
                    id: Uuid::new_v4(),
                    user_id: applicant.id,
                    user_name: applicant.name.clone(),
                    user_email: applicant.email.clone(),
                    reason: new_application.reason,
                    experience: new_application.experience,
                    plan: new_application.plan,
                    location: new_application.location,
                    frequency: new_application.frequency,
                    status: RequestStatus::Pending,
                    created_at: now,
                    processed_at: None,
                    processed_by: None,
                };
                tx.put(&application)?;
                Ok(application)
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<OrganizerApplication>> {
        self.store.get(&id.to_string()).await
    }

    pub async fn list(&self, status: Option<RequestStatus>) -> StoreResult<Vec<OrganizerApplication>> {
        let mut applications: Vec<_> = self
            .store
            .list::<OrganizerApplication>()
            .await?
            .into_iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .collect();
        applications.sort_by_key(|a| a.created_at);
        Ok(applications)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<OrganizerApplication>> {
        let mut applications: Vec<_> = self
            .store
            .list::<OrganizerApplication>()
            .await?
            .into_iter()
            .filter(|a| a.user_id == user_id)
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    /// Decide an application. The application and the promoted user are
    /// written in one transaction.
    pub async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        decided_by: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<ApplicationDecision> {
        self.store
            .transaction(|tx| {
                let application: OrganizerApplication = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::ORGANIZER_APPLICATIONS, id))?;
                let applicant: Option<User> = tx.get(&application.user_id.to_string())?;

                let outcome =
                    decide_application(&application, applicant.as_ref(), decision, decided_by, now)?;
                outcome.write(tx)?;
                Ok(outcome)
            })
            .await
    }
}
