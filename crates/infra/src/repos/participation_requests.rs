use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{ParticipationRequest, RequestStatus};
use crate::store::{keys, LocalStore};
use crate::workflow::{decide_participation, Decision};

#[derive(Debug, Clone)]
pub struct NewParticipationRequest {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct ParticipationRequestRepo {
    store: LocalStore,
}

impl ParticipationRequestRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// A user holds at most one pending or approved request per event.
    pub async fn create(
        &self,
        new_request: NewParticipationRequest,
        now: DateTime<Utc>,
    ) -> StoreResult<ParticipationRequest> {
        self.store
            .transaction(|tx| {
                let duplicate = tx.list::<ParticipationRequest>()?.into_iter().any(|r| {
                    r.event_id == new_request.event_id
                        && r.user_id == new_request.user_id
                        && r.status.is_open()
                });
                if duplicate {
                    return Err(StoreError::Conflict(
                        "a request for this event is already open".into(),
                    ));
                }

                let request = ParticipationRequest {
                    id: Uuid::new_v4(),
                    event_id: new_request.event_id,
                    user_id: new_request.user_id,
                    user_name: new_request.user_name,
                    user_email: new_request.user_email,
                    message: new_request.message.filter(|m| !m.trim().is_empty()),
                    status: RequestStatus::Pending,
                    created_at: now,
                    processed_at: None,
                    processed_by: None,
                };
                tx.put(&request)?;
                Ok(request)
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<ParticipationRequest>> {
        self.store.get(&id.to_string()).await
    }

    /// Oldest first, the order an organizer works through them.
    pub async fn list_for_event(&self, event_id: Uuid) -> StoreResult<Vec<ParticipationRequest>> {
        let mut requests: Vec<_> = self
            .store
            .list::<ParticipationRequest>()
            .await?
            .into_iter()
            .filter(|r| r.event_id == event_id)
            .collect();
        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ParticipationRequest>> {
        let mut requests: Vec<_> = self
            .store
            .list::<ParticipationRequest>()
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    pub async fn approved_count(&self, event_id: Uuid) -> StoreResult<usize> {
        Ok(self
            .list_for_event(event_id)
            .await?
            .iter()
            .filter(|r| r.status == RequestStatus::Approved)
            .count())
    }

    /// Decide a pending request. Approval fails once `capacity` approved
    /// requests exist for the event.
    pub async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        decided_by: Uuid,
        capacity: Option<i32>,
        now: DateTime<Utc>,
    ) -> StoreResult<ParticipationRequest> {
        self.store
            .transaction(|tx| {
                let request: ParticipationRequest = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::PARTICIPATION_REQUESTS, id))?;

                if let (Decision::Approve, Some(capacity)) = (decision, capacity) {
                    let approved = tx
                        .list::<ParticipationRequest>()?
                        .iter()
                        .filter(|r| r.event_id == request.event_id)
                        .filter(|r| r.status == RequestStatus::Approved)
                        .count();
                    if approved >= usize::try_from(capacity).unwrap_or(0) {
                        return Err(StoreError::Conflict("the event is full".into()));
                    }
                }

                let decided = decide_participation(&request, decision, decided_by, now)?;
                tx.put(&decided)?;
                Ok(decided)
            })
            .await
    }

    /// Physically remove a request.
    pub async fn remove(&self, id: Uuid) -> StoreResult<ParticipationRequest> {
        self.store
            .transaction(|tx| {
                let request: ParticipationRequest = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::PARTICIPATION_REQUESTS, id))?;
                tx.delete::<ParticipationRequest>(&id.to_string());
                Ok(request)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_request(event_id: Uuid, user_id: Uuid) -> NewParticipationRequest {
        NewParticipationRequest {
            event_id,
            user_id,
            user_name: "Kenta".into(),
            user_email: "kenta@example.jp".into(),
            message: Some("初参加です".into()),
        }
    }

    #[tokio::test]
    async fn second_open_request_is_refused() {
        let repo = ParticipationRequestRepo::new(LocalStore::in_memory());
        let (event, user) = (Uuid::new_v4(), Uuid::new_v4());

        repo.create(new_request(event, user), Utc::now()).await.unwrap();
        let err = repo
            .create(new_request(event, user), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejected_request_can_be_renewed() {
        let repo = ParticipationRequestRepo::new(LocalStore::in_memory());
        let (event, user) = (Uuid::new_v4(), Uuid::new_v4());
        let first = repo.create(new_request(event, user), Utc::now()).await.unwrap();
        repo.decide(first.id, Decision::Reject, Uuid::new_v4(), None, Utc::now())
            .await
            .unwrap();

        assert!(repo.create(new_request(event, user), Utc::now()).await.is_ok());
        assert_eq!(repo.list_for_event(event).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn decided_request_cannot_be_decided_again() {
        let repo = ParticipationRequestRepo::new(LocalStore::in_memory());
        let request = repo
            .create(new_request(Uuid::new_v4(), Uuid::new_v4()), Utc::now())
            .await
            .unwrap();
        let organizer = Uuid::new_v4();

        let approved = repo
            .decide(request.id, Decision::Approve, organizer, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.processed_by, Some(organizer));
        assert!(approved.processed_at.is_some());

        let err = repo
            .decide(request.id, Decision::Reject, organizer, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(
            repo.get(request.id).await.unwrap().unwrap().status,
            RequestStatus::Approved
        );
    }

    #[tokio::test]
    async fn approval_respects_capacity() {
        let repo = ParticipationRequestRepo::new(LocalStore::in_memory());
        let event = Uuid::new_v4();
        let a = repo.create(new_request(event, Uuid::new_v4()), Utc::now()).await.unwrap();
        let b = repo.create(new_request(event, Uuid::new_v4()), Utc::now()).await.unwrap();

        repo.decide(a.id, Decision::Approve, Uuid::new_v4(), Some(1), Utc::now())
            .await
            .unwrap();
        let err = repo
            .decide(b.id, Decision::Approve, Uuid::new_v4(), Some(1), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.approved_count(event).await.unwrap(), 1);

        // Rejecting is always possible.
        repo.decide(b.id, Decision::Reject, Uuid::new_v4(), Some(1), Utc::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_the_record() {
        let repo = ParticipationRequestRepo::new(LocalStore::in_memory());
        let request = repo
            .create(new_request(Uuid::new_v4(), Uuid::new_v4()), Utc::now())
            .await
            .unwrap();
        repo.remove(request.id).await.unwrap();
        assert!(repo.get(request.id).await.unwrap().is_none());
        assert!(repo.remove(request.id).await.is_err());
    }
}
