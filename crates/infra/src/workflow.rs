//! Pending/approved/rejected state machine shared by participation requests
//! and organizer applications.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{OrganizerApplication, ParticipationRequest, RequestStatus, Role, User};
use crate::store::{keys, Tx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

impl RequestStatus {
    /// The only allowed moves are pending -> approved and pending -> rejected.
    pub fn decide(self, decision: Decision) -> StoreResult<RequestStatus> {
        match self {
            RequestStatus::Pending => Ok(decision.target()),
            from => Err(StoreError::InvalidTransition {
                from,
                to: decision.target(),
            }),
        }
    }

    /// Pending and approved requests block a second request for the same target.
    pub fn is_open(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

pub fn decide_participation(
    request: &ParticipationRequest,
    decision: Decision,
    decided_by: Uuid,
    now: DateTime<Utc>,
) -> StoreResult<ParticipationRequest> {
    let status = request.status.decide(decision)?;
    Ok(ParticipationRequest {
        status,
        processed_at: Some(now),
        processed_by: Some(decided_by),
        ..request.clone()
    })
}

/// Both records touched by deciding an organizer application. Apply it with
/// [`ApplicationDecision::write`] inside one store transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDecision {
    pub application: OrganizerApplication,
    pub promoted_user: Option<User>,
}

impl ApplicationDecision {
    pub fn write(&self, tx: &mut Tx<'_>) -> StoreResult<()> {
        tx.put(&self.application)?;
        if let Some(user) = &self.promoted_user {
            tx.put(user)?;
        }
        Ok(())
    }
}

pub fn decide_application(
    application: &OrganizerApplication,
    applicant: Option<&User>,
    decision: Decision,
    decided_by: Uuid,
    now: DateTime<Utc>,
) -> StoreResult<ApplicationDecision> {
    let status = application.status.decide(decision)?;

    let promoted_user = match decision {
        Decision::Reject => None,
        Decision::Approve => {
            let user =
                applicant.ok_or_else(|| StoreError::not_found(keys::USERS, application.user_id))?;
            // Never lower an admin who happened to apply.
            (user.role < Role::Organizer).then(|| User {
                role: Role::Organizer,
                updated_at: now,
                ..user.clone()
            })
        }
    };

    Ok(ApplicationDecision {
        application: OrganizerApplication {
            status,
            processed_at: Some(now),
            processed_by: Some(decided_by),
            ..application.clone()
        },
        promoted_user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "taro@example.jp".into(),
            name: "Taro".into(),
            role,
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn application(user: &User) -> OrganizerApplication {
        OrganizerApplication {
            id: Uuid::new_v4(),
            user_id: user.id,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            reason: "weekly practice in Kamakura".into(),
            experience: None,
            plan: None,
            location: None,
            frequency: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
            processed_by: None,
        }
    }

    #[test]
    fn only_pending_can_be_decided() {
        use RequestStatus::*;
        assert_eq!(Pending.decide(Decision::Approve).unwrap(), Approved);
        assert_eq!(Pending.decide(Decision::Reject).unwrap(), Rejected);

        for from in [Approved, Rejected] {
            for decision in [Decision::Approve, Decision::Reject] {
                let err = from.decide(decision).unwrap_err();
                assert!(matches!(err, StoreError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn approval_promotes_participant() {
        let applicant = user(Role::Participant);
        let app = application(&applicant);
        let admin = Uuid::new_v4();

        let decision =
            decide_application(&app, Some(&applicant), Decision::Approve, admin, Utc::now())
                .unwrap();

        assert_eq!(decision.application.status, RequestStatus::Approved);
        assert_eq!(decision.application.processed_by, Some(admin));
        assert_eq!(decision.promoted_user.unwrap().role, Role::Organizer);
    }

    #[test]
    fn approval_never_demotes() {
        let applicant = user(Role::Admin);
        let app = application(&applicant);
        let decision =
            decide_application(&app, Some(&applicant), Decision::Approve, Uuid::new_v4(), Utc::now())
                .unwrap();
        assert!(decision.promoted_user.is_none());
    }

    #[test]
    fn rejection_leaves_user_untouched() {
        let applicant = user(Role::Participant);
        let app = application(&applicant);
        let decision =
            decide_application(&app, Some(&applicant), Decision::Reject, Uuid::new_v4(), Utc::now())
                .unwrap();
        assert_eq!(decision.application.status, RequestStatus::Rejected);
        assert!(decision.promoted_user.is_none());
    }

    #[test]
    fn approval_requires_the_applicant() {
        let applicant = user(Role::Participant);
        let app = application(&applicant);
        let err = decide_application(&app, None, Decision::Approve, Uuid::new_v4(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn decision_writes_both_records_together() {
        let store = LocalStore::in_memory();
        let applicant = user(Role::Participant);
        let app = application(&applicant);
        store.put(&applicant).await.unwrap();
        store.put(&app).await.unwrap();

        let decision =
            decide_application(&app, Some(&applicant), Decision::Approve, Uuid::new_v4(), Utc::now())
                .unwrap();
        store.transaction(|tx| decision.write(tx)).await.unwrap();

        let stored_user: User = store.get(&applicant.id.to_string()).await.unwrap().unwrap();
        let stored_app: OrganizerApplication = store.get(&app.id.to_string()).await.unwrap().unwrap();
        assert_eq!(stored_user.role, Role::Organizer);
        assert_eq!(stored_app.status, RequestStatus::Approved);
    }
}
