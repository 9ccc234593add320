use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{DemoUser, Role, User};
use crate::store::{keys, LocalStore};

use super::require_text;

pub const DEMO_EMAIL: &str = "demo@beachball.example";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct UserRepo {
    store: LocalStore,
}

impl UserRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Emails are unique, compared case-insensitively.
    pub async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> StoreResult<User> {
        require_text("name", &new_user.name)?;
        let email = new_user.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(StoreError::InvalidInput(format!("invalid email: {email}")));
        }

        self.store
            .transaction(|tx| {
                if tx.list::<User>()?.iter().any(|u| u.email == email) {
                    return Err(StoreError::Conflict(format!("{email} is already registered")));
                }
                let user = User {
                    id: Uuid::new_v4(),
                    email,
                    name: new_user.name.trim().to_string(),
                    role: new_user.role,
                    password_hash: new_user.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                tx.put(&user)?;
                Ok(user)
            })
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.store.get(&id.to_string()).await
    }

    pub async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .store
            .list::<User>()
            .await?
            .into_iter()
            .find(|u| u.email == email))
    }

    pub async fn list(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        let search = filter.search.map(|s| s.to_lowercase());
        let mut users: Vec<User> = self
            .store
            .list::<User>()
            .await?
            .into_iter()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .filter(|u| {
                search.as_deref().map_or(true, |s| {
                    u.name.to_lowercase().contains(s) || u.email.contains(s)
                })
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub async fn set_role(&self, id: Uuid, role: Role, now: DateTime<Utc>) -> StoreResult<User> {
        self.store
            .transaction(|tx| {
                let mut user: User = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::USERS, id))?;
                user.role = role;
                user.updated_at = now;
                tx.put(&user)?;
                Ok(user)
            })
            .await
    }

    pub async fn demo_user(&self) -> StoreResult<Option<User>> {
        match self.store.get::<DemoUser>(DemoUser::KEY).await? {
            Some(pointer) => self.get_by_id(pointer.user_id).await,
            None => Ok(None),
        }
    }

    /// The demo session user, created as a participant on first use.
    pub async fn ensure_demo_user(&self, now: DateTime<Utc>) -> StoreResult<User> {
        self.store
            .transaction(|tx| {
                if let Some(pointer) = tx.get::<DemoUser>(DemoUser::KEY)? {
                    if let Some(user) = tx.get::<User>(&pointer.user_id.to_string())? {
                        return Ok(user);
                    }
                }
                let user = User {
                    id: Uuid::new_v4(),
                    email: DEMO_EMAIL.to_string(),
                    name: "デモユーザー".to_string(),
                    role: Role::Participant,
                    password_hash: None,
                    created_at: now,
                    updated_at: now,
                };
                tx.put(&user)?;
                tx.put(&DemoUser { user_id: user.id })?;
                Ok(user)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.into(),
            name: "Hanako".into(),
            password_hash: None,
            role,
        }
    }

    #[tokio::test]
    async fn emails_are_unique_ignoring_case() {
        let repo = UserRepo::new(LocalStore::in_memory());
        repo.create(new_user("Hanako@Example.jp", Role::Participant), Utc::now())
            .await
            .unwrap();
        let err = repo
            .create(new_user("hanako@example.jp", Role::Participant), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(repo.get_by_email("HANAKO@example.jp").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_filters_by_role_and_search() {
        let repo = UserRepo::new(LocalStore::in_memory());
        repo.create(new_user("a@example.jp", Role::Participant), Utc::now())
            .await
            .unwrap();
        repo.create(new_user("b@example.jp", Role::Admin), Utc::now())
            .await
            .unwrap();

        let admins = repo
            .list(UserFilter {
                role: Some(Role::Admin),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(admins.len(), 1);

        let found = repo
            .list(UserFilter {
                search: Some("A@EXAMPLE".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "a@example.jp");
    }

    #[tokio::test]
    async fn demo_user_follows_role_changes() {
        let repo = UserRepo::new(LocalStore::in_memory());
        let demo = repo.ensure_demo_user(Utc::now()).await.unwrap();
        assert_eq!(repo.ensure_demo_user(Utc::now()).await.unwrap().id, demo.id);

        repo.set_role(demo.id, Role::Organizer, Utc::now()).await.unwrap();
        assert_eq!(repo.demo_user().await.unwrap().unwrap().role, Role::Organizer);
        assert_eq!(
            repo.ensure_demo_user(Utc::now()).await.unwrap().role,
            Role::Organizer
        );
    }

    #[tokio::test]
    async fn demo_pointer_to_a_missing_user_recreates_it() {
        let store = LocalStore::in_memory();
        let repo = UserRepo::new(store.clone());
        let stale = Uuid::new_v4();
        store.put(&DemoUser { user_id: stale }).await.unwrap();

        assert!(repo.demo_user().await.unwrap().is_none());
        let demo = repo.ensure_demo_user(Utc::now()).await.unwrap();
        assert_ne!(demo.id, stale);
        assert_eq!(repo.demo_user().await.unwrap().unwrap().id, demo.id);
    }
}
