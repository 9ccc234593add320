use std::sync::Arc;

use chrono::{DateTime, Utc};
use infra::db;
use infra::models::Role;
use infra::repos::{AnnouncementRepo, EventRepo, NewsRepo, UserRepo};
use infra::seed::seed_events;
use infra::{Clock, EventStore, LocalStore};
use tracing::{info, warn};

use crate::auth::JwtService;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: LocalStore,
    pub events: EventStore,
    pub config: Arc<AppConfig>,
    pub clock: Clock,
    jwt_service: JwtService,
}

impl AppState {
    /// Open the local store and, when configured, the events database.
    /// An unreachable database is logged and the app runs on local data.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = match &config.data_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "opening local store");
                LocalStore::open(dir.clone()).await?
            }
            None => LocalStore::in_memory(),
        };

        let remote = match &config.database_url {
            Some(url) => match connect_events_db(url).await {
                Ok(repo) => Some(repo),
                Err(err) => {
                    warn!(error = %err, "events database unavailable, using local events only");
                    None
                }
            },
            None => None,
        };

        let state = Self::from_parts(config, store, remote, Clock::System);
        state.bootstrap_super_admin().await?;
        Ok(state)
    }

    /// Promote the configured super-admin if that account already exists.
    /// Accounts registered later are promoted at registration.
    pub async fn bootstrap_super_admin(&self) -> anyhow::Result<()> {
        let Some(email) = self.config.super_admin_email.as_deref() else {
            return Ok(());
        };
        let users = UserRepo::new(self.store.clone());
        match users.get_by_email(email).await? {
            Some(user) if user.role != Role::SuperAdmin => {
                users.set_role(user.id, Role::SuperAdmin, self.now()).await?;
                info!(user_id = %user.id, "promoted configured super-admin");
            }
            Some(_) => {}
            None => info!(email, "super-admin will be promoted on registration"),
        }
        Ok(())
    }

    pub fn from_parts(
        config: AppConfig,
        store: LocalStore,
        remote: Option<EventRepo>,
        clock: Clock,
    ) -> Self {
        let jwt_service = JwtService::new(&config.auth);
        let events = EventStore::new(remote, store.clone(), seed_events());
        Self {
            store,
            events,
            config: Arc::new(config),
            clock,
            jwt_service,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn announcements(&self) -> AnnouncementRepo {
        AnnouncementRepo::new(self.store.clone(), self.config.announcement_capacity)
    }

    pub fn news(&self) -> NewsRepo {
        NewsRepo::new(self.store.clone(), self.config.news_capacity)
    }
}

async fn connect_events_db(url: &str) -> anyhow::Result<EventRepo> {
    let pool = db::connect(url).await?;
    db::migrate(&pool).await?;
    info!("connected to events database");
    Ok(EventRepo::new(pool))
}
