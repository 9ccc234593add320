use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{NotificationSettings, PrivacySettings};
use crate::store::LocalStore;

/// Per-user preferences. Users without a stored record get the defaults.
#[derive(Clone)]
pub struct SettingsRepo {
    store: LocalStore,
}

impl SettingsRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn notification(&self, user_id: Uuid) -> StoreResult<NotificationSettings> {
        Ok(self
            .store
            .get::<NotificationSettings>(&user_id.to_string())
            .await?
            .unwrap_or_else(|| NotificationSettings::defaults_for(user_id)))
    }

    pub async fn save_notification(&self, settings: &NotificationSettings) -> StoreResult<()> {
        self.store.put(settings).await
    }

    pub async fn privacy(&self, user_id: Uuid) -> StoreResult<PrivacySettings> {
        Ok(self
            .store
            .get::<PrivacySettings>(&user_id.to_string())
            .await?
            .unwrap_or_else(|| PrivacySettings::defaults_for(user_id)))
    }

    pub async fn save_privacy(&self, settings: &PrivacySettings) -> StoreResult<()> {
        self.store.put(settings).await
    }
}
