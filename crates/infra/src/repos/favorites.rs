use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::Favorites;
use crate::store::LocalStore;

#[derive(Clone)]
pub struct FavoritesRepo {
    store: LocalStore,
}

impl FavoritesRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: Uuid) -> StoreResult<BTreeSet<Uuid>> {
        Ok(self
            .store
            .get::<Favorites>(&user_id.to_string())
            .await?
            .map(|f| f.event_ids)
            .unwrap_or_default())
    }

    /// Flip an event in or out of the user's favorites. Returns whether it is
    /// now a favorite.
    pub async fn toggle(&self, user_id: Uuid, event_id: Uuid) -> StoreResult<bool> {
        self.store
            .transaction(|tx| {
                let mut favorites = tx
                    .get::<Favorites>(&user_id.to_string())?
                    .unwrap_or(Favorites {
                        user_id,
                        event_ids: BTreeSet::new(),
                    });
                let added = if favorites.event_ids.remove(&event_id) {
                    false
                } else {
                    favorites.event_ids.insert(event_id)
                };
                tx.put(&favorites)?;
                Ok(added)
            })
            .await
    }
}
