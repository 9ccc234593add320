use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::Venue;
use crate::regions::is_known_prefecture;
use crate::store::{keys, LocalStore};

use super::require_text;

#[derive(Debug, Clone)]
pub struct NewVenue {
    pub name: String,
    pub address: String,
    pub prefecture: String,
    pub facilities: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub prefecture: Option<String>,
    pub facilities: Option<BTreeSet<String>>,
}

/// Venue directory. Venues are deactivated, never removed.
#[derive(Clone)]
pub struct VenueRepo {
    store: LocalStore,
}

fn validate(venue: &Venue) -> StoreResult<()> {
    require_text("name", &venue.name)?;
    require_text("address", &venue.address)?;
    if !is_known_prefecture(&venue.prefecture) {
        return Err(StoreError::InvalidInput(format!(
            "unknown prefecture: {}",
            venue.prefecture
        )));
    }
    Ok(())
}

fn clean_facilities(facilities: BTreeSet<String>) -> BTreeSet<String> {
    facilities
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

impl VenueRepo {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewVenue, now: DateTime<Utc>) -> StoreResult<Venue> {
        let venue = Venue {
            id: Uuid::new_v4(),
            name: new.name,
            address: new.address,
            prefecture: new.prefecture,
            facilities: clean_facilities(new.facilities),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        validate(&venue)?;
        self.store.put(&venue).await?;
        Ok(venue)
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<Venue>> {
        self.store.get(&id.to_string()).await
    }

    pub async fn update(&self, id: Uuid, patch: VenuePatch, now: DateTime<Utc>) -> StoreResult<Venue> {
        self.store
            .transaction(|tx| {
                let mut venue: Venue = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::VENUES, id))?;
                if let Some(name) = patch.name {
                    venue.name = name;
                }
                if let Some(address) = patch.address {
                    venue.address = address;
                }
                if let Some(prefecture) = patch.prefecture {
                    venue.prefecture = prefecture;
                }
                if let Some(facilities) = patch.facilities {
                    venue.facilities = clean_facilities(facilities);
                }
                venue.updated_at = now;
                validate(&venue)?;
                tx.put(&venue)?;
                Ok(venue)
            })
            .await
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool, now: DateTime<Utc>) -> StoreResult<Venue> {
        self.store
            .transaction(|tx| {
                let mut venue: Venue = tx
                    .get(&id.to_string())?
                    .ok_or_else(|| StoreError::not_found(keys::VENUES, id))?;
                venue.is_active = is_active;
                venue.updated_at = now;
                tx.put(&venue)?;
                Ok(venue)
            })
            .await
    }

    /// Active venues, optionally in one prefecture, sorted by name.
    pub async fn list_active(&self, prefecture: Option<&str>) -> StoreResult<Vec<Venue>> {
        let mut venues: Vec<_> = self
            .store
            .list::<Venue>()
            .await?
            .into_iter()
            .filter(|v| v.is_active)
            .filter(|v| prefecture.map_or(true, |p| v.prefecture == p))
            .collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    pub async fn list_all(&self) -> StoreResult<Vec<Venue>> {
        let mut venues = self.store.list::<Venue>().await?;
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }
}
