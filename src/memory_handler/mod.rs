//! Implementation of in-memory data handler
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::datatypes::{Asset, DataError, DataItem};

mod asset_handler;

struct Storage {
    assets: BTreeMap<i32, Asset>,
    next_asset_id: i32,
}

/// Struct to store assets in memory, ids are assigned in insertion order
/// starting with 1, like the auto increment key of the backend database.
pub struct InMemoryDB {
    storage: RwLock<Storage>,
}

impl InMemoryDB {
    pub fn new() -> InMemoryDB {
        InMemoryDB {
            storage: RwLock::new(Storage {
                assets: BTreeMap::new(),
                next_asset_id: 1,
            }),
        }
    }

    /// Create a database filled with the given assets, ignoring their ids
    pub fn with_assets(assets: &[Asset]) -> Result<InMemoryDB, DataError> {
        let db = InMemoryDB::new();
        {
            let mut storage = db.write()?;
            for asset in assets {
                Self::store_new(&mut storage, asset)?;
            }
        }
        Ok(db)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Storage>, DataError> {
        self.storage
            .read()
            .map_err(|_| DataError::DataAccessFailure("in-memory storage is poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Storage>, DataError> {
        self.storage
            .write()
            .map_err(|_| DataError::DataAccessFailure("in-memory storage is poisoned".to_string()))
    }

    // Ids sent by the caller are ignored, the database assigns them
    fn store_new(storage: &mut Storage, asset: &Asset) -> Result<Asset, DataError> {
        let id = storage.next_asset_id;
        let mut stored = Asset {
            id: None,
            ..asset.clone()
        };
        stored.set_id(id)?;
        storage.next_asset_id += 1;
        storage.assets.insert(id, stored.clone());
        Ok(stored)
    }
}

impl Default for InMemoryDB {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{AssetHandler, Category};
    use chrono::NaiveDate;

    fn chair() -> Asset {
        Asset::new(
            None,
            "Office chair",
            Category::OfficeSupplies,
            8500.0,
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap(),
            Some("Aeron".to_string()),
        )
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let db = InMemoryDB::new();
        let stored = db.insert_asset(&chair()).await.unwrap();
        assert_eq!(stored.id, Some(1));
        let second = db.insert_asset(&chair()).await.unwrap();
        assert_eq!(second.id, Some(2));

        let mut changed = stored.clone();
        changed.value = 9000.0;
        db.update_asset(&changed).await.unwrap();
        assert_eq!(db.get_asset_by_id(1).await.unwrap().value, 9000.0);

        db.delete_asset(1).await.unwrap();
        let all = db.get_all_assets().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, Some(2));

        // ids are never reused
        assert_eq!(db.insert_asset(&chair()).await.unwrap().id, Some(3));

        // an id sent along is replaced by the next free one
        let mut with_id = chair();
        with_id.id = Some(42);
        assert_eq!(db.insert_asset(&with_id).await.unwrap().id, Some(4));
        assert!(db.get_asset_by_id(42).await.is_err());
    }

    #[tokio::test]
    async fn missing_assets_are_reported() {
        let db = InMemoryDB::with_assets(&[chair()]).unwrap();
        assert!(matches!(db.get_asset_by_id(9).await, Err(DataError::NotFound(_))));
        assert!(matches!(db.delete_asset(9).await, Err(DataError::NotFound(_))));
        let mut ghost = chair();
        ghost.id = Some(9);
        assert!(matches!(db.update_asset(&ghost).await, Err(DataError::NotFound(_))));
        let unsaved = chair();
        assert!(db.update_asset(&unsaved).await.is_err());
    }
}
