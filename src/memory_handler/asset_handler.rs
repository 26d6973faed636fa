use async_trait::async_trait;

use super::InMemoryDB;
use crate::datatypes::{Asset, AssetHandler, DataError, DataItem};

fn not_found(id: i32) -> DataError {
    DataError::NotFound(format!("asset id {} not found in database", id))
}

#[async_trait]
impl AssetHandler for InMemoryDB {
    async fn get_all_assets(&self) -> Result<Vec<Asset>, DataError> {
        Ok(self.read()?.assets.values().cloned().collect())
    }

    async fn get_asset_by_id(&self, id: i32) -> Result<Asset, DataError> {
        self.read()?
            .assets
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<Asset, DataError> {
        let mut storage = self.write()?;
        Self::store_new(&mut storage, asset)
    }

    async fn update_asset(&self, asset: &Asset) -> Result<Asset, DataError> {
        let id = asset.get_id()?;
        let mut storage = self.write()?;
        match storage.assets.get_mut(&id) {
            Some(stored) => {
                *stored = asset.clone();
                Ok(asset.clone())
            }
            None => Err(not_found(id)),
        }
    }

    async fn delete_asset(&self, id: i32) -> Result<(), DataError> {
        self.write()?
            .assets
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}
