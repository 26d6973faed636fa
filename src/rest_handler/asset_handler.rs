use async_trait::async_trait;
use log::debug;

use super::RestAssetHandler;
use crate::datatypes::{Asset, AssetHandler, DataError, DataItem};

#[async_trait]
impl AssetHandler for RestAssetHandler {
    async fn get_all_assets(&self) -> Result<Vec<Asset>, DataError> {
        debug!("fetching all assets");
        let resp = self.client.get(self.collection_url()).send().await?;
        let assets = Self::check_status(resp)?.json().await?;
        Ok(assets)
    }

    async fn get_asset_by_id(&self, id: i32) -> Result<Asset, DataError> {
        let resp = self.client.get(self.item_url(id)).send().await?;
        Ok(Self::check_status(resp)?.json().await?)
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<Asset, DataError> {
        debug!("creating asset '{}'", asset.name);
        let resp = self
            .client
            .post(self.collection_url())
            .json(&asset.payload())
            .send()
            .await?;
        Ok(Self::check_status(resp)?.json().await?)
    }

    async fn update_asset(&self, asset: &Asset) -> Result<Asset, DataError> {
        let id = asset.get_id()?;
        debug!("updating asset {}", id);
        let resp = self
            .client
            .put(self.item_url(id))
            .json(&asset.payload())
            .send()
            .await?;
        Ok(Self::check_status(resp)?.json().await?)
    }

    async fn delete_asset(&self, id: i32) -> Result<(), DataError> {
        debug!("deleting asset {}", id);
        let resp = self.client.delete(self.item_url(id)).send().await?;
        Self::check_status(resp)?;
        Ok(())
    }
}
