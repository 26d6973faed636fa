use async_trait::async_trait;

use super::{Asset, DataError};

/// Handler for the asset records owned by the backend
#[async_trait]
pub trait AssetHandler {
    /// Return the full list of assets in backend order
    async fn get_all_assets(&self) -> Result<Vec<Asset>, DataError>;
    async fn get_asset_by_id(&self, id: i32) -> Result<Asset, DataError>;
    /// Store a new asset, the backend assigns the id of the returned asset
    async fn insert_asset(&self, asset: &Asset) -> Result<Asset, DataError>;
    /// Replace the asset with the id of `asset`
    async fn update_asset(&self, asset: &Asset) -> Result<Asset, DataError>;
    async fn delete_asset(&self, id: i32) -> Result<(), DataError>;
}
