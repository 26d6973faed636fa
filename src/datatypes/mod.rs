//! Data model shared by all handlers and views
use thiserror::Error;

pub mod asset;
pub mod asset_handler;
pub mod category;
pub mod date_time_helper;

pub use asset::{Asset, AssetForm, ValidationError};
pub use asset_handler::AssetHandler;
pub use category::{Category, CategoryError};

/// Message shown for every transport or HTTP failure, the backend does not
/// provide structured error details.
pub const GENERIC_FAILURE_MESSAGE: &str = "request to asset service failed, please try again later";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("connection to asset service failed: {0}")]
    DataAccessFailure(String),
    #[error("asset service rejected request with status {0}")]
    RequestRejected(u16),
    #[error("invalid asset data: {0}")]
    InvalidAsset(#[from] ValidationError),
    #[error("could not find requested asset: {0}")]
    NotFound(String),
    #[error("no asset is waiting for delete confirmation")]
    NoPendingDelete,
    #[error("no asset is currently being edited")]
    NotEditing,
}

impl DataError {
    /// Text for the transient notice shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::DataAccessFailure(_) | Self::RequestRejected(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::RequestRejected(status.as_u16()),
            None => Self::DataAccessFailure(err.to_string()),
        }
    }
}

pub trait DataItem {
    // get id or return error if id hasn't been set yet
    fn get_id(&self) -> Result<i32, DataError>;
    // set id or return error if id has already been set
    fn set_id(&mut self, id: i32) -> Result<(), DataError>;
}
