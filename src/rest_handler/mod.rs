//! Asset handler talking to the REST backend
use std::time::Duration;

use log::debug;
use reqwest::{Client, Response};

use crate::datatypes::DataError;

mod asset_handler;

/// Path of the asset collection relative to the service root
pub const ASSET_PATH: &str = "/api/assets";

pub struct RestAssetHandler {
    client: Client,
    base_url: String,
}

impl RestAssetHandler {
    /// Create a handler for the service reachable under `base_url`,
    /// e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: &str, timeout: Duration) -> Result<RestAssetHandler, DataError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(RestAssetHandler {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, ASSET_PATH)
    }

    fn item_url(&self, id: i32) -> String {
        format!("{}{}/{}", self.base_url, ASSET_PATH, id)
    }

    /// Any status outside 2xx counts as failure, the body is not inspected
    fn check_status(resp: Response) -> Result<Response, DataError> {
        let status = resp.status();
        debug!("asset service answered {} for {}", status, resp.url());
        if !status.is_success() {
            return Err(DataError::RequestRejected(status.as_u16()));
        }
        Ok(resp)
    }
}
