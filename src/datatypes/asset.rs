//! Implementation of a container for basic asset data
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::date_time_helper::{self, parse_date, DateTimeError};
use super::{Category, CategoryError, DataError, DataItem};

/// Reasons for rejecting asset data before any request is sent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("asset value must be greater than zero")]
    NonPositiveValue,
    #[error("'{0}' is not a valid amount")]
    InvalidValue(String),
    #[error("invalid purchase date")]
    InvalidDate(#[from] DateTimeError),
    #[error("invalid category")]
    InvalidCategory(#[from] CategoryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: String,
    pub category: Category,
    pub value: f64,
    #[serde(with = "date_time_helper::iso_date")]
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for creating or updating an asset, the id travels in the URL
#[derive(Debug, Serialize)]
pub struct AssetPayload<'a> {
    pub name: &'a str,
    pub category: &'a Category,
    pub value: f64,
    #[serde(serialize_with = "date_time_helper::iso_date::serialize")]
    pub purchase_date: NaiveDate,
    pub description: Option<&'a str>,
}

impl Asset {
    pub fn new(
        id: Option<i32>,
        name: &str,
        category: Category,
        value: f64,
        purchase_date: NaiveDate,
        description: Option<String>,
    ) -> Asset {
        Asset {
            id,
            name: name.to_string(),
            category,
            value,
            purchase_date,
            description,
        }
    }

    /// Check the invariants every stored asset must satisfy
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.category.name().trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        if self.value.is_infinite() {
            return Err(ValidationError::InvalidValue(self.value.to_string()));
        }
        // also catches NaN
        if !(self.value > 0.0) {
            return Err(ValidationError::NonPositiveValue);
        }
        Ok(())
    }

    pub fn payload(&self) -> AssetPayload<'_> {
        AssetPayload {
            name: &self.name,
            category: &self.category,
            value: self.value,
            purchase_date: self.purchase_date,
            description: self.description.as_deref(),
        }
    }
}

impl DataItem for Asset {
    // get id or return error if id hasn't been set yet
    fn get_id(&self) -> Result<i32, DataError> {
        match self.id {
            Some(id) => Ok(id),
            None => Err(DataError::NotFound(
                "tried to get id of temporary asset".to_string(),
            )),
        }
    }
    // set id or return error if id has already been set
    fn set_id(&mut self, id: i32) -> Result<(), DataError> {
        match self.id {
            Some(_) => Err(DataError::DataAccessFailure(
                "tried to change valid asset id".to_string(),
            )),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }
}

/// Raw user input for creating or editing an asset.
/// All fields are kept as typed; [`AssetForm::to_asset`] turns them into an
/// asset or explains what is wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetForm {
    pub name: String,
    pub category: String,
    pub value: String,
    pub purchase_date: String,
    pub description: String,
}

impl AssetForm {
    /// Prefill the form with an existing asset
    pub fn from_asset(asset: &Asset) -> AssetForm {
        AssetForm {
            name: asset.name.clone(),
            category: asset.category.name().to_string(),
            value: asset.value.to_string(),
            purchase_date: asset.purchase_date.format("%Y-%m-%d").to_string(),
            description: asset.description.clone().unwrap_or_default(),
        }
    }

    pub fn to_asset(&self, id: Option<i32>) -> Result<Asset, ValidationError> {
        let name = required(&self.name, "name")?;
        let category = Category::from_str(required(&self.category, "category")?)?;
        let value_str = required(&self.value, "value")?;
        let value: f64 = value_str
            .parse()
            .map_err(|_| ValidationError::InvalidValue(value_str.to_string()))?;
        let purchase_date = parse_date(required(&self.purchase_date, "purchase_date")?)?;
        let description = match self.description.trim() {
            "" => None,
            text => Some(text.to_string()),
        };
        let asset = Asset::new(id, name, category, value, purchase_date, description);
        asset.validate()?;
        Ok(asset)
    }

    pub fn clear(&mut self) {
        *self = AssetForm::default();
    }
}

fn required<'a>(field: &'a str, name: &'static str) -> Result<&'a str, ValidationError> {
    match field.trim() {
        "" => Err(ValidationError::MissingField(name)),
        text => Ok(text),
    }
}
