use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CategoryError {
    #[error("category must not be empty")]
    Empty,
    #[error("unknown asset category '{0}'")]
    Unknown(String),
}

/// Asset category as used by the backend.
///
/// The backend stores the category as free text, the known set below is what
/// the entry forms offer. Categories outside that set are kept verbatim when
/// they are read from the backend, so the local cache always mirrors it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Electronics,
    OfficeSupplies,
    Furniture,
    Vehicles,
    RealEstate,
    Other,
    Unlisted(String),
}

impl Category {
    /// All categories a new asset may be filed under.
    pub const KNOWN: [Category; 6] = [
        Category::Electronics,
        Category::OfficeSupplies,
        Category::Furniture,
        Category::Vehicles,
        Category::RealEstate,
        Category::Other,
    ];

    /// Name of the category on the wire
    pub fn name(&self) -> &str {
        match self {
            Self::Electronics => "电子设备",
            Self::OfficeSupplies => "办公用品",
            Self::Furniture => "家具",
            Self::Vehicles => "车辆",
            Self::RealEstate => "房产",
            Self::Other => "其他",
            Self::Unlisted(name) => name,
        }
    }

    /// ASCII key used for styling and as command line alias
    pub fn key(&self) -> &str {
        match self {
            Self::Electronics => "electronics",
            Self::OfficeSupplies => "office",
            Self::Furniture => "furniture",
            Self::Vehicles => "vehicles",
            Self::RealEstate => "real-estate",
            Self::Other => "other",
            Self::Unlisted(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unlisted(_))
    }

    /// Map any non-empty text to a category, keeping unknown names as `Unlisted`
    pub fn from_wire(name: &str) -> Result<Category, CategoryError> {
        match Category::from_str(name) {
            Ok(category) => Ok(category),
            Err(CategoryError::Unknown(name)) => Ok(Category::Unlisted(name)),
            Err(err) => Err(err),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts the wire name or the ASCII key (case insensitive) of a known category
impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Category, CategoryError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CategoryError::Empty);
        }
        Category::KNOWN
            .iter()
            .find(|c| c.name() == s || c.key().eq_ignore_ascii_case(s))
            .cloned()
            .ok_or_else(|| CategoryError::Unknown(s.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

struct CategoryVisitor;

impl<'de> Visitor<'de> for CategoryVisitor {
    type Value = Category;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-empty category name")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Category::from_wire(value).map_err(|err| E::custom(format!("{}", err)))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Category, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(CategoryVisitor)
    }
}
