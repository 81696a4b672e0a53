use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Output columns, in the order they are written.
pub const COLUMNS: [&str; 12] = [
    "市",
    "種別",
    "価格（万円）",
    "間取り",
    "専有面積（㎡）",
    "土地面積（㎡）",
    "建物面積（㎡）",
    "築年月",
    "交通",
    "所在地",
    "物件名",
    "URL",
];

/// A municipality as the search site knows it: display name plus the
/// municipality code used in the `sc` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub code: String,
}

/// A property category: display name plus the `bs` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyKind {
    pub name: String,
    pub code: String,
}

impl City {
    pub fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
        }
    }
}

impl PropertyKind {
    pub fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
        }
    }
}

/// One (city, property type) pair the crawler paginates through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub city: City,
    pub kind: PropertyKind,
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.city.name, self.kind.name)
    }
}

/// One property advertisement taken from a result page.
///
/// Only built by the page parser, and only once a positive price was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub city: String,
    pub property_type: String,
    /// Asking price in 万円.
    pub price: f64,
    pub layout: String,
    pub exclusive_area: Option<f64>,
    pub land_area: Option<f64>,
    pub building_area: Option<f64>,
    pub built: String,
    pub transit: String,
    pub address: String,
    pub title: String,
    pub url: String,
}

// Serialized under the fixed column names so every run produces the same table layout
impl Serialize for Listing {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Listing", COLUMNS.len())?;
        state.serialize_field(COLUMNS[0], &self.city)?;
        state.serialize_field(COLUMNS[1], &self.property_type)?;
        state.serialize_field(COLUMNS[2], &self.price)?;
        state.serialize_field(COLUMNS[3], &self.layout)?;
        state.serialize_field(COLUMNS[4], &self.exclusive_area)?;
        state.serialize_field(COLUMNS[5], &self.land_area)?;
        state.serialize_field(COLUMNS[6], &self.building_area)?;
        state.serialize_field(COLUMNS[7], &self.built)?;
        state.serialize_field(COLUMNS[8], &self.transit)?;
        state.serialize_field(COLUMNS[9], &self.address)?;
        state.serialize_field(COLUMNS[10], &self.title)?;
        state.serialize_field(COLUMNS[11], &self.url)?;
        state.end()
    }
}
