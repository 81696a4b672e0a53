use crate::error::ConfigError;
use crate::models::{City, CrawlTarget, PropertyKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://suumo.jp";
pub const DEFAULT_OUTPUT: &str = "data/suumo_listings.csv";

/// Everything a crawl run needs to know up front. Loaded from an optional
/// JSON file; fields missing from the file keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Site origin, also used to absolutize relative listing links.
    pub base_url: String,
    /// Regional block (`ar` parameter); 060 is Kinki.
    pub area_code: String,
    pub cities: Vec<City>,
    pub property_types: Vec<PropertyKind>,
    /// Ceiling on pages fetched per (city, type) pair.
    pub max_pages: usize,
    /// Pause between two consecutive requests, in milliseconds.
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub output: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            area_code: "060".to_string(),
            cities: vec![
                City::new("高砂市", "28216"),
                City::new("加古川市", "28210"),
                City::new("明石市", "28203"),
            ],
            property_types: vec![
                PropertyKind::new("マンション", "011"),
                PropertyKind::new("戸建て", "021"),
            ],
            max_pages: 20,
            delay_ms: 2000,
            timeout_secs: 20,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl CrawlConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cities.is_empty() {
            return Err(ConfigError::Invalid("no cities configured".to_string()));
        }
        if self.property_types.is_empty() {
            return Err(ConfigError::Invalid(
                "no property types configured".to_string(),
            ));
        }
        if let Some(city) = self.cities.iter().find(|c| c.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "city with code {} has an empty name",
                city.code
            )));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "max_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Keeps only the cities whose name is listed. An empty list keeps all.
    pub fn retain_cities(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.cities.iter().any(|c| &c.name == *name))
        {
            return Err(ConfigError::Invalid(format!("unknown city: {}", unknown)));
        }
        self.cities.retain(|c| names.contains(&c.name));
        Ok(())
    }

    /// Keeps only the property types whose name is listed. An empty list keeps all.
    pub fn retain_property_types(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.property_types.iter().any(|k| &k.name == *name))
        {
            return Err(ConfigError::Invalid(format!(
                "unknown property type: {}",
                unknown
            )));
        }
        self.property_types.retain(|k| names.contains(&k.name));
        Ok(())
    }

    /// Cartesian product of cities and property types, cities outermost.
    pub fn targets(&self) -> Vec<CrawlTarget> {
        self.cities
            .iter()
            .flat_map(|city| {
                self.property_types.iter().map(move |kind| CrawlTarget {
                    city: city.clone(),
                    kind: kind.clone(),
                })
            })
            .collect()
    }

    /// Result page URL for one pair, 100 listings per page.
    pub fn page_url(&self, target: &CrawlTarget, page: usize) -> String {
        format!(
            "{}/jj/bukken/ichiran/JJ010FJ001/?ar={}&bs={}&sc={}&pc=100&page={}",
            self.base_url.trim_end_matches('/'),
            self.area_code,
            target.kind.code,
            target.city.code,
            page
        )
    }

    /// Sets the inter-request delay from a value in seconds.
    pub fn set_delay_secs(&mut self, secs: f64) -> Result<(), ConfigError> {
        let delay = Duration::try_from_secs_f64(secs)
            .map_err(|_| ConfigError::Invalid(format!("invalid delay: {} seconds", secs)))?;
        self.delay_ms = u64::try_from(delay.as_millis())
            .map_err(|_| ConfigError::Invalid(format!("delay too long: {} seconds", secs)))?;
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
