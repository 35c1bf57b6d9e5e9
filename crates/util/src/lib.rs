mod config_loader;

use geojson::JsonObject;
use serde::Deserialize;
use serde_json::Value;

pub use config_loader::{ConfigError, load_config};

pub const DEFAULT_TARGET_REGION: &str = "서울특별시";

/// Property keys used to read district metadata from the source dataset.
/// The same keys are written back onto the extracted district features.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub district_name: String,
    pub district_code: String,
    pub region_name: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        PropertyNames {
            district_name: "sggnm".to_string(),
            district_code: "sgg".to_string(),
            region_name: "sidonm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryPolicy {
    /// Features with unusable geometry contribute no ring-groups.
    #[default]
    Skip,
    /// The first unusable feature aborts the extraction.
    Strict,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub target_region: String,
    pub properties: PropertyNames,
    pub geometry_policy: GeometryPolicy,
    pub dissolve: bool,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        BoundaryConfig {
            target_region: DEFAULT_TARGET_REGION.to_string(),
            properties: PropertyNames::default(),
            geometry_policy: GeometryPolicy::default(),
            dissolve: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictProperties {
    pub name: String,
    pub code: String,
    pub region: String,
}

impl DistrictProperties {
    pub fn to_json_object(&self, names: &PropertyNames) -> JsonObject {
        let mut properties = JsonObject::new();
        properties.insert(names.district_name.clone(), Value::from(self.name.clone()));
        properties.insert(names.district_code.clone(), Value::from(self.code.clone()));
        properties.insert(names.region_name.clone(), Value::from(self.region.clone()));
        properties
    }

    /// Reads the district properties back from an extracted feature.
    pub fn from_json_object(properties: &JsonObject, names: &PropertyNames) -> Option<Self> {
        Some(DistrictProperties {
            name: property_text(properties, &names.district_name)?,
            code: property_text(properties, &names.district_code)?,
            region: property_text(properties, &names.region_name)?,
        })
    }
}

/// Returns a property as text. Numeric codes are common in administrative
/// datasets, so numbers are accepted and rendered as their JSON text.
pub fn property_text(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}
