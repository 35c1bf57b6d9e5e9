use std::collections::HashMap;

use geojson::{Feature, FeatureCollection};
use log::warn;
use serde::Serialize;
use util::{DistrictProperties, PropertyNames};

/// Extracted districts addressable by identifier.
pub struct DistrictIndex {
    collection: FeatureCollection,
    positions: HashMap<String, usize>,
}

impl DistrictIndex {
    pub fn new(collection: FeatureCollection, names: &PropertyNames) -> Self {
        let mut positions = HashMap::new();

        for (position, feature) in collection.features.iter().enumerate() {
            let Some(properties) = feature
                .properties
                .as_ref()
                .and_then(|properties| DistrictProperties::from_json_object(properties, names))
            else {
                warn!("district feature {position} lacks district properties");
                continue;
            };

            let id = district::resolve(&properties.name).into_owned();
            if positions.contains_key(&id) {
                warn!(
                    "district {} ({}) resolves to duplicate identifier {id}",
                    properties.name, properties.code
                );
                continue;
            }
            positions.insert(id, position);
        }

        DistrictIndex {
            collection,
            positions,
        }
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn find(&self, id: &str) -> Option<&Feature> {
        self.positions
            .get(id)
            .map(|position| &self.collection.features[*position])
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub name: String,
    pub id: String,
    pub known: bool,
}

pub fn resolve_name(name: &str) -> Resolution {
    Resolution {
        name: name.to_string(),
        id: district::resolve(name).into_owned(),
        known: district::is_known(name),
    }
}
