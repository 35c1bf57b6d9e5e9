use std::collections::HashMap;

use geojson::{Feature, FeatureCollection, Geometry, PolygonType, Value};
use log::{debug, warn};
use thiserror::Error;
use util::{BoundaryConfig, DistrictProperties, GeometryPolicy, property_text};

use crate::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unsupported geometry type {0}")]
    UnsupportedGeometry(&'static str),
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("missing property {0}")]
    MissingProperty(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: SkipReason,
}

/// Summary of one extraction pass.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub total: usize,
    pub matched: usize,
    pub outside_region: usize,
    pub skipped: Vec<SkippedFeature>,
    /// Indices of in-region features without a district name. They still
    /// contribute their rings.
    pub unnamed: Vec<usize>,
    /// `(district code, ring-group count)` in output order.
    pub ring_groups: Vec<(String, usize)>,
}

impl ExtractReport {
    pub fn district_count(&self) -> usize {
        self.ring_groups.len()
    }

    pub fn ring_group_total(&self) -> usize {
        self.ring_groups.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Debug)]
pub struct Extraction {
    pub collection: FeatureCollection,
    pub report: ExtractReport,
}

struct DistrictAccumulator {
    code: String,
    name: Option<String>,
    polygons: Vec<PolygonType>,
}

/// Regroups sub-region features into one `MultiPolygon` feature per district.
///
/// Only features whose region property equals `config.target_region` take
/// part. Ring-groups are concatenated in input order and districts are
/// emitted in the order their code was first seen. No geometric merging
/// happens here, see [`crate::dissolve_districts`] for that.
pub fn extract_district_boundaries(
    features: Vec<Feature>,
    config: &BoundaryConfig,
) -> Result<Extraction, ExtractError> {
    let names = &config.properties;
    let mut report = ExtractReport {
        total: features.len(),
        ..ExtractReport::default()
    };
    let mut positions = HashMap::<String, usize>::new();
    let mut districts = Vec::<DistrictAccumulator>::new();

    for (index, feature) in features.into_iter().enumerate() {
        let Feature {
            geometry,
            properties,
            ..
        } = feature;
        let properties = properties.unwrap_or_default();

        let region = property_text(&properties, &names.region_name);
        if region.as_deref() != Some(config.target_region.as_str()) {
            debug!("feature {index} outside {}: {:?}", config.target_region, region);
            report.outside_region += 1;
            continue;
        }
        report.matched += 1;

        let Some(code) = property_text(&properties, &names.district_code) else {
            let reason = SkipReason::MissingProperty(names.district_code.clone());
            reject(index, reason, config.geometry_policy, &mut report)?;
            continue;
        };

        let position = match positions.get(&code) {
            Some(position) => *position,
            None => {
                districts.push(DistrictAccumulator {
                    code: code.clone(),
                    name: None,
                    polygons: Vec::new(),
                });
                positions.insert(code, districts.len() - 1);
                districts.len() - 1
            }
        };

        let district = &mut districts[position];
        match property_text(&properties, &names.district_name) {
            Some(name) => {
                district.name.get_or_insert(name);
            }
            None => {
                warn!("feature {index} has no {}", names.district_name);
                report.unnamed.push(index);
            }
        }

        match ring_groups(geometry) {
            Ok(groups) => district.polygons.extend(groups),
            Err(reason) => reject(index, reason, config.geometry_policy, &mut report)?,
        }
    }

    let features = districts
        .into_iter()
        .map(|district| {
            report
                .ring_groups
                .push((district.code.clone(), district.polygons.len()));
            let properties = DistrictProperties {
                name: district.name.unwrap_or_else(|| district.code.clone()),
                code: district.code,
                region: config.target_region.clone(),
            };

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::MultiPolygon(district.polygons))),
                id: None,
                properties: Some(properties.to_json_object(names)),
                foreign_members: None,
            }
        })
        .collect();

    Ok(Extraction {
        collection: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        report,
    })
}

/// A `Polygon` is one ring-group, a `MultiPolygon` is used as-is.
fn ring_groups(geometry: Option<Geometry>) -> Result<Vec<PolygonType>, SkipReason> {
    match geometry.map(|geometry| geometry.value) {
        Some(Value::Polygon(rings)) => Ok(vec![rings]),
        Some(Value::MultiPolygon(groups)) => Ok(groups),
        Some(other) => Err(SkipReason::UnsupportedGeometry(geometry_kind(&other))),
        None => Err(SkipReason::MissingGeometry),
    }
}

fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn reject(
    index: usize,
    reason: SkipReason,
    policy: GeometryPolicy,
    report: &mut ExtractReport,
) -> Result<(), ExtractError> {
    if policy == GeometryPolicy::Strict {
        return Err(ExtractError::Rejected { index, reason });
    }

    warn!("skipping feature {index}: {reason}");
    report.skipped.push(SkippedFeature { index, reason });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};

    const TARGET: &str = "TargetCity";

    fn config() -> BoundaryConfig {
        BoundaryConfig {
            target_region: TARGET.to_string(),
            ..BoundaryConfig::default()
        }
    }

    fn square(origin: f64) -> JsonValue {
        json!([[
            [origin, origin],
            [origin + 1.0, origin],
            [origin + 1.0, origin + 1.0],
            [origin, origin]
        ]])
    }

    fn feature(code: &str, name: &str, region: &str, geometry: JsonValue) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "sgg": code, "sggnm": name, "sidonm": region },
            "geometry": geometry,
        }))
        .unwrap()
    }

    fn polygon(origin: f64) -> JsonValue {
        json!({ "type": "Polygon", "coordinates": square(origin) })
    }

    fn multi_polygon(origins: &[f64]) -> JsonValue {
        let groups: Vec<JsonValue> = origins.iter().map(|origin| square(*origin)).collect();
        json!({ "type": "MultiPolygon", "coordinates": groups })
    }

    fn groups_of(feature: &Feature) -> &Vec<PolygonType> {
        match &feature.geometry.as_ref().unwrap().value {
            Value::MultiPolygon(groups) => groups,
            other => panic!("expected MultiPolygon, got {other:?}"),
        }
    }

    fn text(feature: &Feature, key: &str) -> String {
        property_text(feature.properties.as_ref().unwrap(), key).unwrap()
    }

    #[test]
    fn sub_regions_collapse_into_one_district() {
        let features = vec![
            feature("100", "Alpha", TARGET, polygon(0.0)),
            feature("100", "Alpha", TARGET, multi_polygon(&[1.0, 2.0])),
            feature("100", "Alpha", TARGET, polygon(3.0)),
            feature("100", "Alpha", "ElsewhereCity", polygon(9.0)),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();

        assert_eq!(extraction.collection.features.len(), 1);
        let district = &extraction.collection.features[0];
        assert_eq!(text(district, "sgg"), "100");
        assert_eq!(groups_of(district).len(), 4);
        assert_eq!(extraction.report.outside_region, 1);
        assert_eq!(extraction.report.matched, 3);
        assert_eq!(extraction.report.ring_groups, vec![("100".to_string(), 4)]);
    }

    #[test]
    fn ring_group_counts_add_up_per_district() {
        let features = vec![
            feature("1", "One", TARGET, multi_polygon(&[0.0, 1.0, 2.0])),
            feature("2", "Two", TARGET, polygon(3.0)),
            feature("1", "One", TARGET, polygon(4.0)),
            feature("2", "Two", TARGET, multi_polygon(&[5.0, 6.0])),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();
        let counts: Vec<usize> = extraction
            .collection
            .features
            .iter()
            .map(|feature| groups_of(feature).len())
            .collect();

        assert_eq!(counts, vec![4, 3]);
        assert_eq!(extraction.report.ring_group_total(), 7);
    }

    #[test]
    fn only_target_region_is_kept() {
        let features = vec![
            feature("1", "One", "Other", polygon(0.0)),
            feature("2", "Two", TARGET, polygon(1.0)),
            feature("3", "Three", "Other", polygon(2.0)),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();

        assert_eq!(extraction.collection.features.len(), 1);
        for district in &extraction.collection.features {
            assert_eq!(text(district, "sidonm"), TARGET);
        }
        assert_eq!(extraction.report.outside_region, 2);
    }

    #[test]
    fn missing_region_property_counts_as_outside() {
        let mut unlabeled = feature("1", "One", TARGET, polygon(0.0));
        unlabeled.properties.as_mut().unwrap().remove("sidonm");

        let extraction = extract_district_boundaries(vec![unlabeled], &config()).unwrap();

        assert!(extraction.collection.features.is_empty());
        assert_eq!(extraction.report.outside_region, 1);
        assert!(extraction.report.skipped.is_empty());
    }

    #[test]
    fn district_codes_are_unique_and_in_first_seen_order() {
        let features = vec![
            feature("30", "C", TARGET, polygon(0.0)),
            feature("10", "A", TARGET, polygon(1.0)),
            feature("30", "C", TARGET, polygon(2.0)),
            feature("20", "B", TARGET, polygon(3.0)),
            feature("10", "A", TARGET, polygon(4.0)),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();
        let codes: Vec<String> = extraction
            .collection
            .features
            .iter()
            .map(|feature| text(feature, "sgg"))
            .collect();

        assert_eq!(codes, vec!["30", "10", "20"]);
    }

    #[test]
    fn ring_groups_keep_input_order() {
        let features = vec![
            feature("1", "One", TARGET, polygon(5.0)),
            feature("1", "One", TARGET, multi_polygon(&[7.0, 6.0])),
            feature("1", "One", TARGET, polygon(8.0)),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();
        let first_x: Vec<f64> = groups_of(&extraction.collection.features[0])
            .iter()
            .map(|group| group[0][0][0])
            .collect();

        assert_eq!(first_x, vec![5.0, 7.0, 6.0, 8.0]);
    }

    #[test]
    fn district_metadata_comes_from_first_feature() {
        let features = vec![
            feature("1", "First", TARGET, polygon(0.0)),
            feature("1", "Renamed", TARGET, polygon(1.0)),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();

        assert_eq!(text(&extraction.collection.features[0], "sggnm"), "First");
    }

    #[test]
    fn unsupported_geometry_contributes_nothing() {
        let features = vec![
            feature("1", "One", TARGET, json!({ "type": "Point", "coordinates": [0.0, 0.0] })),
            feature("1", "One", TARGET, polygon(1.0)),
        ];

        let extraction = extract_district_boundaries(features, &config()).unwrap();

        assert_eq!(groups_of(&extraction.collection.features[0]).len(), 1);
        assert_eq!(
            extraction.report.skipped,
            vec![SkippedFeature {
                index: 0,
                reason: SkipReason::UnsupportedGeometry("Point"),
            }]
        );
    }

    #[test]
    fn district_with_only_bad_geometry_is_still_emitted() {
        let features = vec![feature("1", "One", TARGET, JsonValue::Null)];

        let extraction = extract_district_boundaries(features, &config()).unwrap();

        assert_eq!(extraction.collection.features.len(), 1);
        assert!(groups_of(&extraction.collection.features[0]).is_empty());
        assert_eq!(
            extraction.report.skipped[0].reason,
            SkipReason::MissingGeometry
        );
    }

    fn unnamed(code: &str, geometry: JsonValue) -> Feature {
        let mut feature = feature(code, "", TARGET, geometry);
        feature.properties.as_mut().unwrap().remove("sggnm");
        feature
    }

    #[test]
    fn unnamed_feature_contributes_regardless_of_position() {
        let named_first = vec![
            feature("100", "Alpha", TARGET, polygon(0.0)),
            unnamed("100", polygon(1.0)),
        ];
        let unnamed_first = vec![
            unnamed("100", polygon(1.0)),
            feature("100", "Alpha", TARGET, polygon(0.0)),
        ];

        for features in [named_first, unnamed_first] {
            let extraction = extract_district_boundaries(features, &config()).unwrap();

            assert_eq!(extraction.report.ring_groups, vec![("100".to_string(), 2)]);
            assert_eq!(text(&extraction.collection.features[0], "sggnm"), "Alpha");
            assert_eq!(extraction.report.unnamed.len(), 1);
            assert!(extraction.report.skipped.is_empty());
        }
    }

    #[test]
    fn district_without_any_name_falls_back_to_code() {
        let strict = BoundaryConfig {
            geometry_policy: GeometryPolicy::Strict,
            ..config()
        };

        let extraction =
            extract_district_boundaries(vec![unnamed("100", polygon(0.0))], &strict).unwrap();

        assert_eq!(extraction.collection.features.len(), 1);
        assert_eq!(text(&extraction.collection.features[0], "sggnm"), "100");
        assert_eq!(extraction.report.unnamed, vec![0]);
    }

    #[test]
    fn missing_code_skips_the_feature() {
        let mut anonymous = feature("1", "One", TARGET, polygon(0.0));
        anonymous.properties.as_mut().unwrap().remove("sgg");

        let extraction = extract_district_boundaries(vec![anonymous], &config()).unwrap();

        assert!(extraction.collection.features.is_empty());
        assert_eq!(
            extraction.report.skipped[0].reason,
            SkipReason::MissingProperty("sgg".to_string())
        );
    }

    #[test]
    fn strict_policy_rejects_unsupported_geometry() {
        let config = BoundaryConfig {
            geometry_policy: GeometryPolicy::Strict,
            ..config()
        };
        let features = vec![
            feature("1", "One", TARGET, polygon(0.0)),
            feature(
                "1",
                "One",
                TARGET,
                json!({ "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }),
            ),
        ];

        let error = extract_district_boundaries(features, &config).unwrap_err();

        assert!(matches!(
            error,
            ExtractError::Rejected {
                index: 1,
                reason: SkipReason::UnsupportedGeometry("LineString"),
            }
        ));
    }

    #[test]
    fn numeric_codes_group_with_string_codes() {
        let mut numeric = feature("11110", "종로구", TARGET, polygon(0.0));
        numeric
            .properties
            .as_mut()
            .unwrap()
            .insert("sgg".to_string(), json!(11110));
        let features = vec![numeric, feature("11110", "종로구", TARGET, polygon(1.0))];

        let extraction = extract_district_boundaries(features, &config()).unwrap();

        assert_eq!(extraction.collection.features.len(), 1);
        assert_eq!(groups_of(&extraction.collection.features[0]).len(), 2);
    }

    #[test]
    fn empty_input_yields_empty_collection() {
        let extraction = extract_district_boundaries(Vec::new(), &config()).unwrap();

        assert!(extraction.collection.features.is_empty());
        assert_eq!(extraction.report.total, 0);
    }
}
