use std::{
    fs::{File, read_to_string},
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};

use geojson::{Feature, FeatureCollection, GeoJson};

use crate::ExtractError;

/// Reads features from a `FeatureCollection`, a single `Feature` or
/// newline-delimited features.
pub fn read_features(path: &Path) -> Result<Vec<Feature>, ExtractError> {
    let content = read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_features(&content).map_err(|source| ExtractError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

pub fn parse_features(content: &str) -> Result<Vec<Feature>, geojson::Error> {
    match GeoJson::from_str(content) {
        Ok(GeoJson::FeatureCollection(collection)) => Ok(collection.features),
        Ok(GeoJson::Feature(feature)) => Ok(vec![feature]),
        Ok(GeoJson::Geometry(geometry)) => Ok(vec![Feature::from(geometry)]),
        Err(e) => {
            let lines: Vec<&str> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            // Only newline-delimited input starts with a complete feature.
            match lines.first() {
                Some(first) if lines.len() > 1 && Feature::from_str(first).is_ok() => {
                    lines.into_iter().map(Feature::from_str).collect()
                }
                _ => Err(e),
            }
        }
    }
}

pub fn write_feature_collection(
    path: &Path,
    collection: &FeatureCollection,
) -> Result<(), ExtractError> {
    let file = File::create(path).map_err(|source| ExtractError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, collection)
        .and_then(|_| writer.flush().map_err(serde_json::Error::io))
        .map_err(|source| ExtractError::Write {
            path: path.to_path_buf(),
            source,
        })
}
