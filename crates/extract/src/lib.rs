mod dissolve;
mod district_boundaries;
mod geojson_io;

use std::{path::Path, path::PathBuf, time::Instant};

use log::info;
use thiserror::Error;
use util::BoundaryConfig;

pub use dissolve::dissolve_districts;
pub use district_boundaries::{
    ExtractReport, Extraction, SkipReason, SkippedFeature, extract_district_boundaries,
};
pub use geojson_io::{parse_features, read_features, write_feature_collection};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("feature {index} rejected: {reason}")]
    Rejected { index: usize, reason: SkipReason },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: Box<geojson::Error>,
    },
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads a sub-region dataset and extracts the district boundaries of
/// `config.target_region`, dissolving them when `config.dissolve` is set.
pub fn extract(path: &Path, config: &BoundaryConfig) -> Result<Extraction, ExtractError> {
    let start = Instant::now();
    let features = read_features(path)?;
    info!(
        "read {} features from {} in {:.2?}",
        features.len(),
        path.display(),
        start.elapsed()
    );

    let start = Instant::now();
    let mut extraction = extract_district_boundaries(features, config)?;
    info!(
        "grouped {} of {} features into {} districts in {:.2?}",
        extraction.report.matched,
        extraction.report.total,
        extraction.report.district_count(),
        start.elapsed()
    );

    if config.dissolve {
        extraction.collection = dissolve_districts(extraction.collection);
    }

    Ok(extraction)
}
