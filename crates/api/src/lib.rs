mod district_endpoint;
mod district_service;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use district_endpoint::AppState;
use district_endpoint::{district_by_id, list_districts, resolve_district};
use geojson::FeatureCollection;
use log::info;
use ntex::web;
use util::PropertyNames;

pub use district_service::{DistrictIndex, Resolution, resolve_name};

/// Serves an extracted district collection over HTTP.
pub async fn run_api(
    boundaries_path: &Path,
    names: &PropertyNames,
    port: u16,
    workers: usize,
) -> Result<()> {
    let features = extract::read_features(boundaries_path)
        .with_context(|| format!("loading districts from {}", boundaries_path.display()))?;
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let districts = Arc::new(DistrictIndex::new(collection, names));
    info!(
        "serving {} districts on port {} with {} workers",
        districts.len(),
        port,
        workers
    );

    web::HttpServer::new(move || {
        web::App::new()
            .state(AppState {
                districts: districts.clone(),
            })
            .service(list_districts)
            .service(resolve_district)
            .service(district_by_id)
    })
    .workers(workers)
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
