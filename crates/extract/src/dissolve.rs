use std::time::Instant;

use geo::{BooleanOps, MultiPolygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use log::{info, warn};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Unions every district's ring-groups into its outer boundary, dropping the
/// edges shared between sub-regions. Districts are processed in parallel and
/// keep their order.
pub fn dissolve_districts(collection: FeatureCollection) -> FeatureCollection {
    let start = Instant::now();
    let FeatureCollection {
        bbox,
        features,
        foreign_members,
    } = collection;

    let features: Vec<Feature> = features.into_par_iter().map(dissolve_feature).collect();

    info!(
        "dissolved {} districts in {:.2?}",
        features.len(),
        start.elapsed()
    );
    FeatureCollection {
        bbox,
        features,
        foreign_members,
    }
}

fn dissolve_feature(mut feature: Feature) -> Feature {
    let Some(geometry) = feature.geometry.take() else {
        return feature;
    };

    let shape = match MultiPolygon::<f64>::try_from(geometry.clone()) {
        Ok(shape) => shape,
        Err(e) => {
            warn!("keeping district undissolved, geometry not convertible: {e}");
            feature.geometry = Some(geometry);
            return feature;
        }
    };

    let dissolved = union_all(shape);
    feature.geometry = Some(Geometry::new(Value::from(&dissolved)));
    feature
}

fn union_all(shape: MultiPolygon) -> MultiPolygon {
    let mut polygons = shape.into_iter();
    let Some(first) = polygons.next() else {
        return MultiPolygon::new(Vec::new());
    };

    polygons.fold(MultiPolygon::new(vec![first]), |merged, polygon| {
        merged.union(&MultiPolygon::new(vec![polygon]))
    })
}
