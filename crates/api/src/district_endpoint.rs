use std::sync::Arc;

use ntex::web;
use serde::Deserialize;

use crate::district_service::{DistrictIndex, resolve_name};

#[derive(Deserialize)]
struct ResolveQuery {
    name: String,
}

pub struct AppState {
    pub districts: Arc<DistrictIndex>,
}

#[web::get("/districts")]
async fn list_districts(state: web::types::State<AppState>) -> impl web::Responder {
    web::HttpResponse::Ok().json(state.districts.collection())
}

#[web::get("/districts/resolve")]
async fn resolve_district(query: web::types::Query<ResolveQuery>) -> impl web::Responder {
    web::HttpResponse::Ok().json(&resolve_name(&query.name))
}

#[web::get("/districts/{id}")]
async fn district_by_id(
    id: web::types::Path<String>,
    state: web::types::State<AppState>,
) -> impl web::Responder {
    match state.districts.find(id.as_str()) {
        Some(feature) => web::HttpResponse::Ok().json(feature),
        None => web::HttpResponse::NotFound().finish(),
    }
}
