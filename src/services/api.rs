use actix_web::{get, web, HttpResponse};

use crate::data::Data;
use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(search_stores);
    cfg.service(map_stores);
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct NearQuery {
    pub lat: f64,
    pub lng: f64,
}

#[get("/api/search")]
pub async fn search_stores(
    data: web::Data<Data>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(data.search_stores(&query.q).await?))
}

#[get("/api/stores/near")]
pub async fn map_stores(
    data: web::Data<Data>,
    query: web::Query<NearQuery>,
) -> Result<HttpResponse, AppError> {
    if !query.lat.is_finite() || !query.lng.is_finite() {
        return Err(AppError::BadRequest(
            "Coordinates must be finite numbers".into(),
        ));
    }

    Ok(HttpResponse::Ok().json(data.stores_near(query.lng, query.lat).await?))
}
