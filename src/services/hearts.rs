use actix_web::{get, post, web, HttpResponse};

use crate::data::Data;
use crate::error::AppError;
use crate::models::store::StoreView;
use crate::services::stores::parse_id;
use crate::services::user::CurrentUser;
use crate::services;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(heart_store);
    cfg.service(get_hearts);
}

#[derive(Serialize)]
struct HeartsContent {
    stores: Vec<StoreView>,
}

#[post("/stores/{id}/heart")]
pub async fn heart_store(
    data: web::Data<Data>,
    user: CurrentUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = data.toggle_heart(user.0, parse_id(id.as_str())?).await?;

    Ok(HttpResponse::Ok().json(user))
}

#[get("/hearts")]
pub async fn get_hearts(
    data: web::Data<Data>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let stores = data.hearted_stores(user.0).await?;

    Ok(services::page("Hearted Stores", HeartsContent { stores }))
}
