use actix_web::{post, web, HttpResponse};

use crate::data::Data;
use crate::error::AppError;
use crate::models::review::ReviewForm;
use crate::services::stores::parse_id;
use crate::services::user::CurrentUser;
use crate::services::{self, Flash};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_review);
}

#[post("/reviews/{id}")]
pub async fn add_review(
    data: web::Data<Data>,
    user: CurrentUser,
    id: web::Path<String>,
    form: web::Form<ReviewForm>,
) -> Result<HttpResponse, AppError> {
    let store = data
        .add_review(user.0, parse_id(id.as_str())?, form.into_inner())
        .await?;

    Ok(services::redirect(
        format!("/store/{}", store.slug),
        Some((Flash::Success, "Review Saved!".to_owned())),
    ))
}
