mod api;
mod form;
mod hearts;
mod reviews;
mod stores;
mod tags;
pub mod user;


use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};

use crate::error::AppError;

#[derive(Serialize)]
pub struct WsError {
    pub error: String,
}

/// Page payload a template would otherwise render.
#[derive(Serialize)]
pub struct WsPage<T: serde::Serialize> {
    pub title: String,
    #[serde(flatten)]
    pub content: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flash {
    Success,
    Info,
}

impl Flash {
    pub fn header(self) -> &'static str {
        match self {
            Flash::Success => "x-flash-success",
            Flash::Info => "x-flash-info",
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|e, _| AppError::BadRequest(e.to_string()).into()),
    );
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|e, _| AppError::BadRequest(e.to_string()).into()),
    );
    cfg.app_data(
        web::PathConfig::default().error_handler(|e, _| AppError::NotFound(e.to_string()).into()),
    );

    stores::config(cfg);
    tags::config(cfg);
    api::config(cfg);
    hearts::config(cfg);
    reviews::config(cfg);
}

pub fn page<S: Into<String>, T: serde::Serialize>(title: S, content: T) -> HttpResponse {
    HttpResponse::Ok().json(WsPage {
        title: title.into(),
        content,
    })
}

/// A `303 See Other` to `location`, carrying a percent-encoded flash notice.
pub fn redirect<S: AsRef<str>>(location: S, flash: Option<(Flash, String)>) -> HttpResponse {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((LOCATION, location.as_ref()));

    if let Some((level, message)) = flash {
        response.insert_header((level.header(), urlencoding::encode(&message).into_owned()));
    }

    response.finish()
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Not found".into()))
}
