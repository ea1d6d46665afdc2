use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use log::error;

use thiserror::Error;

use crate::data::DataError;
use crate::file::photo::PhotoError;
use crate::services::WsError;

/// Every failure a handler can end with, rendered as a JSON `{ "error": ... }` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Photo(#[from] PhotoError),
    #[error("Couldn't read the submitted form: {0}")]
    Multipart(#[from] MultipartError),
    #[error("The \"{0}\" field is too large")]
    TooLarge(String),
    #[error("You must be logged in to do that!")]
    Unauthenticated,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

fn photo_status(e: &PhotoError) -> StatusCode {
    match e {
        PhotoError::NotAllowed => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        PhotoError::Image(_) => StatusCode::BAD_REQUEST,
        PhotoError::File(_) | PhotoError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Data(e) => match e {
                DataError::Validation(_) => StatusCode::BAD_REQUEST,
                DataError::NotOwner => StatusCode::FORBIDDEN,
                DataError::NotFound(_) => StatusCode::NOT_FOUND,
                DataError::Photo(e) => photo_status(e),
                DataError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Photo(e) => photo_status(e),
            AppError::Multipart(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_server_error() {
            error!("Request failed: {}", self);
            sentry::capture_error(self);

            "An error occurred, please try again later.".to_owned()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(WsError { error: message })
    }
}
