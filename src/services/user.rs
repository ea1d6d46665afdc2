use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use bson::oid::ObjectId;

use futures_lite::future::{ready, Ready};

use crate::error::AppError;

/// Header carrying the requester's user id, set by the authentication layer in front.
pub const USER_HEADER: &str = "x-user-id";

/// The requesting user, required by every handler that writes on a user's behalf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentUser(pub ObjectId);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            request
                .headers()
                .get(USER_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| ObjectId::parse_str(value.trim()).ok())
                .map(CurrentUser)
                .ok_or(AppError::Unauthenticated),
        )
    }
}
