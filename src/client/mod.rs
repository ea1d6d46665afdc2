pub mod heart;
pub mod typeahead;

#[cfg(test)]
mod tests;

pub use heart::HeartButton;
pub use typeahead::{Key, TypeAhead};

use bson::oid::ObjectId;

use reqwest::{Client, RequestBuilder};

use serde::de::DeserializeOwned;

use thiserror::Error;

use crate::models::store::{Store, StoreLocation};
use crate::models::user::User;
use crate::services::user::USER_HEADER;

const USER_AGENT_KEY: &str = "User-Agent";
const UA: &str = "StoreFinder";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: u16, message: String },
}

/// Calls the JSON endpoints the way the browser modules do.
#[derive(Clone)]
pub struct StoreClient {
    base_url: String,
    user: Option<ObjectId>,
    client: Client,
}

impl StoreClient {
    pub fn new<S: AsRef<str>>(base_url: S) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_owned(),
            user: None,
            client: Client::new(),
        }
    }

    /// Sends requests on behalf of `user`.
    pub fn with_user(mut self, user: ObjectId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn url<S: AsRef<str>>(&self, path: S) -> String {
        format!("{}{}", self.base_url, path.as_ref())
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(USER_AGENT_KEY, UA);

        match self.user {
            Some(user) => request.header(USER_HEADER, user.to_hex()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.prepare(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn search<S: AsRef<str>>(&self, query: S) -> Result<Vec<Store>, ClientError> {
        self.send(
            self.client
                .get(self.url("/api/search"))
                .query(&[("q", query.as_ref())]),
        )
        .await
    }

    pub async fn near(&self, lat: f64, lng: f64) -> Result<Vec<StoreLocation>, ClientError> {
        self.send(
            self.client
                .get(self.url("/api/stores/near"))
                .query(&[("lat", lat), ("lng", lng)]),
        )
        .await
    }

    /// Posts to a heart form action, answering the updated user.
    pub async fn heart<S: AsRef<str>>(&self, action: S) -> Result<User, ClientError> {
        self.send(self.client.post(self.url(action))).await
    }
}
