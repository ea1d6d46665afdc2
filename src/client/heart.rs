use std::time::{Duration, Instant};

use bson::oid::ObjectId;

use crate::client::{ClientError, StoreClient};
use crate::models::user::User;

pub const FLOAT_DURATION: Duration = Duration::from_millis(2500);

/// A store's heart button and the heart counter next to it.
#[derive(Debug, Clone)]
pub struct HeartButton {
    pub action: String,
    pub hearted: bool,
    pub count: usize,
    floating_until: Option<Instant>,
}

impl HeartButton {
    pub fn new(store: ObjectId, hearted: bool) -> Self {
        Self {
            action: format!("/stores/{}/heart", store.to_hex()),
            hearted,
            count: 0,
            floating_until: None,
        }
    }

    pub async fn submit(&mut self, client: &StoreClient) -> Result<bool, ClientError> {
        let user = client.heart(&self.action).await?;

        Ok(self.apply(&user, Instant::now()))
    }

    /// Flips the button after a successful toggle; a fresh heart floats for a while.
    pub fn apply(&mut self, user: &User, now: Instant) -> bool {
        self.hearted = !self.hearted;
        self.count = user.hearts.len();

        self.floating_until = if self.hearted {
            Some(now + FLOAT_DURATION)
        } else {
            None
        };

        self.hearted
    }

    pub fn is_floating(&self, now: Instant) -> bool {
        self.floating_until.map_or(false, |until| now < until)
    }
}
