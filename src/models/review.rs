use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::models::Model;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created: DateTime<Utc>,
    pub author: ObjectId,
    pub store: ObjectId,
    pub text: String,
    pub rating: u8,
}

/// Review fields as posted from the store page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Review {
    pub fn new(author: ObjectId, store: ObjectId, form: ReviewForm) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let text = form.text.trim().to_owned();
        if text.is_empty() {
            errors.push("Your review must have text!".to_owned());
        }

        let rating = match form.rating {
            Some(rating) if (MIN_RATING..=MAX_RATING).contains(&rating) => rating,
            _ => {
                errors.push(format!(
                    "Your rating must be between {} and {}!",
                    MIN_RATING, MAX_RATING
                ));
                0
            }
        };

        if errors.is_empty() {
            Ok(Self {
                id: None,
                created: Utc::now(),
                author,
                store,
                text,
                rating,
            })
        } else {
            Err(errors)
        }
    }
}

impl Model for Review {
    fn name() -> &'static str {
        "reviews"
    }

    fn debug(&self) -> String {
        format!("{:#?}", self)
    }
}
