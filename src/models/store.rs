use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::file::photo::PhotoUpload;
use crate::models::review::Review;
use crate::models::user::User;
use crate::models::Model;

pub const POINT: &str = "Point";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type", default = "Location::point")]
    pub kind: String,
    /// `[lng, lat]`, the GeoJSON order.
    #[serde(default)]
    pub coordinates: Vec<f64>,
    #[serde(default)]
    pub address: String,
}

impl Location {
    fn point() -> String {
        POINT.into()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            kind: Self::point(),
            coordinates: Vec::new(),
            address: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub author: ObjectId,
    /// Relevance of a text search hit, only present on search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Store fields as submitted by the add/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreForm {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub address: String,
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    /// Name of an already stored photo.
    pub photo: Option<String>,
    /// A photo sent with the form, stored once the store passes validation.
    pub upload: Option<PhotoUpload>,
}

impl Store {
    pub fn new(author: ObjectId, form: StoreForm) -> Self {
        let mut store = Self {
            id: None,
            name: String::new(),
            slug: String::new(),
            description: None,
            tags: Vec::new(),
            created: Utc::now(),
            location: Location::default(),
            photo: None,
            author,
            score: None,
        };
        store.apply(form);

        store
    }

    /// Copies the submitted fields over this store, returning whether the name changed.
    ///
    /// The location type is always reset to `Point`, and the photo is only replaced
    /// when a new one was uploaded.
    pub fn apply(&mut self, form: StoreForm) -> bool {
        let name = form.name.trim().to_owned();
        let renamed = name != self.name;

        self.name = name;
        self.description = Some(form.description.trim().to_owned()).filter(|d| !d.is_empty());
        self.tags = form
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect();
        self.location = Location {
            kind: POINT.into(),
            coordinates: form.lng.into_iter().chain(form.lat).collect(),
            address: form.address.trim().to_owned(),
        };
        if form.photo.is_some() {
            self.photo = form.photo;
        }

        renamed
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("Please enter a store name!".to_owned());
        }

        let coordinates = &self.location.coordinates;
        if coordinates.len() != 2 || coordinates.iter().any(|c| !c.is_finite()) {
            errors.push("You must supply coordinates!".to_owned());
        }

        if self.location.address.is_empty() {
            errors.push("You must supply an address!".to_owned());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_owned_by(&self, user: &ObjectId) -> bool {
        &self.author == user
    }

    pub fn has_tag(&self, tag: Option<&str>) -> bool {
        match tag {
            Some(tag) => self.tags.iter().any(|t| t == tag),
            None => !self.tags.is_empty(),
        }
    }
}

impl Model for Store {
    fn name() -> &'static str {
        "stores"
    }

    fn debug(&self) -> String {
        format!("{:#?}", self)
    }
}

/// A store with its reviews attached and, on single fetches, its author's document.
#[derive(Debug, Clone, Serialize)]
pub struct StoreView {
    #[serde(flatten)]
    pub store: Store,
    pub reviews: Vec<Review>,
    #[serde(rename = "authorUser", skip_serializing_if = "Option::is_none")]
    pub author_user: Option<User>,
}

/// Field-limited projection returned by proximity searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl From<&Store> for StoreLocation {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id.unwrap_or_else(ObjectId::new),
            slug: store.slug.clone(),
            name: store.name.clone(),
            description: store.description.clone(),
            location: store.location.clone(),
            photo: store.photo.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    #[serde(rename = "_id")]
    pub tag: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopStore {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
}
