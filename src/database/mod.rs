use async_trait::async_trait;

use bson::oid::ObjectId;

use thiserror::Error;

use crate::models::review::Review;
use crate::models::store::{Store, StoreLocation, TagCount, TopStore};
use crate::models::user::{HeartOperation, User};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Couldn't decode the document: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("Invalid slug pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Missing configuration: {0}")]
    Configuration(String),
    #[error("Document {0} has no identifier")]
    MissingId(&'static str),
    #[error("In-memory storage lock poisoned")]
    Poisoned,
}

/// Which stores a query selects.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreFilter {
    All,
    Id(ObjectId),
    Slug(String),
    /// Stores carrying the tag, or any tag at all when `None`.
    Tagged(Option<String>),
    Ids(Vec<ObjectId>),
}

impl StoreFilter {
    pub fn matches(&self, store: &Store) -> bool {
        match self {
            StoreFilter::All => true,
            StoreFilter::Id(id) => store.id.as_ref() == Some(id),
            StoreFilter::Slug(slug) => &store.slug == slug,
            StoreFilter::Tagged(tag) => store.has_tag(tag.as_deref()),
            StoreFilter::Ids(ids) => store.id.map_or(false, |id| ids.contains(&id)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub skip: u64,
    pub limit: i64,
}

/// Builds the pattern matching a slug and its numbered variants, `base`, `base-2`, ...
pub fn slug_pattern<S: AsRef<str>>(base: S) -> String {
    format!("^({})((-[0-9]*$)?)$", regex::escape(base.as_ref()))
}

/// Storage operations the store repository runs against a document database.
#[async_trait]
pub trait Database: Send + Sync {
    async fn insert_store(&self, store: &Store) -> Result<(), DatabaseError>;

    async fn replace_store(&self, store: &Store) -> Result<(), DatabaseError>;

    async fn find_store(&self, filter: &StoreFilter) -> Result<Option<Store>, DatabaseError>;

    /// Stores matching `filter`, newest first.
    async fn find_stores(
        &self,
        filter: &StoreFilter,
        page: Option<Page>,
    ) -> Result<Vec<Store>, DatabaseError>;

    async fn count_stores(&self, filter: &StoreFilter) -> Result<u64, DatabaseError>;

    /// Counts stores whose slug matches [`slug_pattern`] case-insensitively.
    async fn count_slugs(
        &self,
        base: &str,
        exclude: Option<ObjectId>,
    ) -> Result<u64, DatabaseError>;

    async fn tags_list(&self) -> Result<Vec<TagCount>, DatabaseError>;

    /// Full-text search over name and description, best score first.
    async fn search_stores(&self, query: &str, limit: i64) -> Result<Vec<Store>, DatabaseError>;

    /// Stores within `max_distance` meters of `[lng, lat]`, nearest first.
    async fn stores_near(
        &self,
        coordinates: [f64; 2],
        max_distance: f64,
        limit: i64,
    ) -> Result<Vec<StoreLocation>, DatabaseError>;

    async fn top_stores(&self, min_reviews: usize, limit: i64)
        -> Result<Vec<TopStore>, DatabaseError>;

    async fn insert_review(&self, review: &Review) -> Result<(), DatabaseError>;

    async fn reviews_for(&self, stores: &[ObjectId]) -> Result<Vec<Review>, DatabaseError>;

    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, DatabaseError>;

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;

    /// Atomically adds or removes a heart, creating the user document if needed.
    async fn update_hearts(
        &self,
        user: ObjectId,
        store: ObjectId,
        operation: HeartOperation,
    ) -> Result<User, DatabaseError>;
}
