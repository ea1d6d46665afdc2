use async_trait::async_trait;

use bson::oid::ObjectId;
use bson::{doc, Document as MongoDocument};
use futures_lite::StreamExt;
use log::{error, info};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument,
};
use mongodb::{Client, Collection, Cursor, Database as MongoDatabase, IndexModel};
use serde::de::DeserializeOwned;

use crate::config::DatabaseConfig;
use crate::database::{slug_pattern, Database, DatabaseError, Page, StoreFilter};
use crate::models::review::Review;
use crate::models::store::{Store, StoreLocation, TagCount, TopStore};
use crate::models::user::{HeartOperation, User};
use crate::models::Model;

#[derive(Clone)]
pub struct MongoDB {
    database: MongoDatabase,
}

impl MongoDB {
    const MONGDB_STR: &'static str = "mongodb";
    const DEFAULT_PORT: u16 = 27017;

    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let connection_str = match (config.string.as_ref(), config.host.as_ref()) {
            (Some(connection_str), _) => String::from(connection_str),
            (None, Some(host)) => {
                let connection_str =
                    format!("{}:{}", host, config.port.unwrap_or(Self::DEFAULT_PORT));

                if let Some(ref user) = config.user {
                    format!(
                        "{}://{}:{}@{}",
                        Self::MONGDB_STR,
                        user,
                        config.password.as_deref().unwrap_or(""),
                        connection_str
                    )
                } else {
                    format!("{}://{}", Self::MONGDB_STR, connection_str)
                }
            }
            (None, None) => {
                return Err(DatabaseError::Configuration(
                    "either `string` or `host` must be set for MongoDB".into(),
                ))
            }
        };

        let options = ClientOptions::parse(connection_str.as_str()).await?;
        let client = Client::with_options(options)?;

        info!("Connected to MongoDB database \"{}\".", config.db_name);

        Ok(MongoDB {
            database: client.database(config.db_name.as_str()),
        })
    }

    /// Creates the text and geospatial indexes the store queries depend on.
    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        let stores = self.collection::<Store>();

        stores
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name": "text", "description": "text" })
                    .build(),
                None,
            )
            .await?;
        stores
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "location": "2dsphere" })
                    .build(),
                None,
            )
            .await?;
        stores
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(IndexOptions::builder().sparse(true).build())
                    .build(),
                None,
            )
            .await?;
        self.collection::<Review>()
            .create_index(IndexModel::builder().keys(doc! { "store": 1 }).build(), None)
            .await?;

        Ok(())
    }

    fn collection<T: Model>(&self) -> Collection<T> {
        self.database.collection::<T>(T::name())
    }

    fn store_filter(filter: &StoreFilter) -> MongoDocument {
        match filter {
            StoreFilter::All => doc! {},
            StoreFilter::Id(id) => doc! { "_id": *id },
            StoreFilter::Slug(slug) => doc! { "slug": slug.as_str() },
            StoreFilter::Tagged(Some(tag)) => doc! { "tags": tag.as_str() },
            StoreFilter::Tagged(None) => doc! { "tags.0": { "$exists": true } },
            StoreFilter::Ids(ids) => doc! { "_id": { "$in": ids.clone() } },
        }
    }

    async fn collect<T>(mut cursor: Cursor<T>) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let mut results = Vec::new();
        while let Some(document) = cursor.next().await {
            results.push(document?);
        }

        Ok(results)
    }

    async fn aggregate<T: DeserializeOwned>(
        &self,
        pipeline: Vec<MongoDocument>,
    ) -> Result<Vec<T>, DatabaseError> {
        let cursor = self
            .collection::<Store>()
            .aggregate(pipeline, None)
            .await?;

        Self::collect(cursor)
            .await?
            .into_iter()
            .map(|document| bson::from_document::<T>(document).map_err(DatabaseError::from))
            .collect()
    }

    fn log_error<T: Model>(model: &T, e: &mongodb::error::Error) {
        error!(
            "Error writing {} with model {}: {:#?}",
            T::name(),
            model.debug(),
            e
        );

        sentry::capture_error(e);
    }
}

#[async_trait]
impl Database for MongoDB {
    async fn insert_store(&self, store: &Store) -> Result<(), DatabaseError> {
        self.collection::<Store>()
            .insert_one(store, None)
            .await
            .map_err(|e| {
                Self::log_error(store, &e);

                e
            })?;

        Ok(())
    }

    async fn replace_store(&self, store: &Store) -> Result<(), DatabaseError> {
        let id = store.id.ok_or(DatabaseError::MissingId(Store::name()))?;

        self.collection::<Store>()
            .replace_one(doc! { "_id": id }, store, None)
            .await
            .map_err(|e| {
                Self::log_error(store, &e);

                e
            })?;

        Ok(())
    }

    async fn find_store(&self, filter: &StoreFilter) -> Result<Option<Store>, DatabaseError> {
        Ok(self
            .collection::<Store>()
            .find_one(Self::store_filter(filter), None)
            .await?)
    }

    async fn find_stores(
        &self,
        filter: &StoreFilter,
        page: Option<Page>,
    ) -> Result<Vec<Store>, DatabaseError> {
        let options = FindOptions::builder()
            .sort(doc! { "created": -1 })
            .skip(page.map(|page| page.skip))
            .limit(page.map(|page| page.limit))
            .build();

        let cursor = self
            .collection::<Store>()
            .find(Self::store_filter(filter), options)
            .await?;

        Self::collect(cursor).await
    }

    async fn count_stores(&self, filter: &StoreFilter) -> Result<u64, DatabaseError> {
        Ok(self
            .collection::<Store>()
            .count_documents(Self::store_filter(filter), None)
            .await?)
    }

    async fn count_slugs(
        &self,
        base: &str,
        exclude: Option<ObjectId>,
    ) -> Result<u64, DatabaseError> {
        let mut filter = doc! {
            "slug": { "$regex": slug_pattern(base), "$options": "i" },
        };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id });
        }

        Ok(self
            .collection::<Store>()
            .count_documents(filter, None)
            .await?)
    }

    async fn tags_list(&self) -> Result<Vec<TagCount>, DatabaseError> {
        self.aggregate(vec![
            doc! { "$unwind": "$tags" },
            doc! { "$group": { "_id": "$tags", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
        ])
        .await
    }

    async fn search_stores(&self, query: &str, limit: i64) -> Result<Vec<Store>, DatabaseError> {
        let options = FindOptions::builder()
            .projection(doc! { "score": { "$meta": "textScore" } })
            .sort(doc! { "score": { "$meta": "textScore" } })
            .limit(limit)
            .build();

        let cursor = self
            .collection::<Store>()
            .find(doc! { "$text": { "$search": query } }, options)
            .await?;

        Self::collect(cursor).await
    }

    async fn stores_near(
        &self,
        coordinates: [f64; 2],
        max_distance: f64,
        limit: i64,
    ) -> Result<Vec<StoreLocation>, DatabaseError> {
        let filter = doc! {
            "location": {
                "$near": {
                    "$geometry": {
                        "type": "Point",
                        "coordinates": [coordinates[0], coordinates[1]],
                    },
                    "$maxDistance": max_distance,
                },
            },
        };
        let options = FindOptions::builder()
            .projection(doc! {
                "slug": 1,
                "name": 1,
                "description": 1,
                "location": 1,
                "photo": 1,
            })
            .limit(limit)
            .build();

        let cursor = self
            .database
            .collection::<StoreLocation>(Store::name())
            .find(filter, options)
            .await?;

        Self::collect(cursor).await
    }

    async fn top_stores(
        &self,
        min_reviews: usize,
        limit: i64,
    ) -> Result<Vec<TopStore>, DatabaseError> {
        // `reviews.N` exists exactly when there are more than N reviews.
        let mut enough_reviews = MongoDocument::new();
        enough_reviews.insert(
            format!("reviews.{}", min_reviews.saturating_sub(1)),
            doc! { "$exists": true },
        );

        self.aggregate(vec![
            doc! {
                "$lookup": {
                    "from": Review::name(),
                    "localField": "_id",
                    "foreignField": "store",
                    "as": "reviews",
                },
            },
            doc! { "$match": enough_reviews },
            doc! {
                "$project": {
                    "photo": "$$ROOT.photo",
                    "name": "$$ROOT.name",
                    "slug": "$$ROOT.slug",
                    "reviews": "$$ROOT.reviews",
                    "averageRating": { "$avg": "$reviews.rating" },
                },
            },
            doc! { "$sort": { "averageRating": -1 } },
            doc! { "$limit": limit },
        ])
        .await
    }

    async fn insert_review(&self, review: &Review) -> Result<(), DatabaseError> {
        self.collection::<Review>()
            .insert_one(review, None)
            .await
            .map_err(|e| {
                Self::log_error(review, &e);

                e
            })?;

        Ok(())
    }

    async fn reviews_for(&self, stores: &[ObjectId]) -> Result<Vec<Review>, DatabaseError> {
        if stores.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection::<Review>()
            .find(
                doc! { "store": { "$in": stores.to_vec() } },
                FindOptions::builder().sort(doc! { "created": -1 }).build(),
            )
            .await?;

        Self::collect(cursor).await
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .collection::<User>()
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.collection::<User>()
            .insert_one(user, None)
            .await
            .map_err(|e| {
                Self::log_error(user, &e);

                e
            })?;

        Ok(())
    }

    async fn update_hearts(
        &self,
        user: ObjectId,
        store: ObjectId,
        operation: HeartOperation,
    ) -> Result<User, DatabaseError> {
        let update = match operation {
            HeartOperation::Add => doc! { "$addToSet": { "hearts": store } },
            HeartOperation::Remove => doc! { "$pull": { "hearts": store } },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<User>()
            .find_one_and_update(doc! { "_id": user }, update, options)
            .await?
            .ok_or(DatabaseError::MissingId(User::name()))
    }
}
