use std::collections::HashMap;
use std::sync::Arc;

use bson::oid::ObjectId;
use futures_lite::future;
use log::info;
use thiserror::Error;

use crate::database::{Database, DatabaseError, Page, StoreFilter};
use crate::file::photo::{self, PhotoError};
use crate::file::FileProvider;
use crate::models::review::{Review, ReviewForm};
use crate::models::store::{Store, StoreForm, StoreLocation, StoreView, TagCount, TopStore};
use crate::models::user::User;
use crate::utils;


pub type FileType = Arc<dyn FileProvider>;
pub type DatabaseType = Arc<dyn Database>;

pub const PAGE_SIZE: u64 = 4;
pub const SEARCH_LIMIT: i64 = 5;
pub const NEAR_LIMIT: i64 = 10;
/// Proximity search radius, in meters.
pub const NEAR_MAX_DISTANCE: f64 = 10_000.0;
pub const TOP_LIMIT: i64 = 10;
pub const TOP_MIN_REVIEWS: usize = 2;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),
    #[error("You must own a store in order to edit it")]
    NotOwner,
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Photo(#[from] PhotoError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type DataResult<T> = Result<T, DataError>;

/// One page of the store listing.
#[derive(Debug, Serialize)]
pub struct StorePage {
    pub stores: Vec<StoreView>,
    pub page: u64,
    pub pages: u64,
    pub count: u64,
}

impl StorePage {
    /// A page past the last one: nothing on it while earlier pages exist.
    pub fn is_out_of_range(&self) -> bool {
        self.stores.is_empty() && self.page > 1
    }
}

/// The store repository: validation, slug assignment and population on top of a
/// [`Database`], plus the file provider photos are written to.
#[derive(Clone)]
pub struct Data {
    pub file: FileType,
    database: DatabaseType,
}

impl Data {
    pub fn new(file: FileType, database: DatabaseType) -> Self {
        Data { file, database }
    }

    pub async fn list_stores(&self, page: u64) -> DataResult<StorePage> {
        let page = page.max(1);
        let filter = StoreFilter::All;
        let slice = Page {
            skip: utils::page_skip(page, PAGE_SIZE),
            limit: PAGE_SIZE as i64,
        };

        let (stores, count) = future::try_zip(
            self.database.find_stores(&filter, Some(slice)),
            self.database.count_stores(&filter),
        )
        .await?;

        Ok(StorePage {
            stores: self.populate(stores).await?,
            page,
            pages: utils::page_count(count, PAGE_SIZE),
            count,
        })
    }

    pub async fn create_store(&self, author: ObjectId, mut form: StoreForm) -> DataResult<Store> {
        let upload = form.upload.take();
        let mut store = Store::new(author, form);
        store.validate().map_err(DataError::Validation)?;
        self.store_photo(&mut store, upload).await?;
        self.assign_slug(&mut store).await?;
        store.id = Some(ObjectId::new());

        self.database.insert_store(&store).await?;
        info!("Store \"{}\" created as /store/{}.", store.name, store.slug);

        Ok(store)
    }

    /// Loads a store for editing, refusing anyone but its author.
    pub async fn store_for_edit(&self, id: ObjectId, user: ObjectId) -> DataResult<Store> {
        let store = self
            .database
            .find_store(&StoreFilter::Id(id))
            .await?
            .ok_or_else(|| DataError::NotFound("No store found with this id!".into()))?;
        confirm_owner(&store, &user)?;

        Ok(store)
    }

    pub async fn update_store(
        &self,
        id: ObjectId,
        user: ObjectId,
        mut form: StoreForm,
    ) -> DataResult<Store> {
        let mut store = self.store_for_edit(id, user).await?;

        let upload = form.upload.take();
        let renamed = store.apply(form);
        store.validate().map_err(DataError::Validation)?;
        self.store_photo(&mut store, upload).await?;
        if renamed {
            self.assign_slug(&mut store).await?;
        }

        self.database.replace_store(&store).await?;
        info!("Store {} updated as /store/{}.", id, store.slug);

        Ok(store)
    }

    pub async fn store_by_slug<S: AsRef<str>>(&self, slug: S) -> DataResult<Option<StoreView>> {
        let store = match self
            .database
            .find_store(&StoreFilter::Slug(slug.as_ref().into()))
            .await?
        {
            Some(store) => store,
            None => return Ok(None),
        };

        let author_user = self.database.find_user(store.author).await?;
        let mut views = self.populate(vec![store]).await?;

        Ok(views.pop().map(|view| StoreView { author_user, ..view }))
    }

    pub async fn stores_by_tag(
        &self,
        tag: Option<String>,
    ) -> DataResult<(Vec<TagCount>, Vec<StoreView>)> {
        let filter = StoreFilter::Tagged(tag);

        let (tags, stores) = future::try_zip(
            self.database.tags_list(),
            self.database.find_stores(&filter, None),
        )
        .await?;

        Ok((tags, self.populate(stores).await?))
    }

    pub async fn search_stores<S: AsRef<str>>(&self, query: S) -> DataResult<Vec<Store>> {
        let query = query.as_ref().trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self.database.search_stores(query, SEARCH_LIMIT).await?)
    }

    pub async fn stores_near(&self, lng: f64, lat: f64) -> DataResult<Vec<StoreLocation>> {
        Ok(self
            .database
            .stores_near([lng, lat], NEAR_MAX_DISTANCE, NEAR_LIMIT)
            .await?)
    }

    /// Hearts the store for the user, or un-hearts it if it was already hearted.
    pub async fn toggle_heart(&self, user: ObjectId, store: ObjectId) -> DataResult<User> {
        let operation = match self.database.find_user(user).await? {
            Some(current) => current.heart_operation(&store),
            None => User::new(user).heart_operation(&store),
        };

        Ok(self
            .database
            .update_hearts(user, store, operation)
            .await?)
    }

    pub async fn hearted_stores(&self, user: ObjectId) -> DataResult<Vec<StoreView>> {
        let hearts = match self.database.find_user(user).await? {
            Some(user) => user.hearts,
            None => return Ok(Vec::new()),
        };

        let stores = self
            .database
            .find_stores(&StoreFilter::Ids(hearts), None)
            .await?;

        self.populate(stores).await
    }

    pub async fn top_stores(&self) -> DataResult<Vec<TopStore>> {
        Ok(self
            .database
            .top_stores(TOP_MIN_REVIEWS, TOP_LIMIT)
            .await?)
    }

    /// Stores a review of the store, returning the store it was left on.
    pub async fn add_review(
        &self,
        author: ObjectId,
        store: ObjectId,
        form: ReviewForm,
    ) -> DataResult<Store> {
        let reviewed = self
            .database
            .find_store(&StoreFilter::Id(store))
            .await?
            .ok_or_else(|| DataError::NotFound("No store found with this id!".into()))?;

        let mut review = Review::new(author, store, form).map_err(DataError::Validation)?;
        review.id = Some(ObjectId::new());
        self.database.insert_review(&review).await?;

        Ok(reviewed)
    }

    /// Writes a held-back upload and points the store at it.
    async fn store_photo(
        &self,
        store: &mut Store,
        upload: Option<photo::PhotoUpload>,
    ) -> DataResult<()> {
        if let Some(upload) = upload {
            store.photo = Some(photo::save_photo(&self.file, upload).await?);
        }

        Ok(())
    }

    /// Derives the slug from the name, numbering it past any stores already using it.
    async fn assign_slug(&self, store: &mut Store) -> DataResult<()> {
        let base = utils::slugify(&store.name);
        let taken = self.database.count_slugs(&base, store.id).await?;

        store.slug = if taken > 0 {
            format!("{}-{}", base, taken + 1)
        } else {
            base
        };

        Ok(())
    }

    /// Attaches each store's reviews with a single query.
    async fn populate(&self, stores: Vec<Store>) -> DataResult<Vec<StoreView>> {
        let ids = stores.iter().filter_map(|store| store.id).collect::<Vec<_>>();

        let mut reviews = HashMap::<ObjectId, Vec<Review>>::new();
        for review in self.database.reviews_for(&ids).await? {
            reviews.entry(review.store).or_default().push(review);
        }

        Ok(stores
            .into_iter()
            .map(|store| StoreView {
                reviews: store
                    .id
                    .and_then(|id| reviews.remove(&id))
                    .unwrap_or_default(),
                store,
                author_user: None,
            })
            .collect())
    }
}

pub fn confirm_owner(store: &Store, user: &ObjectId) -> DataResult<()> {
    if store.is_owned_by(user) {
        Ok(())
    } else {
        Err(DataError::NotOwner)
    }
}
