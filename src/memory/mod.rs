use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use bson::oid::ObjectId;
use regex::RegexBuilder;

use crate::database::{slug_pattern, Database, DatabaseError, Page, StoreFilter};
use crate::models::review::Review;
use crate::models::store::{Store, StoreLocation, TagCount, TopStore};
use crate::models::user::{HeartOperation, User};
use crate::models::Model;

#[cfg(test)]
mod tests;

/// Mean earth radius in meters, the one MongoDB uses for spherical distances.
const EARTH_RADIUS: f64 = 6_378_100.0;

#[derive(Default)]
struct Collections {
    stores: Vec<Store>,
    reviews: Vec<Review>,
    users: Vec<User>,
}

/// Process-local document store running the same queries as [`crate::mongo::MongoDB`].
#[derive(Clone, Default)]
pub struct InMemory {
    collections: Arc<RwLock<Collections>>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, DatabaseError> {
        self.collections.read().map_err(|_| DatabaseError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, DatabaseError> {
        self.collections.write().map_err(|_| DatabaseError::Poisoned)
    }

    fn newest_first(stores: &mut Vec<Store>) {
        stores.sort_by(|a, b| b.created.cmp(&a.created));
    }

    fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    /// Counts the query terms found among the store's name and description words.
    fn text_score(store: &Store, terms: &[String]) -> f64 {
        let words = Self::terms(&format!(
            "{} {}",
            store.name,
            store.description.as_deref().unwrap_or("")
        ));

        terms
            .iter()
            .map(|term| words.iter().filter(|word| *word == term).count())
            .sum::<usize>() as f64
    }

    /// Great-circle distance in meters between two `[lng, lat]` points.
    fn distance(from: [f64; 2], to: [f64; 2]) -> f64 {
        let (lng1, lat1) = (from[0].to_radians(), from[1].to_radians());
        let (lng2, lat2) = (to[0].to_radians(), to[1].to_radians());

        let a = ((lat2 - lat1) / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * ((lng2 - lng1) / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS * a.sqrt().asin()
    }
}

#[async_trait]
impl Database for InMemory {
    async fn insert_store(&self, store: &Store) -> Result<(), DatabaseError> {
        store.id.ok_or(DatabaseError::MissingId(Store::name()))?;
        self.write()?.stores.push(store.clone());

        Ok(())
    }

    async fn replace_store(&self, store: &Store) -> Result<(), DatabaseError> {
        let id = store.id.ok_or(DatabaseError::MissingId(Store::name()))?;
        let mut collections = self.write()?;

        if let Some(existing) = collections.stores.iter_mut().find(|s| s.id == Some(id)) {
            *existing = store.clone();
        }

        Ok(())
    }

    async fn find_store(&self, filter: &StoreFilter) -> Result<Option<Store>, DatabaseError> {
        Ok(self
            .read()?
            .stores
            .iter()
            .find(|store| filter.matches(store))
            .cloned())
    }

    async fn find_stores(
        &self,
        filter: &StoreFilter,
        page: Option<Page>,
    ) -> Result<Vec<Store>, DatabaseError> {
        let mut stores = self
            .read()?
            .stores
            .iter()
            .filter(|store| filter.matches(store))
            .cloned()
            .collect::<Vec<_>>();
        Self::newest_first(&mut stores);

        Ok(match page {
            Some(page) => stores
                .into_iter()
                .skip(page.skip as usize)
                .take(page.limit.max(0) as usize)
                .collect(),
            None => stores,
        })
    }

    async fn count_stores(&self, filter: &StoreFilter) -> Result<u64, DatabaseError> {
        Ok(self
            .read()?
            .stores
            .iter()
            .filter(|store| filter.matches(store))
            .count() as u64)
    }

    async fn count_slugs(
        &self,
        base: &str,
        exclude: Option<ObjectId>,
    ) -> Result<u64, DatabaseError> {
        let pattern = RegexBuilder::new(&slug_pattern(base))
            .case_insensitive(true)
            .build()?;

        Ok(self
            .read()?
            .stores
            .iter()
            .filter(|store| exclude.is_none() || store.id != exclude)
            .filter(|store| pattern.is_match(&store.slug))
            .count() as u64)
    }

    async fn tags_list(&self) -> Result<Vec<TagCount>, DatabaseError> {
        let mut counts = HashMap::<String, i64>::new();
        for store in self.read()?.stores.iter() {
            for tag in store.tags.iter() {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut tags = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect::<Vec<_>>();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));

        Ok(tags)
    }

    async fn search_stores(&self, query: &str, limit: i64) -> Result<Vec<Store>, DatabaseError> {
        let terms = Self::terms(query);

        let mut hits = self
            .read()?
            .stores
            .iter()
            .filter_map(|store| {
                let score = Self::text_score(store, &terms);
                if score > 0.0 {
                    let mut store = store.clone();
                    store.score = Some(score);
                    Some(store)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(limit.max(0) as usize);

        Ok(hits)
    }

    async fn stores_near(
        &self,
        coordinates: [f64; 2],
        max_distance: f64,
        limit: i64,
    ) -> Result<Vec<StoreLocation>, DatabaseError> {
        let collections = self.read()?;

        let mut near = collections
            .stores
            .iter()
            .filter_map(|store| match store.location.coordinates.as_slice() {
                [lng, lat] => Some((Self::distance(coordinates, [*lng, *lat]), store)),
                _ => None,
            })
            .filter(|(distance, _)| *distance <= max_distance)
            .collect::<Vec<_>>();
        near.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        Ok(near
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, store)| StoreLocation::from(store))
            .collect())
    }

    async fn top_stores(
        &self,
        min_reviews: usize,
        limit: i64,
    ) -> Result<Vec<TopStore>, DatabaseError> {
        let collections = self.read()?;

        let mut top = collections
            .stores
            .iter()
            .filter_map(|store| {
                let reviews = collections
                    .reviews
                    .iter()
                    .filter(|review| store.id == Some(review.store))
                    .cloned()
                    .collect::<Vec<_>>();

                if reviews.is_empty() || reviews.len() < min_reviews {
                    return None;
                }

                let average_rating = reviews
                    .iter()
                    .map(|review| f64::from(review.rating))
                    .sum::<f64>()
                    / reviews.len() as f64;

                Some(TopStore {
                    id: store.id?,
                    name: store.name.clone(),
                    slug: store.slug.clone(),
                    photo: store.photo.clone(),
                    reviews,
                    average_rating,
                })
            })
            .collect::<Vec<_>>();
        top.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
        });
        top.truncate(limit.max(0) as usize);

        Ok(top)
    }

    async fn insert_review(&self, review: &Review) -> Result<(), DatabaseError> {
        review.id.ok_or(DatabaseError::MissingId(Review::name()))?;
        self.write()?.reviews.push(review.clone());

        Ok(())
    }

    async fn reviews_for(&self, stores: &[ObjectId]) -> Result<Vec<Review>, DatabaseError> {
        let mut reviews = self
            .read()?
            .reviews
            .iter()
            .filter(|review| stores.contains(&review.store))
            .cloned()
            .collect::<Vec<_>>();
        reviews.sort_by(|a, b| b.created.cmp(&a.created));

        Ok(reviews)
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, DatabaseError> {
        Ok(self.read()?.users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.write()?.users.push(user.clone());

        Ok(())
    }

    async fn update_hearts(
        &self,
        user: ObjectId,
        store: ObjectId,
        operation: HeartOperation,
    ) -> Result<User, DatabaseError> {
        let mut collections = self.write()?;

        let index = match collections.users.iter().position(|u| u.id == user) {
            Some(index) => index,
            None => {
                collections.users.push(User::new(user));
                collections.users.len() - 1
            }
        };

        let entry = &mut collections.users[index];
        match operation {
            HeartOperation::Add => {
                if !entry.hearts.contains(&store) {
                    entry.hearts.push(store);
                }
            }
            HeartOperation::Remove => entry.hearts.retain(|heart| heart != &store),
        }

        Ok(entry.clone())
    }
}
