use bson::oid::ObjectId;
use chrono::{Duration, Utc};

use crate::database::{slug_pattern, Database, Page, StoreFilter};
use crate::memory::InMemory;
use crate::models::review::Review;
use crate::models::store::{Location, Store};
use crate::models::user::{HeartOperation, User};

fn store(slug: &str, coordinates: [f64; 2], tags: &[&str]) -> Store {
    Store {
        id: Some(ObjectId::new()),
        name: slug.replace('-', " "),
        slug: slug.into(),
        description: None,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        created: Utc::now(),
        location: Location {
            coordinates: coordinates.to_vec(),
            address: "Somewhere".into(),
            ..Location::default()
        },
        photo: None,
        author: ObjectId::new(),
        score: None,
    }
}

fn review(store: &Store, rating: u8) -> Review {
    Review {
        id: Some(ObjectId::new()),
        created: Utc::now(),
        author: ObjectId::new(),
        store: store.id.unwrap(),
        text: "Fine".into(),
        rating,
    }
}

#[test]
fn test_slug_pattern_escapes() {
    assert_eq!(slug_pattern("a.b"), r"^(a\.b)((-[0-9]*$)?)$");
}

#[actix_rt::test]
async fn test_count_slugs() {
    let database = InMemory::new();
    let first = store("pizza", [0.0, 0.0], &[]);
    for s in &[
        first.clone(),
        store("pizza-2", [0.0, 0.0], &[]),
        store("PIZZA-3", [0.0, 0.0], &[]),
        store("pizza-palace", [0.0, 0.0], &[]),
        store("deep-pizza", [0.0, 0.0], &[]),
    ] {
        database.insert_store(s).await.unwrap();
    }

    assert_eq!(database.count_slugs("pizza", None).await.unwrap(), 3);
    assert_eq!(database.count_slugs("pizza", first.id).await.unwrap(), 2);
    assert_eq!(database.count_slugs("pasta", None).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_find_stores_newest_first_and_paged() {
    let database = InMemory::new();
    let mut old = store("old", [0.0, 0.0], &[]);
    old.created = Utc::now() - Duration::days(1);
    database.insert_store(&old).await.unwrap();
    database
        .insert_store(&store("new", [0.0, 0.0], &[]))
        .await
        .unwrap();

    let stores = database.find_stores(&StoreFilter::All, None).await.unwrap();
    assert_eq!(stores[0].slug, "new");

    let second = database
        .find_stores(&StoreFilter::All, Some(Page { skip: 1, limit: 4 }))
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].slug, "old");
}

#[actix_rt::test]
async fn test_replace_store() {
    let database = InMemory::new();
    let mut original = store("before", [0.0, 0.0], &[]);
    database.insert_store(&original).await.unwrap();

    original.slug = "after".into();
    database.replace_store(&original).await.unwrap();

    assert!(database
        .find_store(&StoreFilter::Slug("before".into()))
        .await
        .unwrap()
        .is_none());
    assert_eq!(database.count_stores(&StoreFilter::All).await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_tags_list_sorted_by_count() {
    let database = InMemory::new();
    for s in &[
        store("a", [0.0, 0.0], &["Wifi", "Vegan"]),
        store("b", [0.0, 0.0], &["Wifi"]),
        store("c", [0.0, 0.0], &["Licensed", "Wifi", "Vegan"]),
    ] {
        database.insert_store(s).await.unwrap();
    }

    let tags = database.tags_list().await.unwrap();
    let tags = tags
        .iter()
        .map(|tag| (tag.tag.as_str(), tag.count))
        .collect::<Vec<_>>();

    assert_eq!(tags, vec![("Wifi", 3), ("Vegan", 2), ("Licensed", 1)]);
}

#[actix_rt::test]
async fn test_search_scores_and_limits() {
    let database = InMemory::new();
    let mut twice = store("tea-tea-house", [0.0, 0.0], &[]);
    twice.description = Some("Loose leaf tea".into());
    for s in &[
        store("tea-room", [0.0, 0.0], &[]),
        twice,
        store("coffee-bar", [0.0, 0.0], &[]),
    ] {
        database.insert_store(s).await.unwrap();
    }

    let hits = database.search_stores("TEA", 5).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].slug, "tea-tea-house");
    assert_eq!(hits[0].score, Some(3.0));

    assert_eq!(database.search_stores("tea", 1).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_stores_near_orders_by_distance() {
    let database = InMemory::new();
    for s in &[
        store("five-km", [-79.3832, 43.6982], &[]),
        store("here", [-79.3832, 43.6532], &[]),
        store("far-away", [-73.5673, 45.5017], &[]),
    ] {
        database.insert_store(s).await.unwrap();
    }

    let near = database
        .stores_near([-79.3832, 43.6532], 10_000.0, 10)
        .await
        .unwrap();

    assert_eq!(
        near.iter().map(|s| s.slug.as_str()).collect::<Vec<_>>(),
        vec!["here", "five-km"]
    );
}

#[actix_rt::test]
async fn test_top_stores() {
    let database = InMemory::new();
    let lone = store("lone", [0.0, 0.0], &[]);
    let pair = store("pair", [0.0, 0.0], &[]);
    database.insert_store(&lone).await.unwrap();
    database.insert_store(&pair).await.unwrap();

    database.insert_review(&review(&lone, 5)).await.unwrap();
    database.insert_review(&review(&pair, 2)).await.unwrap();
    database.insert_review(&review(&pair, 3)).await.unwrap();

    let top = database.top_stores(2, 10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].slug, "pair");
    assert!((top[0].average_rating - 2.5).abs() < f64::EPSILON);
}

#[actix_rt::test]
async fn test_update_hearts_upserts_and_dedupes() {
    let database = InMemory::new();
    let user = ObjectId::new();
    let heart = ObjectId::new();

    let created = database
        .update_hearts(user, heart, HeartOperation::Add)
        .await
        .unwrap();
    assert_eq!(created.hearts, vec![heart]);

    let again = database
        .update_hearts(user, heart, HeartOperation::Add)
        .await
        .unwrap();
    assert_eq!(again.hearts, vec![heart]);

    let removed = database
        .update_hearts(user, heart, HeartOperation::Remove)
        .await
        .unwrap();
    assert!(removed.hearts.is_empty());

    let mut known = User::new(ObjectId::new());
    known.name = Some("Wes".into());
    database.insert_user(&known).await.unwrap();
    let updated = database
        .update_hearts(known.id, heart, HeartOperation::Add)
        .await
        .unwrap();
    assert_eq!(updated.name.as_deref(), Some("Wes"));
    assert_eq!(database.find_user(known.id).await.unwrap(), Some(updated));
}
