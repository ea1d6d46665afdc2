use std::time::{Duration, Instant};

use bson::oid::ObjectId;
use chrono::Utc;

use crate::client::heart::FLOAT_DURATION;
use crate::client::typeahead::{ACTIVE_CLASS, RESULT_CLASS};
use crate::client::{HeartButton, Key, StoreClient, TypeAhead};
use crate::models::store::{Location, Store};
use crate::models::user::User;

fn store(name: &str, slug: &str) -> Store {
    Store {
        id: Some(ObjectId::new()),
        name: name.into(),
        slug: slug.into(),
        description: None,
        tags: Vec::new(),
        created: Utc::now(),
        location: Location::default(),
        photo: None,
        author: ObjectId::new(),
        score: None,
    }
}

fn results() -> Vec<Store> {
    vec![
        store("Coffee Hub", "coffee-hub"),
        store("Coffee Bar", "coffee-bar"),
        store("Coffee Cart", "coffee-cart"),
    ]
}

#[test]
fn test_client_urls() {
    let client = StoreClient::new("http://localhost:7777/");

    assert_eq!(
        client.url("/api/search"),
        "http://localhost:7777/api/search"
    );
}

#[test]
fn test_typeahead_navigation_wraps() {
    let mut typeahead = TypeAhead::new();
    typeahead.show("coffee", &results());

    assert_eq!(typeahead.active(), None);

    typeahead.key(Key::Down);
    assert_eq!(typeahead.active().as_deref(), Some("/store/coffee-hub"));
    assert!(typeahead.markup.contains(&format!(
        r#"class="{} {}""#,
        RESULT_CLASS, ACTIVE_CLASS
    )));
    typeahead.key(Key::Down);
    typeahead.key(Key::Down);
    assert_eq!(typeahead.active().as_deref(), Some("/store/coffee-cart"));
    typeahead.key(Key::Down);
    assert_eq!(typeahead.active().as_deref(), Some("/store/coffee-hub"));

    typeahead.key(Key::Up);
    assert_eq!(typeahead.active().as_deref(), Some("/store/coffee-cart"));

    assert_eq!(typeahead.key(Key::Other), None);
    assert_eq!(typeahead.active().as_deref(), Some("/store/coffee-cart"));
}

#[test]
fn test_typeahead_up_from_nothing_selects_last() {
    let mut typeahead = TypeAhead::new();
    typeahead.show("coffee", &results());

    typeahead.key(Key::Up);

    assert_eq!(typeahead.active().as_deref(), Some("/store/coffee-cart"));
}

#[test]
fn test_typeahead_enter_follows_active() {
    let mut typeahead = TypeAhead::new();
    typeahead.show("coffee", &results());

    assert_eq!(typeahead.key(Key::Enter), None);

    typeahead.key(Key::Down);
    typeahead.key(Key::Down);
    assert_eq!(
        typeahead.key(Key::Enter),
        Some("/store/coffee-bar".to_owned())
    );
}

#[test]
fn test_typeahead_keys_without_results() {
    let mut typeahead = TypeAhead::new();
    typeahead.show("tea", &[]);

    assert!(typeahead.visible);
    assert_eq!(
        typeahead.markup,
        format!(r#"<div class="{}">No results for tea found</div>"#, RESULT_CLASS)
    );
    assert_eq!(typeahead.key(Key::Down), None);
    assert_eq!(typeahead.active(), None);
}

#[test]
fn test_typeahead_sanitizes_markup() {
    let mut typeahead = TypeAhead::new();
    typeahead.show(
        "x",
        &[store("<img src=x onerror=alert(1)>Evil<script>alert(2)</script>", "evil")],
    );

    assert!(typeahead.markup.contains(r#"href="/store/evil""#));
    assert!(typeahead.markup.contains(&format!(r#"class="{}""#, RESULT_CLASS)));
    assert!(typeahead.markup.contains("Evil"));
    assert!(!typeahead.markup.contains("<script"));
    assert!(!typeahead.markup.contains("onerror"));

    typeahead.show("<script>alert(3)</script>", &[]);
    assert!(!typeahead.markup.contains("<script"));
}

#[test]
fn test_typeahead_new_results_reset_highlight() {
    let mut typeahead = TypeAhead::new();
    typeahead.show("coffee", &results());
    typeahead.key(Key::Down);

    assert!(typeahead.markup.contains(ACTIVE_CLASS));

    typeahead.show("coffee b", &results()[1..]);

    assert_eq!(typeahead.active(), None);
    assert!(!typeahead.markup.contains(ACTIVE_CLASS));
}

#[actix_rt::test]
async fn test_typeahead_empty_input_hides() {
    let client = StoreClient::new("http://localhost:7777");
    let mut typeahead = TypeAhead::new();
    typeahead.show("coffee", &results());

    typeahead.input(&client, "").await.unwrap();

    assert!(!typeahead.visible);
}

#[test]
fn test_heart_button_toggles_and_floats() {
    let store = ObjectId::new();
    let mut button = HeartButton::new(store, false);
    assert_eq!(button.action, format!("/stores/{}/heart", store.to_hex()));

    let mut user = User::new(ObjectId::new());
    user.hearts = vec![store, ObjectId::new()];
    let now = Instant::now();

    assert!(button.apply(&user, now));
    assert_eq!(button.count, 2);
    assert!(button.is_floating(now + Duration::from_millis(100)));
    assert!(!button.is_floating(now + FLOAT_DURATION));

    user.hearts.remove(0);
    assert!(!button.apply(&user, now));
    assert!(!button.hearted);
    assert_eq!(button.count, 1);
}

#[test]
fn test_heart_button_unhearting_does_not_float() {
    let mut button = HeartButton::new(ObjectId::new(), true);
    let now = Instant::now();

    assert!(!button.apply(&User::new(ObjectId::new()), now));
    assert!(!button.is_floating(now));
}
