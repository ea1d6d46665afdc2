use bson::oid::ObjectId;

use crate::models::review::{Review, ReviewForm};
use crate::models::store::{Store, StoreForm};

#[test]
fn test_dates_are_stored_as_bson_datetimes() {
    let form = StoreForm {
        name: "Dated".into(),
        address: "1 Queen St W, Toronto".into(),
        lng: Some(-79.3832),
        lat: Some(43.6532),
        ..StoreForm::default()
    };
    let store = Store::new(ObjectId::new(), form);

    let document = bson::to_document(&store).unwrap();
    let created = document.get_datetime("created").unwrap();
    assert_eq!(created.timestamp_millis(), store.created.timestamp_millis());

    let loaded: Store = bson::from_document(document).unwrap();
    assert_eq!(
        loaded.created.timestamp_millis(),
        store.created.timestamp_millis()
    );

    let review = Review::new(
        ObjectId::new(),
        store.id.unwrap_or_else(ObjectId::new),
        ReviewForm {
            text: "Lovely".into(),
            rating: Some(4),
        },
    )
    .unwrap();
    let document = bson::to_document(&review).unwrap();
    assert!(document.get_datetime("created").is_ok());
}
