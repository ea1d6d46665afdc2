use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};

use bson::oid::ObjectId;

use crate::data::Data;
use crate::error::AppError;
use crate::models::store::{Store, StoreView, TopStore};
use crate::services::form::read_store_form;
use crate::services::user::CurrentUser;
use crate::services::{self, Flash};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(get_stores);
    cfg.service(get_stores_page);
    cfg.service(add_store);
    cfg.service(create_store);
    cfg.service(update_store);
    cfg.service(edit_store);
    cfg.service(get_store_by_slug);
    cfg.service(get_top_stores);
}

#[derive(Serialize)]
struct StoresContent {
    stores: Vec<StoreView>,
    page: u64,
    pages: u64,
    count: u64,
}

#[derive(Serialize)]
struct StoreContent<T> {
    store: Option<T>,
}

#[derive(Serialize)]
struct TopContent {
    stores: Vec<TopStore>,
}

pub fn parse_id<S: AsRef<str>>(id: S) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id.as_ref())
        .map_err(|_| AppError::NotFound("No store found with this id!".into()))
}

async fn stores_page(data: &Data, page: u64) -> Result<HttpResponse, AppError> {
    let listing = data.list_stores(page).await?;

    if listing.is_out_of_range() {
        let last = listing.pages.max(1);

        return Ok(services::redirect(
            format!("/stores/page/{}", last),
            Some((
                Flash::Info,
                format!(
                    "You asked for page {}. But that doesn't exist. So I put you on page {}",
                    listing.page, last
                ),
            )),
        ));
    }

    Ok(services::page(
        "Stores",
        StoresContent {
            stores: listing.stores,
            page: listing.page,
            pages: listing.pages,
            count: listing.count,
        },
    ))
}

#[get("/")]
pub async fn home(data: web::Data<Data>) -> Result<HttpResponse, AppError> {
    stores_page(&data, 1).await
}

#[get("/stores")]
pub async fn get_stores(data: web::Data<Data>) -> Result<HttpResponse, AppError> {
    stores_page(&data, 1).await
}

#[get("/stores/page/{page}")]
pub async fn get_stores_page(
    data: web::Data<Data>,
    page: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    stores_page(&data, page.into_inner()).await
}

#[get("/add")]
pub async fn add_store(_user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(services::page(
        "Add Store",
        StoreContent::<Store> { store: None },
    ))
}

#[post("/add")]
pub async fn create_store(
    data: web::Data<Data>,
    user: CurrentUser,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = read_store_form(payload).await?;
    let store = data.create_store(user.0, form).await?;

    Ok(services::redirect(
        format!("/store/{}", store.slug),
        Some((
            Flash::Success,
            format!("Successfully Created {}. Care to leave a review?", store.name),
        )),
    ))
}

#[get("/stores/{id}/edit")]
pub async fn edit_store(
    data: web::Data<Data>,
    user: CurrentUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = data.store_for_edit(parse_id(id.as_str())?, user.0).await?;

    Ok(services::page(
        format!("Edit {}", store.name),
        StoreContent { store: Some(store) },
    ))
}

#[post("/add/{id}")]
pub async fn update_store(
    data: web::Data<Data>,
    user: CurrentUser,
    id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(id.as_str())?;
    // Ownership is settled before the form is read.
    data.store_for_edit(id, user.0).await?;

    let form = read_store_form(payload).await?;
    let store = data.update_store(id, user.0, form).await?;

    Ok(services::redirect(
        format!("/stores/{}/edit", id),
        Some((
            Flash::Success,
            format!(
                "Successfully updated {}. View store at /store/{}",
                store.name, store.slug
            ),
        )),
    ))
}

#[get("/store/{slug}")]
pub async fn get_store_by_slug(
    data: web::Data<Data>,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    match data.store_by_slug(slug.as_str()).await? {
        Some(view) => Ok(services::page(
            view.store.name.clone(),
            StoreContent { store: Some(view) },
        )),
        None => services::not_found().await,
    }
}

#[get("/top")]
pub async fn get_top_stores(data: web::Data<Data>) -> Result<HttpResponse, AppError> {
    let stores = data.top_stores().await?;

    Ok(services::page("★ Top Stores!", TopContent { stores }))
}
