use actix_web::{get, web, HttpResponse};

use crate::data::Data;
use crate::error::AppError;
use crate::models::store::{StoreView, TagCount};
use crate::services;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_tags);
    cfg.service(get_stores_by_tag);
}

#[derive(Serialize)]
struct TagsContent {
    tag: Option<String>,
    tags: Vec<TagCount>,
    stores: Vec<StoreView>,
}

async fn tags_page(data: &Data, tag: Option<String>) -> Result<HttpResponse, AppError> {
    let (tags, stores) = data.stores_by_tag(tag.clone()).await?;

    Ok(services::page("Tags", TagsContent { tag, tags, stores }))
}

#[get("/tags")]
pub async fn get_tags(data: web::Data<Data>) -> Result<HttpResponse, AppError> {
    tags_page(&data, None).await
}

#[get("/tags/{tag}")]
pub async fn get_stores_by_tag(
    data: web::Data<Data>,
    tag: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    tags_page(&data, Some(tag.into_inner())).await
}
