use actix_multipart::{Field, Multipart};

use futures_lite::stream::StreamExt;

use log::info;

use crate::error::AppError;
use crate::file::photo::{self, PhotoError, PhotoUpload};
use crate::models::store::StoreForm;

pub const PHOTO_FIELD: &str = "photo";
/// Largest accepted text field, in bytes.
pub const MAX_FIELD_SIZE: usize = 16 * 1024;
/// Largest accepted photo, in bytes.
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

async fn read_field(field: &mut Field, name: &str, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Err(AppError::TooLarge(name.to_owned()));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|c| c.is_finite())
}

/// Reads the add/edit store form.
///
/// A `photo` part without a filename or content is treated as no upload; one that
/// isn't an image fails the whole form. An accepted photo is only held in the
/// form, the repository writes it once the store is valid.
pub async fn read_store_form(mut payload: Multipart) -> Result<StoreForm, AppError> {
    let mut form = StoreForm::default();

    while let Some(field) = payload.next().await {
        let mut field = field?;

        let name = field.content_disposition().get_name().unwrap_or("").to_owned();
        if name == PHOTO_FIELD {
            let filename = field
                .content_disposition()
                .get_filename()
                .unwrap_or("")
                .to_owned();
            if filename.is_empty() {
                read_field(&mut field, PHOTO_FIELD, MAX_PHOTO_SIZE).await?;
                continue;
            }

            let content_type = field
                .content_type()
                .cloned()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM);
            if !photo::is_photo(&content_type) {
                info!("Rejected upload \"{}\" of type {}.", filename, content_type);

                return Err(PhotoError::NotAllowed.into());
            }

            let bytes = read_field(&mut field, PHOTO_FIELD, MAX_PHOTO_SIZE).await?;
            if !bytes.is_empty() {
                form.upload = Some(PhotoUpload::new(content_type, bytes)?);
            }

            continue;
        }

        let value = read_field(&mut field, &name, MAX_FIELD_SIZE).await?;
        let value = String::from_utf8_lossy(&value).into_owned();
        match name.as_str() {
            "name" => form.name = value,
            "description" => form.description = value,
            "tags" | "tags[]" => form.tags.push(value),
            "location[address]" => form.address = value,
            "location[coordinates][0]" => form.lng = parse_coordinate(&value),
            "location[coordinates][1]" => form.lat = parse_coordinate(&value),
            _ => {}
        }
    }

    Ok(form)
}
