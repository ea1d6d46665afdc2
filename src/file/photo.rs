use std::io::Cursor;

use actix_web::error::BlockingError;
use actix_web::web;

use image::imageops::FilterType;
use image::{ImageError, ImageFormat, ImageOutputFormat};

use log::info;

use mime::Mime;

use thiserror::Error;

use uuid::Uuid;

use crate::data::FileType;
use crate::file::FileError;

pub const MAX_WIDTH: u32 = 800;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("That filetype isn't allowed!")]
    NotAllowed,
    #[error("Couldn't process the uploaded photo: {0}")]
    Image(#[from] ImageError),
    #[error("Couldn't store the uploaded photo: {0}")]
    File(#[from] FileError),
    #[error("Blocking error: {0}")]
    Blocking(#[from] BlockingError),
}

pub fn is_photo(content_type: &Mime) -> bool {
    content_type.type_() == mime::IMAGE
}

/// An uploaded photo held back until the store it belongs to is known to be valid.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Accepts the part only when its declared type is an image.
    pub fn new(content_type: Mime, bytes: Vec<u8>) -> Result<Self, PhotoError> {
        if !is_photo(&content_type) {
            return Err(PhotoError::NotAllowed);
        }

        Ok(Self {
            content_type,
            bytes,
        })
    }
}

/// A fresh `{uuid}.{ext}` name, the extension being the encoded format's.
pub fn photo_filename(format: ImageFormat) -> String {
    format!(
        "{}.{}",
        Uuid::new_v4(),
        format.extensions_str().first().copied().unwrap_or("img")
    )
}

/// Scales the image down to `max_width` keeping its aspect ratio, re-encoded in
/// the format detected from its content. Narrower images are only re-encoded.
pub fn resize(bytes: &[u8], max_width: u32) -> Result<(Vec<u8>, ImageFormat), ImageError> {
    let format = image::guess_format(bytes)?;
    let photo = image::load_from_memory_with_format(bytes, format)?;

    let photo = if photo.width() > max_width {
        photo.resize(max_width, photo.height(), FilterType::Triangle)
    } else {
        photo
    };

    let mut buffer = Cursor::new(Vec::new());
    photo.write_to(&mut buffer, ImageOutputFormat::from(format))?;

    Ok((buffer.into_inner(), format))
}

/// Resizes and stores an accepted upload, returning the generated filename.
pub async fn save_photo(file: &FileType, upload: PhotoUpload) -> Result<String, PhotoError> {
    let declared = upload.content_type;
    let bytes = upload.bytes;
    let (resized, format) = web::block(move || resize(&bytes, MAX_WIDTH)).await??;

    let filename = photo_filename(format);
    file.save(file.generate_filepath(&filename).as_str(), resized)
        .await?;
    info!("Photo {} ({}) stored.", filename, declared);

    Ok(filename)
}
