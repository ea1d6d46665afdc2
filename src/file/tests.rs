use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageOutputFormat, RgbImage};

use regex::Regex;

use crate::data::tests::test_data;
use crate::file::photo::{self, PhotoError, PhotoUpload, MAX_WIDTH};

fn encode(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buffer, format)
        .unwrap();

    buffer.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageOutputFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageOutputFormat::Jpeg(80))
}

fn upload(content_type: mime::Mime, bytes: Vec<u8>) -> PhotoUpload {
    PhotoUpload::new(content_type, bytes).unwrap()
}

#[test]
fn test_only_images_are_photos() {
    assert!(photo::is_photo(&mime::IMAGE_PNG));
    assert!(photo::is_photo(&mime::IMAGE_JPEG));
    assert!(!photo::is_photo(&mime::TEXT_PLAIN));
    assert!(!photo::is_photo(&mime::APPLICATION_PDF));
}

#[test]
fn test_photo_filename() {
    let pattern =
        Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}\.png$").unwrap();

    let first = photo::photo_filename(ImageFormat::Png);
    let second = photo::photo_filename(ImageFormat::Png);

    assert!(pattern.is_match(&first), "{} isn't a uuid filename", first);
    assert_ne!(first, second);
    assert!(photo::photo_filename(ImageFormat::Jpeg).ends_with(".jpg"));
}

#[test]
fn test_resize_scales_down_wide_photos() {
    let (resized, format) = photo::resize(&png(1600, 900), MAX_WIDTH).unwrap();
    let resized = image::load_from_memory(&resized).unwrap();

    assert_eq!(format, ImageFormat::Png);
    assert_eq!(resized.dimensions(), (800, 450));
}

#[test]
fn test_resize_keeps_narrow_photos() {
    let (resized, _) = photo::resize(&png(320, 200), MAX_WIDTH).unwrap();
    let resized = image::load_from_memory(&resized).unwrap();

    assert_eq!(resized.dimensions(), (320, 200));
}

#[test]
fn test_resize_rejects_garbage() {
    assert!(photo::resize(b"definitely not an image", MAX_WIDTH).is_err());
}

#[actix_rt::test]
async fn test_save_photo_writes_resized_file() {
    let data = test_data();

    let filename = photo::save_photo(&data.file, upload(mime::IMAGE_PNG, png(1200, 1200)))
        .await
        .unwrap();
    assert!(filename.ends_with(".png"));

    let stored = data
        .file
        .load(&data.file.generate_filepath(&filename))
        .await
        .unwrap();
    let stored = image::load_from_memory(&stored).unwrap();

    assert!(stored.width() <= MAX_WIDTH);
    assert_eq!(stored.dimensions(), (800, 800));
}

#[test]
fn test_upload_rejects_text() {
    let result = PhotoUpload::new(mime::TEXT_PLAIN, b"hello".to_vec());

    assert!(matches!(result, Err(PhotoError::NotAllowed)));
}

#[actix_rt::test]
async fn test_save_photo_names_detected_format() {
    let data = test_data();

    let filename = photo::save_photo(&data.file, upload(mime::IMAGE_PNG, jpeg(400, 300)))
        .await
        .unwrap();
    assert!(filename.ends_with(".jpg"), "{} should carry the JPEG extension", filename);

    let stored = data
        .file
        .load(&data.file.generate_filepath(&filename))
        .await
        .unwrap();
    assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);
}

#[actix_rt::test]
async fn test_save_photo_rejects_garbage_without_writing() {
    let data = test_data();

    let result = photo::save_photo(&data.file, upload(mime::IMAGE_PNG, b"nope".to_vec())).await;

    assert!(matches!(result, Err(PhotoError::Image(_))));
    assert!(std::fs::read_dir(data.file.base_path()).is_err());
}
