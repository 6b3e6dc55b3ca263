//! Request payloads and generated photos shared by the integration and
//! end-to-end suites.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;

/// Onboarding payload for a worker.
pub fn worker_profile(name: &str) -> Value {
    json!({
        "role": "worker",
        "display_name": name,
        "location": "Rotterdam",
    })
}

/// Onboarding payload for a company.
pub fn company_profile(name: &str) -> Value {
    json!({
        "role": "company",
        "display_name": format!("{name} HR"),
        "company_name": name,
        "location": "Rotterdam",
    })
}

/// A shift of `hours` length starting `starts_in` from now.
pub fn shift_request(starts_in: Duration, hours: i64, vacancies: i32) -> Value {
    let starts_at = Utc::now() + starts_in;
    shift_at(starts_at, starts_at + Duration::hours(hours), vacancies)
}

pub fn shift_at(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, vacancies: i32) -> Value {
    json!({
        "title": "Warehouse picker",
        "description": "Order picking on the night line",
        "location": "Rotterdam Port, Hall 4",
        "starts_at": starts_at,
        "ends_at": ends_at,
        "hourly_rate_cents": 1850,
        "vacancies": vacancies,
    })
}

/// Solid-colour photo encoded as `format`.
pub fn photo(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([90, 120, 200])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test photo");
    buf
}

/// A photo comfortably above the screening minimum.
pub fn id_card_photo() -> Vec<u8> {
    photo(640, 400, ImageFormat::Png)
}

pub fn selfie_photo() -> Vec<u8> {
    photo(480, 640, ImageFormat::Jpeg)
}

/// A photo the screening step rejects for its resolution.
pub fn tiny_photo() -> Vec<u8> {
    photo(64, 48, ImageFormat::Png)
}
