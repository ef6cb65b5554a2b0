// src/sources/mod.rs
pub mod apod;
pub mod donki;
pub mod types;

pub use apod::{display_url_or_fallback, ApodClient, FALLBACK_IMAGE};
pub use donki::DonkiClient;
pub use types::{NotificationFeed, Picture, PictureSource, RawNotification};
