pub mod auth;
pub mod client;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::GoogleSheetsClient;
