//! Wire representation of the products endpoint.
//!
//! `GET {base}/products` returns a JSON array of these records. Nothing
//! outside [`crate::mapper`] should see them.

use serde::{Deserialize, Serialize};

/// One product record as sent by the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    /// Product id
    pub id: i64,
    /// Title
    pub title: String,
    /// Price
    pub price: f64,
    /// Description
    pub description: String,
    /// Category key
    pub category: String,
    /// Image URL
    pub image: String,
    /// Rating block
    pub rating: RatingDto,
}

/// Rating block of a product record
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingDto {
    /// Average rating
    pub rate: f64,
    /// Number of ratings
    pub count: u32,
}
