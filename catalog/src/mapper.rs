//! Mapping layer: wire records to domain products.
//!
//! Mapping is all-or-nothing. A single bad record rejects the whole batch
//! with [`FetchError::MalformedData`], so the view state only ever holds a
//! coherent snapshot.

use crate::dto::{ProductDto, RatingDto};
use crate::error::FetchError;
use crate::types::{Product, ProductId, Rating};
use std::collections::HashSet;

/// Highest allowed average rating
pub const MAX_RATE: f64 = 5.0;

impl TryFrom<RatingDto> for Rating {
    type Error = String;

    fn try_from(dto: RatingDto) -> Result<Self, Self::Error> {
        if !(0.0..=MAX_RATE).contains(&dto.rate) {
            return Err(format!("rating {} outside [0, {MAX_RATE}]", dto.rate));
        }
        Ok(Self {
            rate: dto.rate,
            count: dto.count,
        })
    }
}

impl TryFrom<ProductDto> for Product {
    type Error = String;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        if dto.category.is_empty() {
            return Err("empty category".to_string());
        }
        // NaN fails this too
        if !(dto.price >= 0.0 && dto.price.is_finite()) {
            return Err(format!("invalid price {}", dto.price));
        }

        Ok(Self {
            id: ProductId::new(dto.id),
            title: dto.title,
            price: dto.price,
            description: dto.description,
            category: dto.category,
            image_url: dto.image,
            rating: Rating::try_from(dto.rating)?,
        })
    }
}

/// Map a batch of records, preserving order
///
/// # Errors
///
/// Returns [`FetchError::MalformedData`] naming the first offending record
/// if any record is invalid or an id repeats.
pub fn map_products(records: Vec<ProductDto>) -> Result<Vec<Product>, FetchError> {
    let mut seen = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record.id;
            let product = Product::try_from(record)
                .map_err(|reason| FetchError::MalformedData(format!("record {index}: {reason}")))?;
            if !seen.insert(id) {
                return Err(FetchError::MalformedData(format!(
                    "record {index}: duplicate id {id}"
                )));
            }
            Ok(product)
        })
        .collect()
}

/// Decode a response body and map it
///
/// # Errors
///
/// Returns [`FetchError::MalformedData`] if the body is not a JSON array of
/// product records, or if mapping fails.
pub fn decode_products(body: &[u8]) -> Result<Vec<Product>, FetchError> {
    let records: Vec<ProductDto> = serde_json::from_slice(body)
        .map_err(|error| FetchError::MalformedData(error.to_string()))?;
    map_products(records)
}
