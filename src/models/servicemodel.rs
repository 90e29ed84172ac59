use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;

// A service row as stored. Rating and relevance are never persisted here,
// they are computed by the read-side projection in db/servicedb.rs.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Service {
    pub id: i32,
    pub vendor_id: i32,
    pub skill_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "crate::utils::decimal::money")]
    pub price: BigDecimal,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    PriceAsc,
    PriceDesc,
    RatingDesc,
    #[default]
    Relevance,
}

impl SortBy {
    pub fn to_str(&self) -> &str {
        match self {
            SortBy::PriceAsc => "price_asc",
            SortBy::PriceDesc => "price_desc",
            SortBy::RatingDesc => "rating_desc",
            SortBy::Relevance => "relevance",
        }
    }

    /// Unknown or missing values sort by relevance.
    pub fn parse_lenient(value: Option<&str>) -> SortBy {
        match value.map(str::trim) {
            Some("price_asc") => SortBy::PriceAsc,
            Some("price_desc") => SortBy::PriceDesc,
            Some("rating_desc") => SortBy::RatingDesc,
            _ => SortBy::Relevance,
        }
    }
}

/// Validated, typed description of a service listing query. All set filters
/// apply conjunctively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSearch {
    pub text: String,
    pub skill_ids: Vec<i32>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub min_rating: Option<f64>,
    pub vendor_id: Option<i32>,
    pub service_id: Option<i32>,
    pub active_only: bool,
    pub sort_by: SortBy,
}

impl ServiceSearch {
    pub fn single(service_id: i32) -> Self {
        ServiceSearch {
            service_id: Some(service_id),
            ..Default::default()
        }
    }

    pub fn for_vendor(vendor_id: i32) -> Self {
        ServiceSearch {
            vendor_id: Some(vendor_id),
            ..Default::default()
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
