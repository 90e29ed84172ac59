use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    jobmodel::Review,
    usermodel::{Skill, UserRole},
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateServiceDto {
    pub skill_id: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, max = 99999999.99, message = "Price must be between 0 and 99999999.99"))]
    pub price: f64,

    pub is_active: Option<bool>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateServiceDto {
    pub skill_id: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, max = 99999999.99, message = "Price must be between 0 and 99999999.99"))]
    pub price: Option<f64>,

    pub is_active: Option<bool>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

/// Raw query string of `GET /services/search`. Numbers stay as text here so
/// that malformed values are reported as invalid arguments instead of being
/// rejected by the extractor. `skill_ids` accepts repeated keys
/// (`?skill_ids=2&skill_ids=5`) as well as comma separated lists.
#[derive(Debug, Deserialize, Default)]
pub struct SearchServicesQueryDto {
    pub query: Option<String>,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
    pub sort_by: Option<String>,
    pub active_only: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VendorDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub profile_picture_url: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SkillSummaryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<Skill> for SkillSummaryDto {
    fn from(skill: Skill) -> Self {
        SkillSummaryDto {
            id: skill.id,
            name: skill.name,
            description: skill.description,
        }
    }
}

/// A service as returned by every read endpoint: the stored fields plus the
/// embedded vendor and skill and the computed rating and relevance.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceProjectionDto {
    pub id: i32,
    pub vendor_id: i32,
    pub skill_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub average_rating: f64,
    pub review_count: i64,
    pub relevance: f64,
    pub vendor: VendorDto,
    pub skill: Option<SkillSummaryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceReviewsDto {
    pub service_id: i32,
    pub average_rating: f64,
    pub review_count: usize,
    pub reviews: Vec<Review>,
}
