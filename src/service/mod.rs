pub mod catalog_service;
pub mod error;
pub mod job_service;
pub mod lifecycle;
pub mod rating;
pub mod review_service;
pub mod search_service;
