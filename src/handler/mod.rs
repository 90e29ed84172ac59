pub mod jobs;
pub mod payments;
pub mod reviews;
pub mod services;
pub mod skills;
pub mod users;
