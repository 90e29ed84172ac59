use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Exact, case-sensitive match against the stored literals.
    pub fn parse(value: &str) -> Option<JobStatus> {
        JobStatus::ALL.into_iter().find(|s| s.to_str() == value)
    }

    pub fn valid_values() -> String {
        JobStatus::ALL
            .iter()
            .map(|s| s.to_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Which side of a job a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobParty {
    Contractor,
    Vendor,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: i32,
    pub contractor_id: i32,
    pub vendor_id: i32,
    pub service_id: i32,
    pub status: JobStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(with = "crate::utils::decimal::money::option")]
    pub total_amount: Option<BigDecimal>,
    pub client_confirmed: bool,
    pub vendor_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    // A user who is both contractor and vendor of the same job is treated
    // as the contractor, matching how confirmations are recorded.
    pub fn party_of(&self, user_id: i32) -> Option<JobParty> {
        if user_id == self.contractor_id {
            Some(JobParty::Contractor)
        } else if user_id == self.vendor_id {
            Some(JobParty::Vendor)
        } else {
            None
        }
    }

    pub fn fully_confirmed(&self) -> bool {
        self.client_confirmed && self.vendor_confirmed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i32,
    pub job_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i32,
    pub job_id: i32,
    #[serde(with = "crate::utils::decimal::money")]
    pub amount: BigDecimal,
    pub method: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
