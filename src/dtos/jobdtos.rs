use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_job_dates", skip_on_field_errors = false))]
pub struct CreateJobDto {
    pub contractor_id: i32,
    pub vendor_id: i32,
    pub service_id: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 99999999.99, message = "Total amount must be between 0 and 99999999.99"))]
    pub total_amount: Option<f64>,
}

fn validate_job_dates(dto: &CreateJobDto) -> Result<(), ValidationError> {
    match (dto.start_date, dto.end_date) {
        (Some(start), Some(end)) if end < start => {
            let mut error = ValidationError::new("invalid_dates");
            error.message = Some("end_date must not be before start_date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SetJobStatusDto {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateReviewDto {
    pub job_id: i32,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePaymentDto {
    pub job_id: i32,

    #[validate(range(min = 0.01, max = 99999999.99, message = "Amount must be greater than 0"))]
    pub amount: f64,

    #[validate(length(min = 1, max = 50, message = "Method must be between 1 and 50 characters"))]
    pub method: Option<String>,
}

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(start: Option<&str>, end: Option<&str>) -> CreateJobDto {
        CreateJobDto {
            contractor_id: 1,
            vendor_id: 2,
            service_id: 3,
            start_date: start.map(|d| d.parse().unwrap()),
            end_date: end.map(|d| d.parse().unwrap()),
            total_amount: None,
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(job(Some("2025-03-10"), Some("2025-03-01")).validate().is_err());
        assert!(job(Some("2025-03-01"), Some("2025-03-01")).validate().is_ok());
        assert!(job(None, Some("2025-03-01")).validate().is_ok());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut dto = job(None, None);
        dto.total_amount = Some(-1.0);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        for rating in [0, 6] {
            let dto = CreateReviewDto {
                job_id: 1,
                rating,
                comment: None,
            };
            assert!(dto.validate().is_err());
        }
    }

    #[test]
    fn payment_amount_must_be_positive() {
        let dto = CreatePaymentDto {
            job_id: 1,
            amount: 0.0,
            method: Some("card".to_string()),
        };
        assert!(dto.validate().is_err());
    }
}
