// service/search_service.rs
use std::{str::FromStr, sync::Arc};

use sqlx::types::BigDecimal;

use crate::{
    db::{db::DBClient, query_timeout::QueryTimeout, servicedb::ServiceExt, userdb::UserExt},
    dtos::servicedtos::{SearchServicesQueryDto, ServiceProjectionDto},
    models::servicemodel::{ServiceSearch, SortBy},
    service::error::ServiceError,
};

const MAX_RATING: f64 = 5.0;

/// Turns the raw query string into a validated `ServiceSearch`. Blank values
/// count as absent.
pub fn parse_search(raw: SearchServicesQueryDto) -> Result<ServiceSearch, ServiceError> {
    let min_price = parse_price("min_price", raw.min_price.as_deref())?;
    let max_price = parse_price("max_price", raw.max_price.as_deref())?;

    if let (Some(min), Some(max)) = (&min_price, &max_price) {
        if min > max {
            return Err(ServiceError::invalid_argument(format!(
                "min_price ({}) must not exceed max_price ({})",
                min, max
            )));
        }
    }

    Ok(ServiceSearch {
        text: raw.query.unwrap_or_default(),
        skill_ids: parse_skill_ids(&raw.skill_ids)?,
        min_price,
        max_price,
        min_rating: parse_rating(raw.min_rating.as_deref())?,
        vendor_id: None,
        service_id: None,
        active_only: parse_flag("active_only", raw.active_only.as_deref())?,
        sort_by: SortBy::parse_lenient(raw.sort_by.as_deref()),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(name: &str, value: Option<&str>) -> Result<Option<BigDecimal>, ServiceError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };

    let price = BigDecimal::from_str(value).map_err(|_| {
        ServiceError::invalid_argument(format!("{} must be a number, got '{}'", name, value))
    })?;

    if price < BigDecimal::from(0) {
        return Err(ServiceError::invalid_argument(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }

    Ok(Some(price))
}

fn parse_rating(value: Option<&str>) -> Result<Option<f64>, ServiceError> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };

    match value.parse::<f64>() {
        Ok(rating) if rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) => Ok(Some(rating)),
        _ => Err(ServiceError::invalid_argument(format!(
            "min_rating must be a number between 0 and {}, got '{}'",
            MAX_RATING, value
        ))),
    }
}

fn parse_skill_ids(values: &[String]) -> Result<Vec<i32>, ServiceError> {
    let mut ids = Vec::new();

    for part in values.iter().flat_map(|v| v.split(',')) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<i32>() {
            Ok(id) if id > 0 => ids.push(id),
            _ => {
                return Err(ServiceError::invalid_argument(format!(
                    "skill_ids must be positive integers, got '{}'",
                    part
                )))
            }
        }
    }

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

fn parse_flag(name: &str, value: Option<&str>) -> Result<bool, ServiceError> {
    match non_blank(value) {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ServiceError::invalid_argument(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}

/// Read side of the catalogue. Every listing goes through the same
/// projection query so ratings agree across endpoints.
#[derive(Debug, Clone)]
pub struct SearchService {
    db_client: Arc<DBClient>,
}

impl SearchService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn search(
        &self,
        search: &ServiceSearch,
    ) -> Result<Vec<ServiceProjectionDto>, ServiceError> {
        let results = QueryTimeout::run(
            self.db_client.search_service_projections(search),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await?;

        tracing::debug!(
            "service search text={:?} sort={} skills={:?} -> {} results",
            search.text,
            search.sort_by.to_str(),
            search.skill_ids,
            results.len()
        );

        Ok(results)
    }

    pub async fn list_services(&self) -> Result<Vec<ServiceProjectionDto>, ServiceError> {
        self.search(&ServiceSearch::default()).await
    }

    pub async fn get_service(&self, service_id: i32) -> Result<ServiceProjectionDto, ServiceError> {
        self.search(&ServiceSearch::single(service_id))
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::ServiceNotFound(service_id))
    }

    pub async fn vendor_services(
        &self,
        vendor_id: i32,
    ) -> Result<Vec<ServiceProjectionDto>, ServiceError> {
        self.db_client
            .get_user(Some(vendor_id), None)
            .await?
            .ok_or(ServiceError::UserNotFound(vendor_id))?;

        self.search(&ServiceSearch::for_vendor(vendor_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::error::ErrorKind;

    fn raw() -> SearchServicesQueryDto {
        SearchServicesQueryDto::default()
    }

    #[test]
    fn empty_query_string_is_an_unfiltered_relevance_search() {
        let search = parse_search(raw()).unwrap();
        assert_eq!(search, ServiceSearch::default());
        assert_eq!(search.sort_by, SortBy::Relevance);
    }

    #[test]
    fn skill_and_price_filters_are_parsed() {
        let search = parse_search(SearchServicesQueryDto {
            query: Some("".to_string()),
            skill_ids: vec!["5".to_string(), "2".to_string()],
            min_price: Some("10".to_string()),
            max_price: Some("50".to_string()),
            ..raw()
        })
        .unwrap();

        assert_eq!(search.skill_ids, vec![2, 5]);
        assert_eq!(search.min_price, Some(BigDecimal::from(10)));
        assert_eq!(search.max_price, Some(BigDecimal::from(50)));
        assert!(!search.has_text());
    }

    #[test]
    fn comma_separated_skill_ids_are_accepted() {
        let search = parse_search(SearchServicesQueryDto {
            skill_ids: vec!["2, 5".to_string(), "5".to_string()],
            ..raw()
        })
        .unwrap();
        assert_eq!(search.skill_ids, vec![2, 5]);
    }

    #[test]
    fn bad_numeric_filters_are_invalid_arguments() {
        let cases = [
            SearchServicesQueryDto {
                min_price: Some("-1".to_string()),
                ..raw()
            },
            SearchServicesQueryDto {
                max_price: Some("cheap".to_string()),
                ..raw()
            },
            SearchServicesQueryDto {
                min_rating: Some("6".to_string()),
                ..raw()
            },
            SearchServicesQueryDto {
                min_rating: Some("NaN".to_string()),
                ..raw()
            },
            SearchServicesQueryDto {
                skill_ids: vec!["0".to_string()],
                ..raw()
            },
            SearchServicesQueryDto {
                skill_ids: vec!["two".to_string()],
                ..raw()
            },
            SearchServicesQueryDto {
                active_only: Some("maybe".to_string()),
                ..raw()
            },
        ];

        for case in cases {
            let err = parse_search(case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn min_price_above_max_price_is_rejected() {
        let err = parse_search(SearchServicesQueryDto {
            min_price: Some("60".to_string()),
            max_price: Some("50".to_string()),
            ..raw()
        })
        .unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let search = parse_search(SearchServicesQueryDto {
            min_price: Some(" ".to_string()),
            min_rating: Some("".to_string()),
            skill_ids: vec!["".to_string()],
            ..raw()
        })
        .unwrap();
        assert_eq!(search, ServiceSearch::default());
    }

    #[test]
    fn unknown_sort_falls_back_to_relevance() {
        let search = parse_search(SearchServicesQueryDto {
            sort_by: Some("cheapest".to_string()),
            ..raw()
        })
        .unwrap();
        assert_eq!(search.sort_by, SortBy::Relevance);

        let search = parse_search(SearchServicesQueryDto {
            sort_by: Some("price_asc".to_string()),
            min_rating: Some("4".to_string()),
            active_only: Some("true".to_string()),
            ..raw()
        })
        .unwrap();
        assert_eq!(search.sort_by, SortBy::PriceAsc);
        assert_eq!(search.min_rating, Some(4.0));
        assert!(search.active_only);
    }
}
