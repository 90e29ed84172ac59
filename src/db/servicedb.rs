// db/servicedb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::BigDecimal, Error, Postgres, QueryBuilder};

use super::{db::DBClient, ratingdb::REVIEWS_PER_SERVICE_CTE};
use crate::{
    dtos::servicedtos::{ServiceProjectionDto, SkillSummaryDto, VendorDto},
    models::{
        servicemodel::{Service, ServiceSearch, SortBy},
        usermodel::UserRole,
    },
    utils::decimal::BigDecimalHelpers,
};

/// Text search configuration. Fixed for the whole catalogue and matched by
/// the GIN index in the migrations.
pub const TEXT_SEARCH_CONFIG: &str = "spanish";

#[async_trait]
pub trait ServiceExt {
    async fn create_service(
        &self,
        vendor_id: i32,
        skill_id: Option<i32>,
        title: String,
        description: Option<String>,
        price: BigDecimal,
        is_active: bool,
        image_url: Option<String>,
    ) -> Result<Service, Error>;

    async fn get_service(&self, service_id: i32) -> Result<Option<Service>, Error>;

    async fn update_service(
        &self,
        service_id: i32,
        skill_id: Option<i32>,
        title: Option<String>,
        description: Option<String>,
        price: Option<BigDecimal>,
        is_active: Option<bool>,
        image_url: Option<String>,
    ) -> Result<Service, Error>;

    async fn delete_service(&self, service_id: i32) -> Result<(), Error>;

    async fn search_service_projections(
        &self,
        search: &ServiceSearch,
    ) -> Result<Vec<ServiceProjectionDto>, Error>;
}

// Flat row produced by the projection query, folded into the nested DTO.
#[derive(Debug, sqlx::FromRow)]
struct ServiceProjectionRow {
    id: i32,
    vendor_id: i32,
    skill_id: Option<i32>,
    title: String,
    description: Option<String>,
    price: BigDecimal,
    is_active: bool,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    average_rating: f64,
    review_count: i64,
    rank: f64,
    vendor_name: String,
    vendor_email: String,
    vendor_phone: Option<String>,
    vendor_role: UserRole,
    vendor_profile_picture_url: Option<String>,
    vendor_location: Option<String>,
    vendor_bio: Option<String>,
    vendor_created_at: DateTime<Utc>,
    vendor_updated_at: DateTime<Utc>,
    skill_name: Option<String>,
    skill_description: Option<String>,
}

impl From<ServiceProjectionRow> for ServiceProjectionDto {
    fn from(row: ServiceProjectionRow) -> Self {
        // skill_id is NULL once the skill is deleted: uncategorized
        let skill = match (row.skill_id, row.skill_name) {
            (Some(id), Some(name)) => Some(SkillSummaryDto {
                id,
                name,
                description: row.skill_description,
            }),
            _ => None,
        };

        ServiceProjectionDto {
            id: row.id,
            vendor_id: row.vendor_id,
            skill_id: row.skill_id,
            title: row.title,
            description: row.description,
            price: row.price.to_f64_or_zero(),
            is_active: row.is_active,
            image_url: row.image_url,
            created_at: row.created_at,
            average_rating: row.average_rating,
            review_count: row.review_count,
            relevance: row.rank,
            vendor: VendorDto {
                id: row.vendor_id,
                name: row.vendor_name,
                email: row.vendor_email,
                phone: row.vendor_phone,
                role: row.vendor_role,
                profile_picture_url: row.vendor_profile_picture_url,
                location: row.vendor_location,
                bio: row.vendor_bio,
                created_at: row.vendor_created_at,
                updated_at: row.vendor_updated_at,
            },
            skill,
        }
    }
}

fn document_expr() -> String {
    format!(
        "to_tsvector('{}', COALESCE(s.title, '') || ' ' || COALESCE(s.description, ''))",
        TEXT_SEARCH_CONFIG
    )
}

/// Compose the projection query for `search`. Every user value goes through
/// `push_bind`; only fixed fragments are pushed as SQL text.
pub fn projection_query(search: &ServiceSearch) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(REVIEWS_PER_SERVICE_CTE);

    builder.push(
        r#"
        SELECT
            s.id, s.vendor_id, s.skill_id, s.title, s.description, s.price,
            s.is_active, s.image_url, s.created_at,
            COALESCE(rps.avg_rating, 0)::float8 AS average_rating,
            COALESCE(rps.review_count, 0)::int8 AS review_count,
            u.name AS vendor_name,
            u.email AS vendor_email,
            u.phone AS vendor_phone,
            u.role AS vendor_role,
            u.profile_picture_url AS vendor_profile_picture_url,
            u.location AS vendor_location,
            u.bio AS vendor_bio,
            u.created_at AS vendor_created_at,
            u.updated_at AS vendor_updated_at,
            sk.name AS skill_name,
            sk.description AS skill_description,
        "#,
    );

    if search.has_text() {
        builder.push(format!(
            "ts_rank_cd({}, plainto_tsquery('{}', ",
            document_expr(),
            TEXT_SEARCH_CONFIG
        ));
        builder.push_bind(search.text.trim().to_string());
        builder.push("))::float8 AS rank");
    } else {
        builder.push("0::float8 AS rank");
    }

    builder.push(
        r#"
        FROM services s
        JOIN users u ON u.id = s.vendor_id
        LEFT JOIN reviews_per_service rps ON rps.service_id = s.id
        LEFT JOIN skills sk ON sk.id = s.skill_id
        WHERE TRUE"#,
    );

    if let Some(service_id) = search.service_id {
        builder.push(" AND s.id = ").push_bind(service_id);
    }
    if let Some(vendor_id) = search.vendor_id {
        builder.push(" AND s.vendor_id = ").push_bind(vendor_id);
    }
    if !search.skill_ids.is_empty() {
        builder
            .push(" AND s.skill_id = ANY(")
            .push_bind(search.skill_ids.clone())
            .push(")");
    }
    if let Some(min_price) = &search.min_price {
        builder.push(" AND s.price >= ").push_bind(min_price.clone());
    }
    if let Some(max_price) = &search.max_price {
        builder.push(" AND s.price <= ").push_bind(max_price.clone());
    }
    if let Some(min_rating) = search.min_rating {
        builder
            .push(" AND COALESCE(rps.avg_rating, 0) >= ")
            .push_bind(min_rating);
    }
    if search.active_only {
        builder.push(" AND s.is_active");
    }

    builder.push(" ORDER BY ");
    builder.push(match search.sort_by {
        SortBy::PriceAsc => "s.price ASC, s.id ASC",
        SortBy::PriceDesc => "s.price DESC, s.id ASC",
        SortBy::RatingDesc => "average_rating DESC, s.id ASC",
        // With no text every rank is 0, which leaves id order.
        SortBy::Relevance => "rank DESC, s.id ASC",
    });

    builder
}

#[async_trait]
impl ServiceExt for DBClient {
    async fn create_service(
        &self,
        vendor_id: i32,
        skill_id: Option<i32>,
        title: String,
        description: Option<String>,
        price: BigDecimal,
        is_active: bool,
        image_url: Option<String>,
    ) -> Result<Service, Error> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services
            (vendor_id, skill_id, title, description, price, is_active, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, vendor_id, skill_id, title, description, price,
                      is_active, image_url, created_at
            "#,
        )
        .bind(vendor_id)
        .bind(skill_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(is_active)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_service(&self, service_id: i32) -> Result<Option<Service>, Error> {
        sqlx::query_as::<_, Service>(
            r#"
            SELECT id, vendor_id, skill_id, title, description, price,
                   is_active, image_url, created_at
            FROM services
            WHERE id = $1
            "#,
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_service(
        &self,
        service_id: i32,
        skill_id: Option<i32>,
        title: Option<String>,
        description: Option<String>,
        price: Option<BigDecimal>,
        is_active: Option<bool>,
        image_url: Option<String>,
    ) -> Result<Service, Error> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET skill_id = COALESCE($2, skill_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                is_active = COALESCE($6, is_active),
                image_url = COALESCE($7, image_url)
            WHERE id = $1
            RETURNING id, vendor_id, skill_id, title, description, price,
                      is_active, image_url, created_at
            "#,
        )
        .bind(service_id)
        .bind(skill_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(is_active)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_service(&self, service_id: i32) -> Result<(), Error> {
        // jobs (and through them reviews and payments) cascade
        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(service_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search_service_projections(
        &self,
        search: &ServiceSearch,
    ) -> Result<Vec<ServiceProjectionDto>, Error> {
        let mut builder = projection_query(search);
        let rows = builder
            .build_query_as::<ServiceProjectionRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ServiceProjectionDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sql_for(search: &ServiceSearch) -> String {
        projection_query(search).sql().to_string()
    }

    #[test]
    fn empty_search_has_no_filters_and_zero_rank() {
        let sql = sql_for(&ServiceSearch::default());
        assert!(sql.contains("WITH reviews_per_service AS"));
        assert!(sql.contains("0::float8 AS rank"));
        assert!(!sql.contains("plainto_tsquery"));
        assert!(!sql.contains("$1"));
        assert!(sql.trim_end().ends_with("ORDER BY rank DESC, s.id ASC"));
    }

    #[test]
    fn text_is_bound_not_inlined() {
        let search = ServiceSearch {
            text: "plomero'; DROP TABLE services; --".to_string(),
            ..Default::default()
        };
        let sql = sql_for(&search);
        assert!(sql.contains("ts_rank_cd(to_tsvector('spanish'"));
        assert!(sql.contains("plainto_tsquery('spanish', $1))::float8 AS rank"));
        assert!(!sql.contains("DROP TABLE"));
    }

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        let search = ServiceSearch {
            text: "   ".to_string(),
            ..Default::default()
        };
        assert!(sql_for(&search).contains("0::float8 AS rank"));
    }

    #[test]
    fn filters_are_conjunctive_and_numbered_in_order() {
        let search = ServiceSearch {
            skill_ids: vec![2, 5],
            min_price: Some(BigDecimal::from_str("10").unwrap()),
            max_price: Some(BigDecimal::from_str("50").unwrap()),
            min_rating: Some(4.0),
            ..Default::default()
        };
        let sql = sql_for(&search);
        assert!(sql.contains(
            "WHERE TRUE AND s.skill_id = ANY($1) AND s.price >= $2 AND s.price <= $3 \
             AND COALESCE(rps.avg_rating, 0) >= $4"
        ));
    }

    #[test]
    fn vendor_and_single_service_restrictions() {
        let sql = sql_for(&ServiceSearch::for_vendor(9));
        assert!(sql.contains("AND s.vendor_id = $1"));
        assert!(!sql.contains("s.id = $"));

        let sql = sql_for(&ServiceSearch::single(3));
        assert!(sql.contains("AND s.id = $1"));
    }

    #[test]
    fn active_only_adds_flag_predicate() {
        let search = ServiceSearch {
            active_only: true,
            ..Default::default()
        };
        assert!(sql_for(&search).contains("AND s.is_active"));
    }

    #[test]
    fn sort_modes_pick_order_clause_with_id_tiebreak() {
        let cases = [
            (SortBy::PriceAsc, "ORDER BY s.price ASC, s.id ASC"),
            (SortBy::PriceDesc, "ORDER BY s.price DESC, s.id ASC"),
            (SortBy::RatingDesc, "ORDER BY average_rating DESC, s.id ASC"),
            (SortBy::Relevance, "ORDER BY rank DESC, s.id ASC"),
        ];
        for (sort_by, expected) in cases {
            let search = ServiceSearch {
                sort_by,
                ..Default::default()
            };
            assert!(sql_for(&search).ends_with(expected), "{:?}", sort_by);
        }
    }

    #[test]
    fn rating_aggregate_treats_missing_as_zero() {
        let sql = sql_for(&ServiceSearch::default());
        assert!(sql.contains("COALESCE(rps.avg_rating, 0)::float8 AS average_rating"));
        assert!(sql.contains("LEFT JOIN reviews_per_service rps"));
        assert!(sql.contains("LEFT JOIN skills sk"));
    }

    fn row(skill_id: Option<i32>, skill_name: Option<&str>) -> ServiceProjectionRow {
        let now = Utc::now();
        ServiceProjectionRow {
            id: 1,
            vendor_id: 2,
            skill_id,
            title: "Pintura de interiores".to_string(),
            description: None,
            price: BigDecimal::from_str("100.00").unwrap(),
            is_active: true,
            image_url: None,
            created_at: now,
            average_rating: 4.5,
            review_count: 2,
            rank: 0.0,
            vendor_name: "Ana".to_string(),
            vendor_email: "ana@example.com".to_string(),
            vendor_phone: None,
            vendor_role: UserRole::Vendor,
            vendor_profile_picture_url: None,
            vendor_location: None,
            vendor_bio: None,
            vendor_created_at: now,
            vendor_updated_at: now,
            skill_name: skill_name.map(str::to_string),
            skill_description: None,
        }
    }

    #[test]
    fn projection_embeds_vendor_and_skill() {
        let dto = ServiceProjectionDto::from(row(Some(5), Some("Pintura")));
        assert_eq!(dto.price, 100.0);
        assert_eq!(dto.vendor.id, 2);
        assert_eq!(dto.vendor.role, UserRole::Vendor);
        let skill = dto.skill.unwrap();
        assert_eq!((skill.id, skill.name.as_str()), (5, "Pintura"));
    }

    #[test]
    fn projection_without_skill_is_uncategorized() {
        let dto = ServiceProjectionDto::from(row(None, None));
        assert!(dto.skill.is_none());
        assert_eq!(dto.average_rating, 4.5);
    }

    mod on_postgres {
        use super::*;
        use crate::db::test_db::{seed_marketplace, TestDb};

        fn ids(found: &[ServiceProjectionDto]) -> Vec<i32> {
            found.iter().map(|s| s.id).collect()
        }

        #[tokio::test]
        #[ignore = "requires postgres instance"]
        async fn min_rating_never_returns_a_lower_rated_service() {
            let db = TestDb::fresh().await;
            let market = seed_marketplace(&db.client).await.unwrap();

            let found = db
                .client
                .search_service_projections(&ServiceSearch {
                    min_rating: Some(4.0),
                    ..Default::default()
                })
                .await
                .unwrap();

            assert_eq!(ids(&found), vec![market.services[1]]);
            assert!(found.iter().all(|s| s.average_rating >= 4.0));
            assert_eq!((found[0].average_rating, found[0].review_count), (4.0, 1));

            db.teardown().await;
        }

        #[tokio::test]
        #[ignore = "requires postgres instance"]
        async fn price_asc_is_non_decreasing() {
            let db = TestDb::fresh().await;
            let market = seed_marketplace(&db.client).await.unwrap();

            let found = db
                .client
                .search_service_projections(&ServiceSearch {
                    sort_by: SortBy::PriceAsc,
                    ..Default::default()
                })
                .await
                .unwrap();

            let prices: Vec<f64> = found.iter().map(|s| s.price).collect();
            assert_eq!(prices, vec![10.0, 30.0, 40.0, 50.0, 100.0]);
            assert!(prices.windows(2).all(|pair| pair[0] <= pair[1]));
            let s = &market.services;
            assert_eq!(ids(&found), vec![s[1], s[0], s[2], s[3], s[4]]);

            db.teardown().await;
        }

        #[tokio::test]
        #[ignore = "requires postgres instance"]
        async fn skill_and_price_filters_apply_together() {
            let db = TestDb::fresh().await;
            let market = seed_marketplace(&db.client).await.unwrap();
            let wanted = vec![market.skills[1], market.skills[4]];

            let found = db
                .client
                .search_service_projections(&ServiceSearch {
                    skill_ids: wanted.clone(),
                    min_price: Some(BigDecimal::from(10)),
                    max_price: Some(BigDecimal::from(50)),
                    ..Default::default()
                })
                .await
                .unwrap();

            // empty text ranks everything 0, so relevance falls back to id order
            assert_eq!(ids(&found), vec![market.services[0], market.services[1]]);
            for service in &found {
                assert!(wanted.contains(&service.skill_id.unwrap()));
                assert!((10.0..=50.0).contains(&service.price));
                assert_eq!(service.vendor.id, market.vendor);
            }

            db.teardown().await;
        }

        #[tokio::test]
        #[ignore = "requires postgres instance"]
        async fn projection_rating_matches_direct_aggregate() {
            use crate::db::ratingdb::RatingExt;

            let db = TestDb::fresh().await;
            let market = seed_marketplace(&db.client).await.unwrap();

            for service_id in market.services {
                let projected = db
                    .client
                    .search_service_projections(&ServiceSearch::single(service_id))
                    .await
                    .unwrap();
                let direct = db.client.get_service_rating(service_id).await.unwrap();
                assert_eq!(
                    (projected[0].average_rating, projected[0].review_count),
                    direct
                );
            }

            db.teardown().await;
        }
    }
}
