// db/test_db.rs
// Tests that need real rows run against `TEST_DATABASE_URL` (or
// `DATABASE_URL`). Each one gets a private schema with the migration applied,
// so tests can run in parallel and never see each other's data.
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use sqlx::{postgres::PgPoolOptions, types::BigDecimal, Executor};

use super::{
    db::DBClient, jobdb::JobExt, reviewdb::insert_review_once, servicedb::ServiceExt,
    skilldb::SkillExt, userdb::UserExt,
};
use crate::models::usermodel::UserRole;

const INIT_SQL: &str = include_str!("../../migrations/20250101000000_init.sql");

static NEXT_SCHEMA: AtomicU32 = AtomicU32::new(0);

pub struct TestDb {
    pub client: DBClient,
    schema: String,
}

impl TestDb {
    pub async fn fresh() -> TestDb {
        dotenv::dotenv().ok();
        let url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("TEST_DATABASE_URL or DATABASE_URL must be set");

        let schema = format!(
            "skillmarket_test_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
        );

        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .expect("test database is reachable");

        pool.execute(format!("CREATE SCHEMA {}", schema).as_str())
            .await
            .expect("create test schema");
        sqlx::raw_sql(INIT_SQL)
            .execute(&pool)
            .await
            .expect("apply migration");

        TestDb {
            client: DBClient::new(pool),
            schema,
        }
    }

    pub async fn teardown(self) {
        let sql = format!("DROP SCHEMA {} CASCADE", self.schema);
        let _ = self.client.pool.execute(sql.as_str()).await;
        self.client.pool.close().await;
    }
}

/// Ids of the rows written by `seed_marketplace`.
pub struct Marketplace {
    pub vendor: i32,
    pub contractor: i32,
    pub skills: Vec<i32>,
    pub services: Vec<i32>,
    /// A job of service 0 without a review.
    pub unreviewed_job: i32,
}

/// Five services:
///
/// | # | skill | price  | reviews |
/// |---|-------|--------|---------|
/// | 0 | 1     | 30.00  | 5, 2 and one job without review |
/// | 1 | 4     | 10.00  | 4 |
/// | 2 | 0     | 40.00  | none |
/// | 3 | 2     | 50.00  | none |
/// | 4 | 4     | 100.00 | 3 |
///
/// Skills are indexes into `Marketplace::skills`.
pub async fn seed_marketplace(db: &DBClient) -> Result<Marketplace, sqlx::Error> {
    let vendor = db
        .save_user("Lucía Pérez", "lucia@example.com", "hash", None, UserRole::Vendor)
        .await?;
    let contractor = db
        .save_user("Mario Gómez", "mario@example.com", "hash", None, UserRole::Contractor)
        .await?;

    let mut skills = Vec::new();
    for name in ["Pintura", "Plomería", "Carpintería", "Jardinería", "Electricidad"] {
        skills.push(db.save_skill(name.to_string(), None).await?.id);
    }

    let catalogue = [
        ("Reparación de cañerías", 1, "30.00"),
        ("Instalación de enchufes", 4, "10.00"),
        ("Pintura de interiores", 0, "40.00"),
        ("Muebles a medida", 2, "50.00"),
        ("Tablero eléctrico completo", 4, "100.00"),
    ];
    let mut services = Vec::new();
    for (title, skill, price) in catalogue {
        let price = BigDecimal::from_str(price).expect("literal price");
        let service = db
            .create_service(vendor.id, Some(skills[skill]), title.to_string(), None, price, true, None)
            .await?;
        services.push(service.id);
    }

    let reviewed = [(0, 5), (0, 2), (1, 4), (4, 3)];
    for (service, rating) in reviewed {
        let job = book(db, contractor.id, vendor.id, services[service]).await?;
        let mut conn = db.pool.acquire().await?;
        insert_review_once(&mut *conn, job, rating, None).await?;
    }
    let unreviewed_job = book(db, contractor.id, vendor.id, services[0]).await?;

    Ok(Marketplace {
        vendor: vendor.id,
        contractor: contractor.id,
        skills,
        services,
        unreviewed_job,
    })
}

async fn book(db: &DBClient, contractor: i32, vendor: i32, service: i32) -> Result<i32, sqlx::Error> {
    let job = db
        .create_job(contractor, vendor, service, None, None, BigDecimal::from(0))
        .await?;
    Ok(job.id)
}
