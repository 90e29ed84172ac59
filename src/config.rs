#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    // minutes
    pub jwt_maxage: i64,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| Self::parse_origins(&v))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        Config {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_maxage: jwt_maxage
                .parse::<i64>()
                .expect("JWT_MAXAGE must be a number of minutes"),
            port,
            allowed_origins,
        }
    }

    fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| origin.to_string())
            .collect()
    }
}
