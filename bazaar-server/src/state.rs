//! Application state for bazaar-server

use sqlx::PgPool;

use crate::config::Config;
use crate::services::verification::VerificationSessions;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for vendor authentication
    pub jwt_secret: String,
    /// Directory where the upload handler stores transient import files
    pub upload_dir: String,
    /// Pending verification codes (identifier -> code/expiry)
    pub verification: VerificationSessions,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            upload_dir: config.upload_dir.clone(),
            verification: VerificationSessions::new(),
        })
    }
}
