#[cfg(feature = "postgres")]
use std::sync::Arc;
#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use blog_core::admin::PostAdminService;
#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

#[cfg(feature = "postgres")]
use super::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

/// Configuration for the blog database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Connection pool for the blog database.
///
/// # Example
/// ```ignore
/// let db = DatabaseConnections::init(&config).await?;
/// let admin = db.post_admin();
/// let page = admin.change_list(&ChangeListQuery::new()).await?;
/// ```
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: Arc<DbConn>,
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open the pool described by `config`.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!("Database connected (pool: {})", config.max_connections);

        Ok(Self {
            main: Arc::new(main),
        })
    }

    pub fn post_repository(&self) -> PostgresPostRepository {
        PostgresPostRepository::new(Arc::clone(&self.main))
    }

    pub fn user_repository(&self) -> PostgresUserRepository {
        PostgresUserRepository::new(Arc::clone(&self.main))
    }

    /// Admin operations backed by this pool.
    pub fn post_admin(&self) -> PostAdminService {
        PostAdminService::new(
            Arc::new(self.post_repository()),
            Arc::new(self.user_repository()),
        )
    }
}
