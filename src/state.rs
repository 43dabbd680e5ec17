use crate::config::AppConfig;
use crate::db;
use crate::storage::{LocalStorage, StorageClient};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_path).await?;
        let storage = Arc::new(LocalStorage::new(&config.static_dir)) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(db, config, storage))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        Self {
            db,
            config,
            storage,
        }
    }

    /// A fully migrated state whose database and static files live under `dir`.
    #[cfg(test)]
    pub async fn for_tests(dir: &std::path::Path) -> anyhow::Result<Self> {
        use crate::config::SessionConfig;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: dir.join("instance").join("app.db"),
            static_dir: dir.join("static"),
            max_upload_bytes: 1024 * 1024,
            session: SessionConfig {
                secret: "test-secret".into(),
                ttl_minutes: 5,
                secure_cookie: false,
            },
        });

        let db = db::connect(&config.database_path).await?;
        db::migrate(&db).await?;
        let storage = Arc::new(LocalStorage::new(&config.static_dir)) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(db, config, storage))
    }
}
