use std::sync::Arc;

use coursebook_cache::{CacheConfig, CacheStore};
use coursebook_config::{CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, StorageConfig};
use coursebook_core::LocalFileStorage;
use coursebook_db::init_db_pool;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub cache: CacheStore,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub storage_config: StorageConfig,
    pub storage: Arc<LocalFileStorage>,
}

impl AppState {
    pub fn storage_from_config(config: &StorageConfig) -> Arc<LocalFileStorage> {
        Arc::new(LocalFileStorage::new(
            config.upload_dir.clone(),
            config.public_base_url.clone(),
            config.max_avatar_bytes,
        ))
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = init_db_pool().await?;
    let cache = CacheStore::connect(&CacheConfig::from_env()).await;
    let storage_config = StorageConfig::from_env();

    Ok(AppState {
        db,
        cache,
        jwt_config: JwtConfig::from_env(),
        email_config: EmailConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        storage: AppState::storage_from_config(&storage_config),
        storage_config,
    })
}
