use std::sync::Arc;

use crate::auth::memory::MemoryStore;
use crate::auth::repo::{PgSessionStore, PgUserStore};
use crate::auth::services::AuthService;
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let auth = match &config.database {
            Some(db_config) => {
                let pool = db::connect(db_config).await?;
                db::migrate(&pool).await?;
                AuthService::new(
                    Arc::new(PgUserStore::new(pool.clone())),
                    Arc::new(PgSessionStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; accounts and sessions live in memory only");
                in_memory_auth()
            }
        };

        Ok(Self { config, auth })
    }

    pub fn from_parts(config: Arc<AppConfig>, auth: AuthService) -> Self {
        Self { config, auth }
    }

    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(config, in_memory_auth())
    }
}

fn in_memory_auth() -> AuthService {
    let store = Arc::new(MemoryStore::new());
    AuthService::new(store.clone(), store)
}
