use std::sync::Arc;

use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;
pub mod traits;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStorage;
pub use models::{ExternalProfile, Link, LinkSummary, LinkTotals, NewLink, User};
pub use traits::{LinkRepository, UserRepository};

/// Both repository handles backed by one store
#[derive(Clone)]
pub struct Repositories {
    pub links: Arc<dyn LinkRepository>,
    pub users: Arc<dyn UserRepository>,
    pub backend_name: String,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>, backend_name: &str) -> Self
    where
        S: LinkRepository + UserRepository + 'static,
    {
        Self {
            links: store.clone(),
            users: store,
            backend_name: backend_name.to_string(),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStorage::new()), "memory")
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Repositories> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        if backend_type == "memory" {
            info!("MEMORY storage initialized, data is not persisted");
            return Ok(Repositories::in_memory());
        }

        let storage = SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Repositories::from_store(Arc::new(storage), &backend_type))
    }
}
