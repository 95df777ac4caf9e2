//! Builds the service graph over one storage backend.

use std::sync::Arc;

use actix_web::web::{Data, ServiceConfig};

use crate::catalog::{LeaveTypeCatalog, LeaveTypeStore};
use crate::config::{Config, StorageBackend};
use crate::db::init_db;
use crate::directory::{
    Collaborators, DepartmentDirectory, IdentityProvider, LeaveTypeRegistry, NotificationSink,
    SequenceSource,
};
use crate::ledger::{BalanceLedger, BalanceStore};
use crate::store::{memory::MemoryStore, mysql::MySqlStore};
use crate::workflow::{LeaveWorkflow, RequestStore};

/// Everything a backend has to provide.
pub trait Backend:
    BalanceStore
    + RequestStore
    + LeaveTypeStore
    + IdentityProvider
    + DepartmentDirectory
    + SequenceSource
    + NotificationSink
    + 'static
{
}

impl<T> Backend for T where
    T: BalanceStore
        + RequestStore
        + LeaveTypeStore
        + IdentityProvider
        + DepartmentDirectory
        + SequenceSource
        + NotificationSink
        + 'static
{
}

#[derive(Clone)]
pub struct AppServices {
    pub workflow: LeaveWorkflow,
    pub ledger: BalanceLedger,
    pub catalog: LeaveTypeCatalog,
}

impl AppServices {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Mysql => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set when STORAGE=mysql"))?;
                let pool = init_db(url).await?;
                Ok(Self::wire(Arc::new(MySqlStore::new(pool)), config))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::wire(Arc::new(MemoryStore::default()), config))
            }
        }
    }

    /// Leave type reads everywhere go through the catalog's cache.
    pub fn wire<S: Backend>(store: Arc<S>, config: &Config) -> Self {
        let catalog = LeaveTypeCatalog::new(store.clone(), config.leave_type_cache_ttl);
        let registry: Arc<dyn LeaveTypeRegistry> = Arc::new(catalog.clone());

        let ledger = BalanceLedger::new(store.clone(), registry.clone());
        let deps = Collaborators {
            identity: store.clone(),
            departments: store.clone(),
            leave_types: registry,
            sequence: store.clone(),
            notifier: store.clone(),
        };

        let workflow = LeaveWorkflow::new(store, ledger, deps);
        Self {
            ledger: workflow.ledger().clone(),
            workflow,
            catalog,
        }
    }

    pub fn register(&self, cfg: &mut ServiceConfig) {
        cfg.app_data(Data::new(self.workflow.clone()))
            .app_data(Data::new(self.ledger.clone()))
            .app_data(Data::new(self.catalog.clone()));
    }
}
