//! Leave type administration, and the cached registry the workflow reads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, info, instrument};

use crate::directory::LeaveTypeRegistry;
use crate::error::{LeaveError, LeaveResult};
use crate::ledger::rules;
use crate::model::leave_type::{LeaveType, LeaveTypePatch, NewLeaveType};

#[async_trait]
pub trait LeaveTypeStore: Send + Sync {
    /// `AlreadyExists` when the code is taken.
    async fn insert(&self, new: NewLeaveType) -> LeaveResult<LeaveType>;

    async fn get(&self, id: u64) -> LeaveResult<Option<LeaveType>>;

    /// Ordered by name.
    async fn list(&self, is_active: Option<bool>) -> LeaveResult<Vec<LeaveType>>;

    /// Writes every mutable column of `leave_type`. Returns whether the row exists.
    async fn save(&self, leave_type: &LeaveType) -> LeaveResult<bool>;
}

#[derive(Clone)]
pub struct LeaveTypeCatalog {
    store: Arc<dyn LeaveTypeStore>,
    cache: Cache<u64, LeaveType>,
}

impl LeaveTypeCatalog {
    pub fn new(store: Arc<dyn LeaveTypeStore>, ttl: Duration) -> Self {
        Self {
            store,
            cache: Cache::builder().max_capacity(1_000).time_to_live(ttl).build(),
        }
    }

    #[instrument(skip(self, new), fields(code = %new.code))]
    pub async fn create(&self, mut new: NewLeaveType) -> LeaveResult<LeaveType> {
        new.code = new.code.trim().to_uppercase();
        new.name = new.name.trim().to_string();
        if new.code.is_empty() || new.name.is_empty() {
            return Err(LeaveError::Validation("Leave type code and name are required".into()));
        }
        rules::validate_days(new.annual_entitlement, "Annual entitlement")?;
        rules::validate_days(new.max_carryover_days, "Max carry-over")?;

        let code = new.code.clone();
        let leave_type = self.store.insert(new).await.map_err(|e| match e {
            LeaveError::AlreadyExists(_) => {
                LeaveError::AlreadyExists(format!("Leave type code {code} already exists"))
            }
            other => other,
        })?;

        info!(leave_type_id = leave_type.id, "Leave type created");
        Ok(leave_type)
    }

    pub async fn get(&self, id: u64) -> LeaveResult<LeaveType> {
        self.leave_type(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("Leave type #{id} not found")))
    }

    pub async fn list(&self, is_active: Option<bool>) -> LeaveResult<Vec<LeaveType>> {
        self.store.list(is_active).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: u64, patch: LeaveTypePatch) -> LeaveResult<LeaveType> {
        if let Some(days) = patch.annual_entitlement {
            rules::validate_days(days, "Annual entitlement")?;
        }
        if let Some(days) = patch.max_carryover_days {
            rules::validate_days(days, "Max carry-over")?;
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(LeaveError::Validation("Leave type name cannot be empty".into()));
        }

        let mut leave_type = self.fresh(id).await?;
        patch.apply(&mut leave_type);
        self.write(leave_type).await
    }

    #[instrument(skip(self))]
    pub async fn toggle_active(&self, id: u64) -> LeaveResult<LeaveType> {
        let mut leave_type = self.fresh(id).await?;
        leave_type.is_active = !leave_type.is_active;
        self.write(leave_type).await
    }

    /// Soft delete; existing balances and requests keep pointing at the row.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: u64) -> LeaveResult<LeaveType> {
        let mut leave_type = self.fresh(id).await?;
        leave_type.is_active = false;
        self.write(leave_type).await
    }

    /// Bypasses the cache so edits start from the stored row.
    async fn fresh(&self, id: u64) -> LeaveResult<LeaveType> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound(format!("Leave type #{id} not found")))
    }

    async fn write(&self, leave_type: LeaveType) -> LeaveResult<LeaveType> {
        let id = leave_type.id;
        self.cache.invalidate(&id).await;

        if !self.store.save(&leave_type).await? {
            return Err(LeaveError::NotFound(format!("Leave type #{id} not found")));
        }

        let saved = self.fresh(id).await?;
        info!(leave_type_id = id, is_active = saved.is_active, "Leave type updated");
        Ok(saved)
    }
}

#[async_trait]
impl LeaveTypeRegistry for LeaveTypeCatalog {
    async fn leave_type(&self, id: u64) -> LeaveResult<Option<LeaveType>> {
        if let Some(hit) = self.cache.get(&id).await {
            return Ok(Some(hit));
        }

        let found = self.store.get(id).await?;
        if let Some(leave_type) = &found {
            debug!(leave_type_id = id, "Caching leave type");
            self.cache.insert(id, leave_type.clone()).await;
        }
        Ok(found)
    }

    async fn active_types(&self) -> LeaveResult<Vec<LeaveType>> {
        self.store.list(Some(true)).await
    }
}
