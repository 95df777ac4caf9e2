use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Department {
    pub id: u64,
    pub name: String,
    pub manager_id: Option<u64>,
}
