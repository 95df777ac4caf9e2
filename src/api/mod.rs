pub mod leave_balance;
pub mod leave_request;
pub mod leave_type;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct YearQuery {
    /// Leave year; defaults to the current year
    #[param(example = 2026)]
    pub year: Option<i32>,
}

impl YearQuery {
    pub fn resolve(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}
