use serde::Serialize;

use super::role::Role;

/// What the identity provider knows about a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: u64,
    pub display_name: String,
    pub department_id: Option<u64>,
    pub roles: Vec<Role>,
    pub is_active: bool,
}
