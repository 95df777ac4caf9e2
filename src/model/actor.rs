use super::role::Role;

/// Who is performing an operation. Passed explicitly into every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: u64,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(user_id: u64, roles: impl Into<Vec<Role>>) -> Self {
        Self {
            user_id,
            roles: roles.into(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_hr(&self) -> bool {
        Role::HR_ROLES.iter().any(|r| self.has_role(*r))
    }
}
