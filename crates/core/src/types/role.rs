//! Admin role enum.

use serde::{Deserialize, Serialize};

/// Admin role in the two-tier hierarchy.
///
/// A role is fixed when the admin is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "desk.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Sees every client and is the only role allowed to change assignments.
    SuperAdmin,
    /// Sees exactly the clients assigned to it.
    SubAdmin,
}

impl AdminRole {
    /// Whether this role may create or remove assignments.
    #[must_use]
    pub const fn can_manage_assignments(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Whether clients may be assigned to an admin with this role.
    #[must_use]
    pub const fn accepts_assignments(self) -> bool {
        matches!(self, Self::SubAdmin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::SubAdmin => write!(f, "sub_admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "sub_admin" => Ok(Self::SubAdmin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        for role in [AdminRole::SuperAdmin, AdminRole::SubAdmin] {
            let parsed: AdminRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("viewer".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(AdminRole::SuperAdmin.can_manage_assignments());
        assert!(!AdminRole::SubAdmin.can_manage_assignments());
        assert!(AdminRole::SubAdmin.accepts_assignments());
        assert!(!AdminRole::SuperAdmin.accepts_assignments());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&AdminRole::SubAdmin).unwrap();
        assert_eq!(json, "\"sub_admin\"");
    }
}
