//! Account roles and role-based routing.

use serde::{Deserialize, Serialize};

/// An account's marketplace role.
///
/// Admin accounts carry no role at all (`Option<Role>::None` with the
/// `is_superadmin` flag set); the numeric discriminants match the stored
/// smallint values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    /// A seller entity in the marketplace, one per approved business.
    Vendor = 1,
    /// A buyer placing food orders.
    Customer = 2,
}

impl Role {
    /// Decode a role from its stored smallint value.
    #[must_use]
    pub const fn from_number(n: i16) -> Option<Self> {
        match n {
            1 => Some(Self::Vendor),
            2 => Some(Self::Customer),
            _ => None,
        }
    }

    /// The stored smallint value.
    #[must_use]
    pub const fn as_number(self) -> i16 {
        self as i16
    }

    /// Human-readable role label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vendor => "Vendor",
            Self::Customer => "Customer",
        }
    }
}

/// Resolve the dashboard path for an account.
///
/// Vendors land on the vendor dashboard, customers on the customer
/// dashboard, role-less superadmins on the admin panel. Anything else
/// (a role-less non-admin account) falls back to the login page.
#[must_use]
pub const fn dashboard_path(role: Option<Role>, is_superadmin: bool) -> &'static str {
    match (role, is_superadmin) {
        (Some(Role::Vendor), _) => "/account/vendor",
        (Some(Role::Customer), _) => "/account/customer",
        (None, true) => "/admin",
        (None, false) => "/auth/login",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_roundtrip() {
        assert_eq!(Role::from_number(1), Some(Role::Vendor));
        assert_eq!(Role::from_number(2), Some(Role::Customer));
        assert_eq!(Role::from_number(0), None);
        assert_eq!(Role::from_number(3), None);
        assert_eq!(Role::Vendor.as_number(), 1);
        assert_eq!(Role::Customer.as_number(), 2);
    }

    #[test]
    fn test_dashboard_path_matrix() {
        assert_eq!(dashboard_path(Some(Role::Vendor), false), "/account/vendor");
        assert_eq!(
            dashboard_path(Some(Role::Customer), false),
            "/account/customer"
        );
        assert_eq!(dashboard_path(None, true), "/admin");
        // Decided fallback: role-less non-admin accounts go back to login
        assert_eq!(dashboard_path(None, false), "/auth/login");
        // A superadmin flag never overrides an explicit role
        assert_eq!(dashboard_path(Some(Role::Vendor), true), "/account/vendor");
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&Role::Vendor).map_err(|e| e.to_string()),
            Ok("\"vendor\"".to_owned())
        );
        assert_eq!(
            serde_json::to_string(&Role::Customer).map_err(|e| e.to_string()),
            Ok("\"customer\"".to_owned())
        );
    }
}
