//! User and profile domain types.

use chrono::{DateTime, Utc};

use plateful_core::{Email, GeoPoint, ProfileId, Role, UserId, dashboard_path};

/// A marketplace account (domain type).
///
/// One row per person; the optional [`Role`] separates vendor and customer
/// behavior, while admin accounts carry no role and set `is_superadmin`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Unique handle, distinct from the email login identifier.
    pub username: String,
    /// Login identifier, globally unique.
    pub email: Email,
    pub phone_number: Option<String>,
    /// Marketplace role; `None` for admin accounts.
    pub role: Option<Role>,
    /// Accounts start inactive until the activation link is followed.
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superadmin: bool,
    /// When the account was registered.
    pub date_joined: DateTime<Utc>,
    /// Most recent successful login, if any.
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl User {
    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Where this account's dashboard lives.
    #[must_use]
    pub const fn dashboard_path(&self) -> &'static str {
        dashboard_path(self.role, self.is_superadmin)
    }
}

/// Extended profile attached to a user (domain type).
///
/// Every field is optional: profiles are created empty at registration and
/// filled in over the account's lifetime. Callers must tolerate absence of
/// the whole profile as well.
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// Unique profile ID.
    pub id: ProfileId,
    /// Owning user (one profile per user).
    pub user_id: UserId,
    /// Stored path of the profile picture.
    pub profile_picture: Option<String>,
    /// Stored path of the cover photo.
    pub cover_photo: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pin_code: Option<String>,
    /// Latitude as entered, a decimal string.
    pub latitude: Option<String>,
    /// Longitude as entered, a decimal string.
    pub longitude: Option<String>,
    /// Derived point, recomputed from latitude/longitude on every save.
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateful_core::Email;

    fn user(role: Option<Role>, is_superadmin: bool) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            first_name: "Ada".to_owned(),
            last_name: "Rao".to_owned(),
            username: "ada".to_owned(),
            email: Email::parse("ada@plateful.example").expect("valid email"),
            phone_number: None,
            role,
            is_active: true,
            is_staff: false,
            is_superadmin,
            date_joined: now,
            last_login: None,
            created_at: now,
            modified_at: now,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user(None, false).full_name(), "Ada Rao");
    }

    #[test]
    fn test_dashboard_by_role() {
        assert_eq!(
            user(Some(Role::Vendor), false).dashboard_path(),
            "/account/vendor"
        );
        assert_eq!(
            user(Some(Role::Customer), false).dashboard_path(),
            "/account/customer"
        );
        assert_eq!(user(None, true).dashboard_path(), "/admin");
    }
}
