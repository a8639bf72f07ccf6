//! Vendor repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use plateful_core::{ProfileId, Slug, UserId, VendorId};

use super::RepositoryError;
use crate::models::Vendor;

const VENDOR_COLUMNS: &str = "id, user_id, profile_id, vendor_name, vendor_slug, \
     vendor_license, is_approved, created_at, modified_at";

/// Raw vendor row as stored.
#[derive(sqlx::FromRow)]
struct VendorRow {
    id: i32,
    user_id: i32,
    profile_id: i32,
    vendor_name: String,
    vendor_slug: String,
    vendor_license: Option<String>,
    is_approved: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl VendorRow {
    fn into_domain(self) -> Result<Vendor, RepositoryError> {
        let vendor_slug = Slug::parse(&self.vendor_slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid vendor slug in database: {e}"))
        })?;

        Ok(Vendor {
            id: VendorId::new(self.id),
            user_id: UserId::new(self.user_id),
            profile_id: ProfileId::new(self.profile_id),
            vendor_name: self.vendor_name,
            vendor_slug,
            vendor_license: self.vendor_license,
            is_approved: self.is_approved,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

/// Fields for a new vendor record.
#[derive(Debug)]
pub struct NewVendor<'a> {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub vendor_name: &'a str,
    pub vendor_slug: &'a Slug,
}

/// Result of an approval update.
///
/// The update is a single compare-and-set statement; a notification is only
/// owed when the flag actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The flag changed to the requested value.
    Transitioned,
    /// The vendor exists but the flag already held the requested value.
    Unchanged,
}

/// Repository for vendor database operations.
pub struct VendorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRepository<'a> {
    /// Create a new vendor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a vendor record. Vendors start unapproved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken or the user
    /// already has a vendor, `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewVendor<'_>) -> Result<Vendor, RepositoryError> {
        let sql = format!(
            "INSERT INTO vendors (user_id, profile_id, vendor_name, vendor_slug) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {VENDOR_COLUMNS}"
        );

        let row: VendorRow = sqlx::query_as(&sql)
            .bind(new.user_id)
            .bind(new.profile_id)
            .bind(new.vendor_name)
            .bind(new.vendor_slug)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_unique_violation(e, "vendor name or account already in use")
            })?;

        row.into_domain()
    }

    /// Get a vendor by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: VendorId) -> Result<Option<Vendor>, RepositoryError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1");

        let row: Option<VendorRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(VendorRow::into_domain).transpose()
    }

    /// Get the vendor owned by a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Vendor>, RepositoryError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE user_id = $1");

        let row: Option<VendorRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(VendorRow::into_domain).transpose()
    }

    /// Get a vendor by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Vendor>, RepositoryError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE vendor_slug = $1");

        let row: Option<VendorRow> = sqlx::query_as(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        row.map(VendorRow::into_domain).transpose()
    }

    /// List vendors visible on the marketplace: approved, with an active
    /// owning account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_approved(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let sql = format!(
            "SELECT v.{} FROM vendors v \
             JOIN users u ON u.id = v.user_id \
             WHERE v.is_approved AND u.is_active \
             ORDER BY v.vendor_name, v.id",
            VENDOR_COLUMNS.replace(", ", ", v.")
        );

        let rows: Vec<VendorRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        rows.into_iter().map(VendorRow::into_domain).collect()
    }

    /// List every vendor, newest first. Admin-only view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY created_at DESC, id DESC");

        let rows: Vec<VendorRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        rows.into_iter().map(VendorRow::into_domain).collect()
    }

    /// Store the path of an uploaded license document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor doesn't exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn set_license(
        &self,
        vendor_id: VendorId,
        license_path: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE vendors SET vendor_license = $2, modified_at = NOW() WHERE id = $1",
        )
        .bind(vendor_id)
        .bind(license_path)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set the approval flag with a compare-and-set, so concurrent identical
    /// updates produce exactly one transition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vendor doesn't exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn set_approval(
        &self,
        vendor_id: VendorId,
        approved: bool,
    ) -> Result<(Vendor, ApprovalOutcome), RepositoryError> {
        let sql = format!(
            "UPDATE vendors SET is_approved = $2, modified_at = NOW() \
             WHERE id = $1 AND is_approved <> $2 \
             RETURNING {VENDOR_COLUMNS}"
        );

        let row: Option<VendorRow> = sqlx::query_as(&sql)
            .bind(vendor_id)
            .bind(approved)
            .fetch_optional(self.pool)
            .await?;

        if let Some(row) = row {
            return Ok((row.into_domain()?, ApprovalOutcome::Transitioned));
        }

        // No row matched: either the vendor is missing or the flag already
        // held the requested value.
        let vendor = self
            .get_by_id(vendor_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok((vendor, ApprovalOutcome::Unchanged))
    }
}
