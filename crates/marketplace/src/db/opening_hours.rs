//! Opening-hours repository for database operations.

use sqlx::PgPool;

use plateful_core::{OpeningHourId, TimeSlot, VendorId, Weekday};

use super::RepositoryError;
use crate::models::OpeningHour;

const HOUR_COLUMNS: &str = "id, vendor_id, day, from_hour, to_hour, is_closed";

/// Raw opening-hours row as stored.
#[derive(sqlx::FromRow)]
struct OpeningHourRow {
    id: i32,
    vendor_id: i32,
    day: i16,
    from_hour: String,
    to_hour: String,
    is_closed: bool,
}

impl OpeningHourRow {
    fn into_domain(self) -> Result<OpeningHour, RepositoryError> {
        let day = Weekday::from_number(self.day).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("unknown weekday in database: {}", self.day))
        })?;

        let from_hour = TimeSlot::parse(&self.from_hour).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid from_hour in database: {e}"))
        })?;

        let to_hour = TimeSlot::parse(&self.to_hour).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid to_hour in database: {e}"))
        })?;

        Ok(OpeningHour {
            id: OpeningHourId::new(self.id),
            vendor_id: VendorId::new(self.vendor_id),
            day,
            from_hour,
            to_hour,
            is_closed: self.is_closed,
        })
    }
}

/// Fields for a new opening-hours row.
#[derive(Debug, Clone, Copy)]
pub struct NewOpeningHour {
    pub vendor_id: VendorId,
    pub day: Weekday,
    pub from_hour: TimeSlot,
    pub to_hour: TimeSlot,
    pub is_closed: bool,
}

/// Repository for opening-hours database operations.
pub struct OpeningHourRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OpeningHourRepository<'a> {
    /// Create a new opening-hours repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a row to a vendor's week.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an identical `(day, from, to)`
    /// row already exists for the vendor, `RepositoryError::Database` for
    /// other failures.
    pub async fn create(&self, new: NewOpeningHour) -> Result<OpeningHour, RepositoryError> {
        let sql = format!(
            "INSERT INTO opening_hours (vendor_id, day, from_hour, to_hour, is_closed) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {HOUR_COLUMNS}"
        );

        let row: OpeningHourRow = sqlx::query_as(&sql)
            .bind(new.vendor_id)
            .bind(new.day)
            .bind(new.from_hour)
            .bind(new.to_hour)
            .bind(new.is_closed)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_unique_violation(
                    e,
                    "identical opening hours already exist for this day",
                )
            })?;

        row.into_domain()
    }

    /// List a vendor's full week, ordered by day then start slot.
    ///
    /// The start-slot ordering happens in memory: slots are stored in their
    /// clock-face form, which does not sort chronologically as text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
    ) -> Result<Vec<OpeningHour>, RepositoryError> {
        let sql = format!(
            "SELECT {HOUR_COLUMNS} FROM opening_hours WHERE vendor_id = $1 ORDER BY day, id"
        );

        let rows: Vec<OpeningHourRow> = sqlx::query_as(&sql)
            .bind(vendor_id)
            .fetch_all(self.pool)
            .await?;

        let mut hours: Vec<OpeningHour> = rows
            .into_iter()
            .map(OpeningHourRow::into_domain)
            .collect::<Result<_, _>>()?;
        hours.sort_by_key(|h| (h.day.as_number(), h.from_hour.minutes()));

        Ok(hours)
    }

    /// List a vendor's rows for one day, ordered by start slot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_day(
        &self,
        vendor_id: VendorId,
        day: Weekday,
    ) -> Result<Vec<OpeningHour>, RepositoryError> {
        let sql = format!(
            "SELECT {HOUR_COLUMNS} FROM opening_hours WHERE vendor_id = $1 AND day = $2 \
             ORDER BY id"
        );

        let rows: Vec<OpeningHourRow> = sqlx::query_as(&sql)
            .bind(vendor_id)
            .bind(day)
            .fetch_all(self.pool)
            .await?;

        let mut hours: Vec<OpeningHour> = rows
            .into_iter()
            .map(OpeningHourRow::into_domain)
            .collect::<Result<_, _>>()?;
        hours.sort_by_key(|h| h.from_hour.minutes());

        Ok(hours)
    }

    /// Delete one of a vendor's rows. The vendor scope keeps one vendor from
    /// deleting another's hours.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row doesn't exist or
    /// belongs to another vendor, `RepositoryError::Database` for other
    /// failures.
    pub async fn delete(
        &self,
        vendor_id: VendorId,
        id: OpeningHourId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM opening_hours WHERE id = $1 AND vendor_id = $2")
            .bind(id)
            .bind(vendor_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
