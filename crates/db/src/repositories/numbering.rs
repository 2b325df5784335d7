//! Numbering scheme repository for gap-free document number allocation.
//!
//! The counter state lives in `numbering_schemes`. Every mutation of
//! `next_number` and `last_reset_date` happens under a pessimistic row
//! lock (`SELECT ... FOR UPDATE`), so concurrent allocations on one
//! scope serialize and the sequence has no gaps and no duplicates.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use saldo_core::error::ErrorKind;
use saldo_core::numbering::{
    resolve_allocation, validate_scheme_config, DateFormat, NumberingError, ResetFrequency,
    SchemeSnapshot,
};
use saldo_shared::types::{CompanyId, NumberingSchemeId};

use crate::entities::numbering_schemes;
use crate::repositories::is_unique_violation;

/// Statement timeout for the scheme row lock. Postgres raises SQLSTATE
/// 55P03 when it expires.
const SET_LOCK_TIMEOUT: &str = "SET LOCAL lock_timeout = '10s'";

/// Error types for numbering operations.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// Scheme resolution or counter rules rejected the request.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    /// The scheme row lock was not acquired within the timeout.
    #[error("Timed out waiting for the numbering scheme lock")]
    LockTimeout,

    /// An active scheme already covers this document type and scope.
    #[error("An active scheme for document type '{0}' already exists in this scope")]
    DuplicateActiveScheme(String),

    /// Scheme not found by ID.
    #[error("Numbering scheme not found: {0}")]
    NotFound(NumberingSchemeId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AllocationError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Numbering(err) => err.error_code(),
            Self::LockTimeout => "NUMBERING_LOCK_TIMEOUT",
            Self::DuplicateActiveScheme(_) => "DUPLICATE_ACTIVE_SCHEME",
            Self::NotFound(_) => "SCHEME_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Numbering(err) => err.kind(),
            Self::LockTimeout => ErrorKind::Contention,
            Self::DuplicateActiveScheme(_) => ErrorKind::Integrity,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Input for creating a numbering scheme.
#[derive(Debug, Clone)]
pub struct CreateSchemeInput {
    /// Company sub-scope; `None` creates a global scheme.
    pub company_id: Option<CompanyId>,
    /// Document type the scheme numbers (e.g. a voucher-type tag).
    pub document_type: String,
    /// Static prefix segment.
    pub prefix: Option<String>,
    /// Static suffix segment.
    pub suffix: Option<String>,
    /// Separator between segments.
    pub separator: String,
    /// Date segment layout.
    pub date_format: DateFormat,
    /// Zero-padding width of the counter segment (1 to 10).
    pub padding: u32,
    /// Initial counter value.
    pub next_number: i64,
    /// When the counter restarts at 1.
    pub reset_frequency: ResetFrequency,
}

/// Numbering repository: scheme management plus the locking allocator.
#[derive(Debug, Clone)]
pub struct NumberingRepository {
    db: DatabaseConnection,
}

impl NumberingRepository {
    /// Creates a new numbering repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates the next formatted number for a document type, applying
    /// the scheme's reset policy as of `as_of` (today UTC when omitted).
    ///
    /// Runs in its own transaction. Callers that must tie the number to
    /// another row's lifetime use [`allocate_in_txn`] inside their
    /// transaction instead.
    ///
    /// # Errors
    ///
    /// Returns an error if no active scheme covers the scope, the row
    /// lock times out, or the database operation fails.
    pub async fn allocate(
        &self,
        document_type: &str,
        company_id: Option<CompanyId>,
        as_of: Option<NaiveDate>,
    ) -> Result<String, AllocationError> {
        let as_of = as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());

        let txn = self.db.begin().await?;
        let number = allocate_in_txn(&txn, document_type, company_id, as_of).await?;
        txn.commit().await?;

        Ok(number)
    }

    /// Computes the number the next [`allocate`](Self::allocate) call
    /// would return, including any virtual reset, without taking the
    /// lock and without mutating the scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if no active scheme covers the scope or the
    /// query fails.
    pub async fn preview(
        &self,
        document_type: &str,
        company_id: Option<CompanyId>,
        as_of: Option<NaiveDate>,
    ) -> Result<String, AllocationError> {
        if document_type.trim().is_empty() {
            return Err(NumberingError::EmptyDocumentType.into());
        }
        let as_of = as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());

        let scheme = resolve_scheme(&self.db, document_type, company_id, false)
            .await?
            .ok_or_else(|| scheme_not_found(document_type, company_id))?;

        let resolved = resolve_allocation(&to_snapshot(&scheme), as_of)?;
        Ok(resolved.number)
    }

    /// Sets a scheme's counter to `new_value` under the row lock.
    ///
    /// Only `next_number` changes; the reset epoch keeps its stamp, so
    /// the periodic reset policy is unaffected.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_value` is below 1, the scheme is not
    /// found, or the lock times out.
    pub async fn reset(
        &self,
        scheme_id: NumberingSchemeId,
        new_value: i64,
    ) -> Result<numbering_schemes::Model, AllocationError> {
        if new_value < 1 {
            return Err(NumberingError::InvalidCounter(new_value).into());
        }

        let txn = self.db.begin().await?;
        txn.execute_unprepared(SET_LOCK_TIMEOUT).await?;

        let scheme = numbering_schemes::Entity::find_by_id(scheme_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_lock_err)?
            .ok_or(AllocationError::NotFound(scheme_id))?;

        let mut active: numbering_schemes::ActiveModel = scheme.into();
        active.next_number = Set(new_value);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(scheme_id = %scheme_id, next_number = new_value, "numbering counter reset");
        Ok(updated)
    }

    /// Resolves the active scheme for a scope without locking it.
    ///
    /// # Errors
    ///
    /// Returns an error if no active scheme covers the scope or the
    /// query fails.
    pub async fn scheme_info(
        &self,
        document_type: &str,
        company_id: Option<CompanyId>,
    ) -> Result<numbering_schemes::Model, AllocationError> {
        resolve_scheme(&self.db, document_type, company_id, false)
            .await?
            .ok_or_else(|| scheme_not_found(document_type, company_id))
    }

    /// Creates a numbering scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, an active
    /// scheme already covers the scope, or the insert fails.
    pub async fn create_scheme(
        &self,
        input: CreateSchemeInput,
    ) -> Result<numbering_schemes::Model, AllocationError> {
        validate_scheme_config(&input.document_type, input.padding, input.next_number)?;

        let padding = i16::try_from(input.padding)
            .map_err(|_| NumberingError::InvalidPadding(input.padding))?;
        let document_type = input.document_type.clone();

        let now = chrono::Utc::now().into();
        let scheme = numbering_schemes::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id.map(CompanyId::into_inner)),
            document_type: Set(input.document_type),
            prefix: Set(input.prefix),
            suffix: Set(input.suffix),
            separator: Set(input.separator),
            date_format: Set(input.date_format.into()),
            padding: Set(padding),
            next_number: Set(input.next_number),
            reset_frequency: Set(input.reset_frequency.into()),
            last_reset_date: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = match scheme.insert(&self.db).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => {
                return Err(AllocationError::DuplicateActiveScheme(document_type));
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            scheme_id = %created.id,
            document_type = %created.document_type,
            company_id = ?created.company_id,
            "numbering scheme created"
        );
        Ok(created)
    }
}

// ============================================================================
// Allocation inside a caller-owned transaction
// ============================================================================

/// Allocates the next formatted number inside the caller's transaction.
///
/// The scheme row stays locked until that transaction commits, so the
/// consumed number becomes visible together with the row that used it.
/// A rollback releases the number with the rest of the work.
///
/// # Errors
///
/// Returns an error if no active scheme covers the scope, the row lock
/// times out, or the database operation fails.
pub async fn allocate_in_txn(
    txn: &DatabaseTransaction,
    document_type: &str,
    company_id: Option<CompanyId>,
    as_of: NaiveDate,
) -> Result<String, AllocationError> {
    if document_type.trim().is_empty() {
        return Err(NumberingError::EmptyDocumentType.into());
    }

    txn.execute_unprepared(SET_LOCK_TIMEOUT).await?;

    let scheme = resolve_scheme(txn, document_type, company_id, true)
        .await
        .map_err(map_lock_err)?
        .ok_or_else(|| scheme_not_found(document_type, company_id))?;

    let resolved = resolve_allocation(&to_snapshot(&scheme), as_of)?;

    let scheme_id = scheme.id;
    let mut active: numbering_schemes::ActiveModel = scheme.into();
    active.next_number = Set(resolved.new_next_number);
    active.last_reset_date = Set(resolved.new_last_reset_date);
    active.updated_at = Set(chrono::Utc::now().into());
    active.update(txn).await?;

    debug!(
        scheme_id = %scheme_id,
        document_type,
        number = %resolved.number,
        counter = resolved.counter,
        reset_applied = resolved.reset_applied,
        "document number allocated"
    );

    Ok(resolved.number)
}

/// Finds the active scheme for a scope: the company-specific scheme wins,
/// the global (`company_id IS NULL`) scheme is the fallback.
async fn resolve_scheme<C>(
    conn: &C,
    document_type: &str,
    company_id: Option<CompanyId>,
    lock: bool,
) -> Result<Option<numbering_schemes::Model>, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(company_id) = company_id {
        let mut query = numbering_schemes::Entity::find()
            .filter(numbering_schemes::Column::DocumentType.eq(document_type))
            .filter(numbering_schemes::Column::CompanyId.eq(company_id.into_inner()))
            .filter(numbering_schemes::Column::IsActive.eq(true));
        if lock {
            query = query.lock_exclusive();
        }
        if let Some(scheme) = query.one(conn).await? {
            return Ok(Some(scheme));
        }
    }

    let mut query = numbering_schemes::Entity::find()
        .filter(numbering_schemes::Column::DocumentType.eq(document_type))
        .filter(numbering_schemes::Column::CompanyId.is_null())
        .filter(numbering_schemes::Column::IsActive.eq(true));
    if lock {
        query = query.lock_exclusive();
    }
    query.one(conn).await
}

/// Builds the pure allocator's view of a scheme row.
fn to_snapshot(scheme: &numbering_schemes::Model) -> SchemeSnapshot {
    SchemeSnapshot {
        prefix: scheme.prefix.clone(),
        suffix: scheme.suffix.clone(),
        separator: scheme.separator.clone(),
        date_format: scheme.date_format.clone().into(),
        // An out-of-range stored width resolves to 0 and fails snapshot
        // validation instead of silently clamping.
        padding: u32::try_from(scheme.padding).unwrap_or(0),
        next_number: scheme.next_number,
        reset_frequency: scheme.reset_frequency.clone().into(),
        last_reset_date: scheme.last_reset_date,
    }
}

fn scheme_not_found(document_type: &str, company_id: Option<CompanyId>) -> AllocationError {
    NumberingError::SchemeNotFound {
        document_type: document_type.to_string(),
        company_id,
    }
    .into()
}

fn map_lock_err(err: DbErr) -> AllocationError {
    if lock_timed_out(&err) {
        AllocationError::LockTimeout
    } else {
        AllocationError::Database(err)
    }
}

/// True when the error is a Postgres `lock_timeout` expiry (SQLSTATE
/// 55P03).
fn lock_timed_out(err: &DbErr) -> bool {
    let runtime_err = match err {
        DbErr::Query(e) | DbErr::Exec(e) | DbErr::Conn(e) => e,
        _ => return false,
    };
    match runtime_err {
        sea_orm::RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) => {
            db_err.code().as_deref() == Some("55P03")
        }
        _ => false,
    }
}
