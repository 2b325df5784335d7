//! Voucher repository for the draft, post, cancel and reverse lifecycle.
//!
//! Posting is one all-or-nothing transaction per voucher: balance and
//! account checks, per-entry balance movements and the status flip either
//! all commit or none do. Posted vouchers are immutable; undoing one
//! means posting a reversal voucher.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use saldo_core::error::ErrorKind;
use saldo_core::ledger::{
    CreateVoucherInput, LedgerError, LedgerService, ReversalService, VoucherEntryInput,
    VoucherStatus, VoucherType,
};
use saldo_core::numbering::{fallback_number, NumberingError};
use saldo_shared::types::{CompanyId, VoucherId};

use crate::entities::{
    accounts, currencies,
    sea_orm_active_enums::{VoucherStatus as DbVoucherStatus, VoucherType as DbVoucherType},
    voucher_entries, vouchers,
};
use crate::repositories::account::{apply_movement, to_account_info};
use crate::repositories::is_unique_violation;
use crate::repositories::numbering::{allocate_in_txn, AllocationError};

/// Error types for voucher operations.
#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    NotFound(VoucherId),

    /// Currency not found.
    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    /// Voucher number already taken in the company.
    #[error("Voucher number '{0}' already exists")]
    DuplicateNumber(String),

    /// Domain rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Number allocation failed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl VoucherError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "VOUCHER_NOT_FOUND",
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::DuplicateNumber(_) => "DUPLICATE_VOUCHER_NUMBER",
            Self::Ledger(err) => err.error_code(),
            Self::Allocation(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::CurrencyNotFound(_) | Self::DuplicateNumber(_) => ErrorKind::Validation,
            Self::Ledger(err) => err.kind(),
            Self::Allocation(err) => err.kind(),
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    /// Filter by lifecycle status.
    pub status: Option<VoucherStatus>,
    /// Filter by voucher type.
    pub voucher_type: Option<VoucherType>,
    /// Vouchers dated on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Vouchers dated on or before this date.
    pub date_to: Option<NaiveDate>,
}

/// Input for updating a draft voucher.
#[derive(Debug, Clone, Default)]
pub struct UpdateDraftInput {
    /// New document date.
    pub voucher_date: Option<NaiveDate>,
    /// New currency code.
    pub currency: Option<String>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// Replacement entry set; lines are renumbered from 1.
    pub entries: Option<Vec<VoucherEntryInput>>,
}

/// A voucher with its entry lines.
#[derive(Debug, Clone)]
pub struct VoucherWithEntries {
    /// The voucher header.
    pub voucher: vouchers::Model,
    /// The entry lines ordered by line number.
    pub entries: Vec<voucher_entries::Model>,
}

/// Paginated voucher listing.
#[derive(Debug, Clone)]
pub struct PaginatedVouchers {
    /// The voucher headers.
    pub vouchers: Vec<vouchers::Model>,
    /// Total count matching the filter.
    pub total: u64,
    /// Current page (1-indexed).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total pages.
    pub total_pages: u64,
}

/// Voucher repository driving the posting engine.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft voucher.
    ///
    /// Entry shape and account references are validated; balance is not,
    /// so a draft may be transiently unbalanced. When no explicit number
    /// is supplied the allocator assigns one as of the voucher date;
    /// without an active scheme a type-prefixed fallback number is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown, an entry is
    /// malformed, an account reference is invalid, the number is already
    /// taken, or the database operation fails.
    pub async fn create_voucher(
        &self,
        input: CreateVoucherInput,
    ) -> Result<VoucherWithEntries, VoucherError> {
        let currency = currencies::Entity::find_by_id(&input.currency)
            .one(&self.db)
            .await?;
        if currency.is_none() {
            return Err(VoucherError::CurrencyNotFound(input.currency));
        }

        let accounts_by_id = load_accounts_map(&self.db, &input.entries).await?;
        LedgerService::new().validate_draft(&input, |account_id| {
            accounts_by_id
                .get(&account_id.into_inner())
                .map(to_account_info)
                .ok_or(LedgerError::AccountNotFound(account_id))
        })?;

        let txn = self.db.begin().await?;

        let voucher_number = assign_number(
            &txn,
            input.voucher_type,
            input.company_id,
            input.voucher_date,
            input.voucher_number.clone(),
        )
        .await?;

        let now = chrono::Utc::now();
        let voucher = vouchers::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id.into_inner()),
            voucher_number: Set(voucher_number.clone()),
            voucher_type: Set(input.voucher_type.into()),
            voucher_date: Set(input.voucher_date),
            status: Set(DbVoucherStatus::Draft),
            currency: Set(input.currency.clone()),
            description: Set(input.description.clone()),
            total_amount: Set(Decimal::ZERO),
            posted_at: Set(None),
            cancelled_at: Set(None),
            reverses_voucher_id: Set(None),
            reversed_by_voucher_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let voucher = match voucher.insert(&txn).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => {
                return Err(VoucherError::DuplicateNumber(voucher_number));
            }
            Err(err) => return Err(err.into()),
        };

        let entries = insert_entries(&txn, voucher.id, &input.entries).await?;

        txn.commit().await?;

        info!(
            voucher_id = %voucher.id,
            number = %voucher.voucher_number,
            voucher_type = input.voucher_type.as_str(),
            "voucher drafted"
        );

        Ok(VoucherWithEntries { voucher, entries })
    }

    /// Updates a draft voucher's date, currency, description and/or
    /// entry set. Terminal vouchers reject with the state error.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is missing or terminal, the
    /// patched voucher fails validation, or the database operation
    /// fails.
    pub async fn update_draft(
        &self,
        id: VoucherId,
        input: UpdateDraftInput,
    ) -> Result<VoucherWithEntries, VoucherError> {
        let txn = self.db.begin().await?;

        let voucher = vouchers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(VoucherError::NotFound(id))?;

        LedgerService::new().validate_can_modify(VoucherStatus::from(voucher.status.clone()), id)?;

        let currency = input.currency.clone().unwrap_or_else(|| voucher.currency.clone());
        if input.currency.is_some() {
            let known = currencies::Entity::find_by_id(&currency).one(&txn).await?;
            if known.is_none() {
                return Err(VoucherError::CurrencyNotFound(currency));
            }
        }

        let current_entries = load_entries(&txn, voucher.id).await?;
        let effective_entries = match &input.entries {
            Some(replacement) => replacement.clone(),
            None => to_entry_inputs(&current_entries),
        };

        let accounts_by_id = load_accounts_map(&txn, &effective_entries).await?;
        let revalidation = CreateVoucherInput {
            company_id: CompanyId::from(voucher.company_id),
            voucher_type: VoucherType::from(voucher.voucher_type.clone()),
            voucher_date: input.voucher_date.unwrap_or(voucher.voucher_date),
            currency,
            voucher_number: Some(voucher.voucher_number.clone()),
            description: voucher.description.clone(),
            entries: effective_entries,
        };
        LedgerService::new().validate_draft(&revalidation, |account_id| {
            accounts_by_id
                .get(&account_id.into_inner())
                .map(to_account_info)
                .ok_or(LedgerError::AccountNotFound(account_id))
        })?;

        let voucher_id = voucher.id;
        let mut active: vouchers::ActiveModel = voucher.into();
        if let Some(voucher_date) = input.voucher_date {
            active.voucher_date = Set(voucher_date);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        let voucher = active.update(&txn).await?;

        let entries = if let Some(replacement) = input.entries {
            voucher_entries::Entity::delete_many()
                .filter(voucher_entries::Column::VoucherId.eq(voucher_id))
                .exec(&txn)
                .await?;
            insert_entries(&txn, voucher_id, &replacement).await?
        } else {
            current_entries
        };

        txn.commit().await?;

        Ok(VoucherWithEntries { voucher, entries })
    }

    /// Posts a voucher: asserts exact balance and account validity, then
    /// applies every entry's balance movement and flips the status, all
    /// in one transaction.
    ///
    /// Posting an already-posted voucher is an explicit error, never a
    /// silent success.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is missing or terminal, entries
    /// do not balance, an account reference is invalid, or the
    /// transaction fails.
    pub async fn post_voucher(&self, id: VoucherId) -> Result<VoucherWithEntries, VoucherError> {
        let txn = self.db.begin().await?;

        let voucher = vouchers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(VoucherError::NotFound(id))?;

        LedgerService::new().validate_can_post(VoucherStatus::from(voucher.status.clone()), id)?;

        let entries = load_entries(&txn, voucher.id).await?;
        let entry_inputs = to_entry_inputs(&entries);
        let accounts_by_id = load_accounts_map(&txn, &entry_inputs).await?;

        let totals = LedgerService::new().validate_post(
            CompanyId::from(voucher.company_id),
            &voucher.currency,
            &entry_inputs,
            |account_id| {
                accounts_by_id
                    .get(&account_id.into_inner())
                    .map(to_account_info)
                    .ok_or(LedgerError::AccountNotFound(account_id))
            },
        )?;

        for entry in &entries {
            let account = accounts_by_id
                .get(&entry.account_id)
                .ok_or(LedgerError::AccountNotFound(entry.account_id.into()))?;
            apply_movement(&txn, account, entry.debit, entry.credit).await?;
        }

        let now = chrono::Utc::now();
        let mut active: vouchers::ActiveModel = voucher.into();
        active.status = Set(DbVoucherStatus::Posted);
        active.posted_at = Set(Some(now.into()));
        active.total_amount = Set(totals.debit);
        active.updated_at = Set(now.into());
        let voucher = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            voucher_id = %voucher.id,
            number = %voucher.voucher_number,
            total = %voucher.total_amount,
            "voucher posted"
        );

        Ok(VoucherWithEntries { voucher, entries })
    }

    /// Cancels a draft voucher. Terminal vouchers report the state
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is missing or terminal, or the
    /// update fails.
    pub async fn cancel_voucher(&self, id: VoucherId) -> Result<vouchers::Model, VoucherError> {
        let txn = self.db.begin().await?;

        let voucher = vouchers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(VoucherError::NotFound(id))?;

        LedgerService::new().validate_can_cancel(VoucherStatus::from(voucher.status.clone()), id)?;

        let now = chrono::Utc::now();
        let mut active: vouchers::ActiveModel = voucher.into();
        active.status = Set(DbVoucherStatus::Cancelled);
        active.cancelled_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let voucher = active.update(&txn).await?;

        txn.commit().await?;

        info!(voucher_id = %voucher.id, number = %voucher.voucher_number, "voucher cancelled");
        Ok(voucher)
    }

    /// Reverses a posted voucher: creates and posts, in one transaction,
    /// a `reversal` voucher whose entries swap debit and credit, and
    /// links the two vouchers in both directions.
    ///
    /// `date` defaults to today UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is missing, not posted, or
    /// already reversed, or if the reversal fails validation.
    pub async fn reverse_voucher(
        &self,
        id: VoucherId,
        date: Option<NaiveDate>,
    ) -> Result<VoucherWithEntries, VoucherError> {
        let reversal_date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());

        let txn = self.db.begin().await?;

        let original = vouchers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(VoucherError::NotFound(id))?;

        LedgerService::new().validate_can_reverse(
            VoucherStatus::from(original.status.clone()),
            original.reversed_by_voucher_id.map(VoucherId::from),
            id,
        )?;

        let original_entries = load_entries(&txn, original.id).await?;
        let reversal_service = ReversalService::new();
        let reversing_entries =
            reversal_service.build_reversing_entries(&to_entry_inputs(&original_entries));

        let reversal_input = CreateVoucherInput {
            company_id: CompanyId::from(original.company_id),
            voucher_type: VoucherType::Reversal,
            voucher_date: reversal_date,
            currency: original.currency.clone(),
            voucher_number: None,
            description: Some(reversal_service.reversal_description(&original.voucher_number)),
            entries: reversing_entries,
        };
        let reversal = create_and_post_in_txn(&txn, &reversal_input, Some(original.id)).await?;

        let mut original_active: vouchers::ActiveModel = original.into();
        original_active.reversed_by_voucher_id = Set(Some(reversal.voucher.id));
        original_active.updated_at = Set(chrono::Utc::now().into());
        original_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            voucher_id = %id,
            reversal_id = %reversal.voucher.id,
            reversal_number = %reversal.voucher.voucher_number,
            "voucher reversed"
        );

        Ok(reversal)
    }

    /// Gets a voucher with its entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is not found or the query fails.
    pub async fn get_voucher(&self, id: VoucherId) -> Result<VoucherWithEntries, VoucherError> {
        let voucher = vouchers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(VoucherError::NotFound(id))?;

        let entries = load_entries(&self.db, voucher.id).await?;

        Ok(VoucherWithEntries { voucher, entries })
    }

    /// Lists vouchers for a company with optional filters, newest first,
    /// paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_vouchers(
        &self,
        company_id: CompanyId,
        filter: VoucherFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedVouchers, VoucherError> {
        let base_query = || {
            let mut query = vouchers::Entity::find()
                .filter(vouchers::Column::CompanyId.eq(company_id.into_inner()));
            if let Some(status) = filter.status {
                query = query.filter(vouchers::Column::Status.eq(DbVoucherStatus::from(status)));
            }
            if let Some(voucher_type) = filter.voucher_type {
                query = query
                    .filter(vouchers::Column::VoucherType.eq(DbVoucherType::from(voucher_type)));
            }
            if let Some(date_from) = filter.date_from {
                query = query.filter(vouchers::Column::VoucherDate.gte(date_from));
            }
            if let Some(date_to) = filter.date_to {
                query = query.filter(vouchers::Column::VoucherDate.lte(date_to));
            }
            query
        };

        let total = base_query().count(&self.db).await?;
        let total_pages = if total == 0 { 1 } else { total.div_ceil(limit) };
        let offset = page.saturating_sub(1) * limit;

        let vouchers = base_query()
            .order_by_desc(vouchers::Column::VoucherDate)
            .order_by_desc(vouchers::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(PaginatedVouchers {
            vouchers,
            total,
            page,
            limit,
            total_pages,
        })
    }
}

// ============================================================================
// Helpers shared by the lifecycle operations
// ============================================================================

/// Creates and immediately posts a voucher inside the caller's
/// transaction: validation, number assignment, entry insertion, balance
/// movements and the status flip all share the caller's commit.
///
/// The reversal path and the reconciliation engine's bank charge path
/// both post through here. The voucher starts as a draft because the
/// entry-immutability trigger rejects inserting lines into a posted
/// voucher.
pub(crate) async fn create_and_post_in_txn(
    txn: &DatabaseTransaction,
    input: &CreateVoucherInput,
    reverses_voucher_id: Option<Uuid>,
) -> Result<VoucherWithEntries, VoucherError> {
    let accounts_by_id = load_accounts_map(txn, &input.entries).await?;
    let totals = LedgerService::new().validate_post(
        input.company_id,
        &input.currency,
        &input.entries,
        |account_id| {
            accounts_by_id
                .get(&account_id.into_inner())
                .map(to_account_info)
                .ok_or(LedgerError::AccountNotFound(account_id))
        },
    )?;

    let voucher_number = assign_number(
        txn,
        input.voucher_type,
        input.company_id,
        input.voucher_date,
        input.voucher_number.clone(),
    )
    .await?;

    let now = chrono::Utc::now();
    let voucher = vouchers::ActiveModel {
        id: Set(Uuid::now_v7()),
        company_id: Set(input.company_id.into_inner()),
        voucher_number: Set(voucher_number.clone()),
        voucher_type: Set(input.voucher_type.into()),
        voucher_date: Set(input.voucher_date),
        status: Set(DbVoucherStatus::Draft),
        currency: Set(input.currency.clone()),
        description: Set(input.description.clone()),
        total_amount: Set(Decimal::ZERO),
        posted_at: Set(None),
        cancelled_at: Set(None),
        reverses_voucher_id: Set(reverses_voucher_id),
        reversed_by_voucher_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let voucher = match voucher.insert(txn).await {
        Ok(model) => model,
        Err(err) if is_unique_violation(&err) => {
            return Err(VoucherError::DuplicateNumber(voucher_number));
        }
        Err(err) => return Err(err.into()),
    };

    let entries = insert_entries(txn, voucher.id, &input.entries).await?;

    for entry in &entries {
        let account = accounts_by_id
            .get(&entry.account_id)
            .ok_or(LedgerError::AccountNotFound(entry.account_id.into()))?;
        apply_movement(txn, account, entry.debit, entry.credit).await?;
    }

    let posted_at = chrono::Utc::now();
    let mut active: vouchers::ActiveModel = voucher.into();
    active.status = Set(DbVoucherStatus::Posted);
    active.posted_at = Set(Some(posted_at.into()));
    active.total_amount = Set(totals.debit);
    active.updated_at = Set(posted_at.into());
    let voucher = active.update(txn).await?;

    Ok(VoucherWithEntries { voucher, entries })
}

/// Resolves the voucher number: manual numbers verbatim, otherwise the
/// allocator as of the voucher date, falling back to a type-prefixed
/// random number when no scheme covers the type.
async fn assign_number(
    txn: &DatabaseTransaction,
    voucher_type: VoucherType,
    company_id: CompanyId,
    as_of: NaiveDate,
    manual: Option<String>,
) -> Result<String, VoucherError> {
    if let Some(number) = manual {
        return Ok(number);
    }

    match allocate_in_txn(txn, voucher_type.as_str(), Some(company_id), as_of).await {
        Ok(number) => Ok(number),
        Err(AllocationError::Numbering(NumberingError::SchemeNotFound { .. })) => {
            let number = fallback_number(voucher_type.number_prefix());
            warn!(
                voucher_type = voucher_type.as_str(),
                number = %number,
                "no active numbering scheme, used fallback number"
            );
            Ok(number)
        }
        Err(err) => Err(err.into()),
    }
}

/// Inserts entry rows numbered from 1 in input order.
async fn insert_entries(
    txn: &DatabaseTransaction,
    voucher_id: Uuid,
    entries: &[VoucherEntryInput],
) -> Result<Vec<voucher_entries::Model>, DbErr> {
    let now = chrono::Utc::now();
    let mut rows = Vec::with_capacity(entries.len());
    let mut line_number = 0_i32;

    for entry in entries {
        line_number += 1;
        let row = voucher_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            voucher_id: Set(voucher_id),
            line_number: Set(line_number),
            account_id: Set(entry.account_id.into_inner()),
            debit: Set(entry.debit),
            credit: Set(entry.credit),
            description: Set(entry.description.clone()),
            cost_center: Set(entry.cost_center.clone()),
            created_at: Set(now.into()),
        };
        rows.push(row.insert(txn).await?);
    }

    Ok(rows)
}

/// Loads a voucher's entries ordered by line number.
async fn load_entries<C>(conn: &C, voucher_id: Uuid) -> Result<Vec<voucher_entries::Model>, DbErr>
where
    C: ConnectionTrait,
{
    voucher_entries::Entity::find()
        .filter(voucher_entries::Column::VoucherId.eq(voucher_id))
        .order_by_asc(voucher_entries::Column::LineNumber)
        .all(conn)
        .await
}

/// Loads every account referenced by the entries, keyed by raw ID.
async fn load_accounts_map<C>(
    conn: &C,
    entries: &[VoucherEntryInput],
) -> Result<HashMap<Uuid, accounts::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<Uuid> = entries
        .iter()
        .map(|entry| entry.account_id.into_inner())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

/// Converts stored entry rows back into domain entry inputs.
fn to_entry_inputs(entries: &[voucher_entries::Model]) -> Vec<VoucherEntryInput> {
    entries
        .iter()
        .map(|entry| VoucherEntryInput {
            account_id: entry.account_id.into(),
            debit: entry.debit,
            credit: entry.credit,
            description: entry.description.clone(),
            cost_center: entry.cost_center.clone(),
        })
        .collect()
}
