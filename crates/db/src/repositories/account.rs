//! Account repository for chart of accounts and balance operations.
//!
//! The ledger store: account management with the tree and type guards,
//! plus the running-balance operations the voucher posting engine calls
//! inside its transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use saldo_core::error::ErrorKind;
use saldo_core::ledger::{AccountInfo, AccountType, LedgerError, LedgerService};
use saldo_shared::types::{AccountId, CompanyId};

use crate::entities::{
    accounts, currencies,
    sea_orm_active_enums::{self, VoucherStatus as DbVoucherStatus},
    voucher_entries, vouchers,
};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists in the company.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Currency not found.
    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Domain rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Ledger(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateCode(_) | Self::CurrencyNotFound(_) => ErrorKind::Validation,
            Self::ParentNotFound(_) | Self::NotFound(_) => ErrorKind::NotFound,
            Self::Ledger(err) => err.kind(),
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code (unique within the company).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type (asset, liability, equity, revenue, expense).
    pub account_type: AccountType,
    /// Currency code.
    pub currency: String,
    /// Parent account for hierarchical structure.
    pub parent_id: Option<AccountId>,
    /// Whether this is a group (non-postable) node.
    pub is_group: bool,
    /// Whether statements can be imported against this account.
    pub is_bank_account: bool,
    /// Opening balance; also the initial running balance.
    pub opening_balance: Decimal,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account code.
    pub code: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Account type (only while the account has no posted entries).
    pub account_type: Option<AccountType>,
    /// Parent account ID (`Some(None)` clears the parent).
    pub parent_id: Option<Option<AccountId>>,
    /// Whether statements can be imported against this account.
    pub is_bank_account: Option<bool>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Filter by bank-account flag.
    pub is_bank_account: Option<bool>,
    /// Filter by parent ID (`Some(None)` = root accounts only).
    pub parent_id: Option<Option<AccountId>>,
}

/// Posted entry with its voucher context for ledger listing.
#[derive(Debug, Clone)]
pub struct LedgerEntryWithVoucher {
    /// The entry row.
    pub entry: voucher_entries::Model,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher type.
    pub voucher_type: sea_orm_active_enums::VoucherType,
    /// Voucher date.
    pub voucher_date: NaiveDate,
    /// Sign-adjusted movement of this entry for the account.
    pub signed_amount: Decimal,
}

/// Paginated result for an account's posted-entry history.
#[derive(Debug, Clone)]
pub struct PaginatedAccountLedger {
    /// The entries with voucher context.
    pub entries: Vec<LedgerEntryWithVoucher>,
    /// Total count of posted entries.
    pub total: u64,
    /// Current page (1-indexed).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total pages.
    pub total_pages: u64,
}

/// Account repository for CRUD and balance operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account code already exists in the company
    /// - Currency does not exist
    /// - Parent does not exist, is a leaf, or belongs to another company
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(input.company_id.into_inner()))
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        let currency = currencies::Entity::find_by_id(&input.currency)
            .one(&self.db)
            .await?;

        if currency.is_none() {
            return Err(AccountError::CurrencyNotFound(input.currency));
        }

        let account_id = Uuid::now_v7();

        if let Some(parent_id) = input.parent_id {
            let parent = accounts::Entity::find_by_id(parent_id.into_inner())
                .one(&self.db)
                .await?
                .ok_or(AccountError::ParentNotFound(parent_id))?;

            if parent.company_id != input.company_id.into_inner() {
                return Err(LedgerError::AccountCompanyMismatch(parent_id).into());
            }

            // A freshly minted id cannot appear in any ancestor chain.
            LedgerService::new().validate_parent(
                AccountId::from(account_id),
                &to_account_info(&parent),
                &[],
            )?;
        }

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(account_id),
            company_id: Set(input.company_id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            currency: Set(input.currency),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            is_group: Set(input.is_group),
            is_bank_account: Set(input.is_bank_account),
            is_active: Set(true),
            opening_balance: Set(input.opening_balance),
            current_balance: Set(input.opening_balance),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account)
    }

    /// Updates an account.
    ///
    /// The account type is frozen once posted entries exist; re-parenting
    /// must keep the tree acyclic and inside the company.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, a guard rejects the
    /// patch, or the database operation fails.
    pub async fn update_account(
        &self,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let service = LedgerService::new();

        if let Some(code) = &input.code
            && *code != account.code
        {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::CompanyId.eq(account.company_id))
                .filter(accounts::Column::Code.eq(code))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                return Err(AccountError::DuplicateCode(code.clone()));
            }
        }

        if let Some(requested) = input.account_type {
            let current = AccountType::from(account.account_type.clone());
            let posted_entries = self.count_posted_entries(account.id).await?;
            service.validate_type_change(id, current, requested, posted_entries > 0)?;
        }

        if let Some(Some(parent_id)) = input.parent_id {
            let parent = accounts::Entity::find_by_id(parent_id.into_inner())
                .one(&self.db)
                .await?
                .ok_or(AccountError::ParentNotFound(parent_id))?;

            if parent.company_id != account.company_id {
                return Err(LedgerError::AccountCompanyMismatch(parent_id).into());
            }

            let chain = self.ancestor_chain(parent.parent_id).await?;
            service.validate_parent(id, &to_account_info(&parent), &chain)?;
        }

        let mut active: accounts::ActiveModel = account.into();

        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type.into());
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id.map(AccountId::into_inner));
        }
        if let Some(is_bank_account) = input.is_bank_account {
            active.is_bank_account = Set(is_bank_account);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Soft-deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the update fails.
    pub async fn deactivate_account(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the query fails.
    pub async fn get_account(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        Ok(account)
    }

    /// Lists accounts for a company with optional filters, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        company_id: CompanyId,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()));

        if let Some(account_type) = filter.account_type {
            query = query.filter(
                accounts::Column::AccountType
                    .eq(sea_orm_active_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }
        if let Some(is_bank_account) = filter.is_bank_account {
            query = query.filter(accounts::Column::IsBankAccount.eq(is_bank_account));
        }
        match filter.parent_id {
            Some(Some(parent_id)) => {
                query = query.filter(accounts::Column::ParentId.eq(parent_id.into_inner()));
            }
            Some(None) => {
                query = query.filter(accounts::Column::ParentId.is_null());
            }
            None => {}
        }

        let accounts = query
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }

    /// Gets the stored running balance of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the query fails.
    pub async fn get_balance(&self, id: AccountId) -> Result<Decimal, AccountError> {
        let account = self.get_account(id).await?;
        Ok(account.current_balance)
    }

    /// Computes the balance as of a date from posted history.
    ///
    /// Opening balance plus the sign-adjusted sum of posted entries dated
    /// on or before `date`. The stored running balance is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the query fails.
    pub async fn get_balance_as_of(
        &self,
        id: AccountId,
        date: NaiveDate,
    ) -> Result<Decimal, AccountError> {
        let account = self.get_account(id).await?;
        Ok(balance_as_of(&self.db, &account, date).await?)
    }

    /// Rebuilds the running balance from opening balance plus full posted
    /// history, under a row lock, and persists it.
    ///
    /// Logs a warning when the stored balance had drifted. Returns the
    /// recomputed balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the transaction
    /// fails.
    pub async fn recompute_balance(&self, id: AccountId) -> Result<Decimal, AccountError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let (debit, credit) = posted_movement_sums(&txn, account.id, None).await?;

        let account_type = AccountType::from(account.account_type.clone());
        let computed = account.opening_balance + account_type.balance_change(debit, credit);

        if computed != account.current_balance {
            warn!(
                account_id = %id,
                stored = %account.current_balance,
                computed = %computed,
                "balance drift repaired during recompute"
            );
        }

        let mut active: accounts::ActiveModel = account.into();
        active.current_balance = Set(computed);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(computed)
    }

    /// Lists an account's posted entries with voucher context, newest
    /// first, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the query fails.
    pub async fn account_ledger(
        &self,
        id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedAccountLedger, AccountError> {
        let account = self.get_account(id).await?;
        let account_type = AccountType::from(account.account_type);

        #[derive(Debug, FromQueryResult)]
        struct LedgerRow {
            id: Uuid,
            voucher_id: Uuid,
            line_number: i32,
            account_id: Uuid,
            debit: Decimal,
            credit: Decimal,
            description: Option<String>,
            cost_center: Option<String>,
            created_at: chrono::DateTime<chrono::FixedOffset>,
            voucher_number: String,
            voucher_type: sea_orm_active_enums::VoucherType,
            voucher_date: NaiveDate,
        }

        let base_query = || {
            let mut query = voucher_entries::Entity::find()
                .filter(voucher_entries::Column::AccountId.eq(account.id))
                .join(
                    JoinType::InnerJoin,
                    voucher_entries::Relation::Vouchers.def(),
                )
                .filter(vouchers::Column::Status.eq(DbVoucherStatus::Posted));
            if let Some(from_date) = from {
                query = query.filter(vouchers::Column::VoucherDate.gte(from_date));
            }
            if let Some(to_date) = to {
                query = query.filter(vouchers::Column::VoucherDate.lte(to_date));
            }
            query
        };

        let total = base_query().count(&self.db).await?;

        let total_pages = if total == 0 { 1 } else { total.div_ceil(limit) };
        let offset = page.saturating_sub(1) * limit;

        let rows: Vec<LedgerRow> = base_query()
            .column_as(vouchers::Column::VoucherNumber, "voucher_number")
            .column_as(vouchers::Column::VoucherType, "voucher_type")
            .column_as(vouchers::Column::VoucherDate, "voucher_date")
            .order_by_desc(vouchers::Column::VoucherDate)
            .order_by_desc(voucher_entries::Column::CreatedAt)
            .order_by_desc(voucher_entries::Column::LineNumber)
            .offset(offset)
            .limit(limit)
            .into_model::<LedgerRow>()
            .all(&self.db)
            .await?;

        let entries = rows
            .into_iter()
            .map(|row| {
                let signed_amount = account_type.balance_change(row.debit, row.credit);
                LedgerEntryWithVoucher {
                    entry: voucher_entries::Model {
                        id: row.id,
                        voucher_id: row.voucher_id,
                        line_number: row.line_number,
                        account_id: row.account_id,
                        debit: row.debit,
                        credit: row.credit,
                        description: row.description,
                        cost_center: row.cost_center,
                        created_at: row.created_at,
                    },
                    voucher_number: row.voucher_number,
                    voucher_type: row.voucher_type,
                    voucher_date: row.voucher_date,
                    signed_amount,
                }
            })
            .collect();

        Ok(PaginatedAccountLedger {
            entries,
            total,
            page,
            limit,
            total_pages,
        })
    }

    /// Counts posted entries referencing the account.
    async fn count_posted_entries(&self, account_id: Uuid) -> Result<u64, AccountError> {
        let count = voucher_entries::Entity::find()
            .filter(voucher_entries::Column::AccountId.eq(account_id))
            .join(
                JoinType::InnerJoin,
                voucher_entries::Relation::Vouchers.def(),
            )
            .filter(vouchers::Column::Status.eq(DbVoucherStatus::Posted))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Walks the parent chain upwards from `start` to the root.
    async fn ancestor_chain(&self, start: Option<Uuid>) -> Result<Vec<AccountId>, AccountError> {
        let mut chain = Vec::new();
        let mut cursor = start;
        while let Some(parent_id) = cursor {
            let ancestor = AccountId::from(parent_id);
            // A malformed tree must not hang the walk.
            if chain.contains(&ancestor) {
                break;
            }
            let node = accounts::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or(AccountError::ParentNotFound(ancestor))?;
            chain.push(ancestor);
            cursor = node.parent_id;
        }
        Ok(chain)
    }
}

// ============================================================================
// Shared helpers for the posting path
// ============================================================================

/// Converts an account row into the validation view used by the domain
/// service.
#[must_use]
pub fn to_account_info(account: &accounts::Model) -> AccountInfo {
    AccountInfo {
        id: AccountId::from(account.id),
        company_id: CompanyId::from(account.company_id),
        account_type: AccountType::from(account.account_type.clone()),
        currency: account.currency.clone(),
        is_group: account.is_group,
        is_active: account.is_active,
    }
}

/// Applies one entry's movement to the stored running balance as a single
/// in-database increment. Only ever called inside a voucher-posting
/// transaction.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn apply_movement(
    txn: &DatabaseTransaction,
    account: &accounts::Model,
    debit: Decimal,
    credit: Decimal,
) -> Result<(), DbErr> {
    let account_type = AccountType::from(account.account_type.clone());
    let delta = account_type.balance_change(debit, credit);

    accounts::Entity::update_many()
        .col_expr(
            accounts::Column::CurrentBalance,
            Expr::col(accounts::Column::CurrentBalance).add(delta),
        )
        .col_expr(accounts::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(accounts::Column::Id.eq(account.id))
        .exec(txn)
        .await?;

    Ok(())
}

/// Computes an account's balance as of a date from posted history:
/// opening balance plus the sign-adjusted movement sum.
pub(crate) async fn balance_as_of<C>(
    conn: &C,
    account: &accounts::Model,
    date: NaiveDate,
) -> Result<Decimal, DbErr>
where
    C: sea_orm::ConnectionTrait,
{
    let (debit, credit) = posted_movement_sums(conn, account.id, Some(date)).await?;
    let account_type = AccountType::from(account.account_type.clone());
    Ok(account.opening_balance + account_type.balance_change(debit, credit))
}

/// Sums posted debit/credit movement for an account, optionally bounded
/// by voucher date.
async fn posted_movement_sums<C>(
    conn: &C,
    account_id: Uuid,
    up_to: Option<NaiveDate>,
) -> Result<(Decimal, Decimal), DbErr>
where
    C: sea_orm::ConnectionTrait,
{
    #[derive(Debug, FromQueryResult)]
    struct MovementSums {
        total_debit: Option<Decimal>,
        total_credit: Option<Decimal>,
    }

    let mut query = voucher_entries::Entity::find()
        .select_only()
        .column_as(voucher_entries::Column::Debit.sum(), "total_debit")
        .column_as(voucher_entries::Column::Credit.sum(), "total_credit")
        .join(
            JoinType::InnerJoin,
            voucher_entries::Relation::Vouchers.def(),
        )
        .filter(voucher_entries::Column::AccountId.eq(account_id))
        .filter(vouchers::Column::Status.eq(DbVoucherStatus::Posted));

    if let Some(date) = up_to {
        query = query.filter(vouchers::Column::VoucherDate.lte(date));
    }

    let sums = query.into_model::<MovementSums>().one(conn).await?;

    Ok(sums.map_or((Decimal::ZERO, Decimal::ZERO), |s| {
        (
            s.total_debit.unwrap_or(Decimal::ZERO),
            s.total_credit.unwrap_or(Decimal::ZERO),
        )
    }))
}
