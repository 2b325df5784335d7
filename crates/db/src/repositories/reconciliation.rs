//! Bank reconciliation repository: statement import, entry matching,
//! reconciliation snapshots and bank charge posting.
//!
//! Matching is greedy and idempotent. Each line claim commits in its own
//! small transaction; the unique index on `matched_entry_id` makes a
//! double claim impossible, so a race loser simply moves on to its next
//! candidate.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use saldo_core::error::ErrorKind;
use saldo_core::ledger::LedgerError;
use saldo_core::reconciliation::{
    build_charge_voucher, running_balances, select_candidates, validate_charge_line,
    validate_statement, CandidateEntry, ChargeLine, MatchParams, ReconciliationError,
    ReconciliationFigures, StatementRow,
};
use saldo_shared::types::{AccountId, BankStatementId, CompanyId, ReconciliationId, StatementLineId};

use crate::entities::{
    accounts, bank_reconciliations, bank_statement_lines, bank_statements,
    sea_orm_active_enums::VoucherStatus as DbVoucherStatus,
    voucher_entries, vouchers,
};
use crate::repositories::account::balance_as_of;
use crate::repositories::is_unique_violation;
use crate::repositories::voucher::{create_and_post_in_txn, VoucherError, VoucherWithEntries};

/// Error types for reconciliation operations.
#[derive(Debug, thiserror::Error)]
pub enum BankReconciliationError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Statement does not belong to the named bank account.
    #[error("Statement {statement_id} does not belong to account {account_id}")]
    StatementAccountMismatch {
        /// The statement the caller named.
        statement_id: BankStatementId,
        /// The bank account the caller named.
        account_id: AccountId,
    },

    /// Account guard rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Domain rule rejected the operation.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Charge voucher synthesis or posting failed.
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BankReconciliationError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::StatementAccountMismatch { .. } => "STATEMENT_ACCOUNT_MISMATCH",
            Self::Ledger(err) => err.error_code(),
            Self::Reconciliation(err) => err.error_code(),
            Self::Voucher(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::StatementAccountMismatch { .. } => ErrorKind::Validation,
            Self::Ledger(err) => err.kind(),
            Self::Reconciliation(err) => err.kind(),
            Self::Voucher(err) => err.kind(),
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Input for importing a bank statement.
#[derive(Debug, Clone)]
pub struct ImportStatementInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// The bank account the statement belongs to.
    pub bank_account_id: AccountId,
    /// First day of the statement period.
    pub period_start: NaiveDate,
    /// Last day of the statement period.
    pub period_end: NaiveDate,
    /// Balance before the first line.
    pub opening_balance: Decimal,
    /// Declared balance after the last line.
    pub closing_balance: Decimal,
    /// Statement lines in bank order.
    pub rows: Vec<StatementRow>,
}

/// A statement with its imported lines.
#[derive(Debug, Clone)]
pub struct StatementWithLines {
    /// The statement header.
    pub statement: bank_statements::Model,
    /// The lines ordered by line number.
    pub lines: Vec<bank_statement_lines::Model>,
}

/// Outcome of one atomic line claim attempt.
enum ClaimOutcome {
    /// The line now links to the entry.
    Claimed,
    /// Another line already claimed the entry.
    EntryTaken,
    /// The line itself got matched elsewhere.
    LineTaken,
}

/// Reconciliation repository: imports, matching and snapshots.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
    match_params: MatchParams,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository with the default matching
    /// window.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            match_params: MatchParams::default(),
        }
    }

    /// Overrides the matching parameters.
    #[must_use]
    pub fn with_match_params(mut self, params: MatchParams) -> Self {
        self.match_params = params;
        self
    }

    /// Imports a bank statement with its lines.
    ///
    /// The statement must balance exactly: closing equals opening plus
    /// the sum of line amounts. A failing statement is rejected
    /// wholesale and nothing is persisted. Lines are numbered in input
    /// order and carry a cumulative running balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or not a postable
    /// bank account, the statement fails validation, or the insert
    /// fails.
    pub async fn import_statement(
        &self,
        input: ImportStatementInput,
    ) -> Result<StatementWithLines, BankReconciliationError> {
        let account = accounts::Entity::find_by_id(input.bank_account_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BankReconciliationError::AccountNotFound(
                input.bank_account_id,
            ))?;

        if account.company_id != input.company_id.into_inner() {
            return Err(LedgerError::AccountCompanyMismatch(input.bank_account_id).into());
        }
        validate_bank_account(&account)?;

        validate_statement(
            input.period_start,
            input.period_end,
            input.opening_balance,
            input.closing_balance,
            &input.rows,
        )?;

        let balances = running_balances(input.opening_balance, &input.rows);

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now();
        let statement = bank_statements::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id.into_inner()),
            bank_account_id: Set(account.id),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            opening_balance: Set(input.opening_balance),
            closing_balance: Set(input.closing_balance),
            created_at: Set(now.into()),
        };
        let statement = statement.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.rows.len());
        let mut line_number = 0_i32;
        for (row, running_balance) in input.rows.iter().zip(balances) {
            line_number += 1;
            let line = bank_statement_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                statement_id: Set(statement.id),
                line_number: Set(line_number),
                line_date: Set(row.row_date),
                description: Set(row.description.clone()),
                reference: Set(row.reference.clone()),
                amount: Set(row.amount),
                running_balance: Set(running_balance),
                is_reconciled: Set(false),
                matched_entry_id: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            lines.push(line.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(
            statement_id = %statement.id,
            bank_account_id = %input.bank_account_id,
            lines = lines.len(),
            "bank statement imported"
        );

        Ok(StatementWithLines { statement, lines })
    }

    /// Runs one greedy matching pass over a statement's unmatched lines.
    ///
    /// For each line the qualifying posted, unclaimed entries inside the
    /// date window are ranked (nearest date, earliest voucher date,
    /// lowest entry id) and the best claim that sticks wins. Matched
    /// lines are never re-evaluated, so re-running on a processed
    /// statement returns 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is missing or a query fails.
    pub async fn auto_match(
        &self,
        statement_id: BankStatementId,
    ) -> Result<u32, BankReconciliationError> {
        let statement = self.find_statement(statement_id).await?;

        let unmatched = bank_statement_lines::Entity::find()
            .filter(bank_statement_lines::Column::StatementId.eq(statement.id))
            .filter(bank_statement_lines::Column::IsReconciled.eq(false))
            .order_by_asc(bank_statement_lines::Column::LineNumber)
            .all(&self.db)
            .await?;

        if unmatched.is_empty() {
            info!(statement_id = %statement_id, matched = 0_u32, "auto-match pass finished");
            return Ok(0);
        }

        let mut claimed = self.claimed_entry_ids(statement.bank_account_id).await?;
        let mut matched = 0_u32;

        for line in &unmatched {
            let candidates = self
                .window_candidates(statement.bank_account_id, line.line_date, &claimed)
                .await?;
            let ranked = select_candidates(line.line_date, line.amount, &candidates, &self.match_params);

            for candidate in ranked {
                let entry_id = candidate.entry_id.into_inner();
                match self.try_claim(line.id, entry_id).await? {
                    ClaimOutcome::Claimed => {
                        debug!(line_id = %line.id, entry_id = %entry_id, "statement line matched");
                        claimed.insert(entry_id);
                        matched += 1;
                        break;
                    }
                    ClaimOutcome::EntryTaken => {
                        claimed.insert(entry_id);
                    }
                    ClaimOutcome::LineTaken => break,
                }
            }
        }

        info!(statement_id = %statement_id, matched, "auto-match pass finished");
        Ok(matched)
    }

    /// Creates a reconciliation snapshot for a statement: the declared
    /// closing balance, the ledger balance of the bank account as of
    /// `date`, and the computed bridge figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement or account is missing, the
    /// statement belongs to another account, or the insert fails.
    pub async fn create_reconciliation(
        &self,
        bank_account_id: AccountId,
        statement_id: BankStatementId,
        date: NaiveDate,
    ) -> Result<bank_reconciliations::Model, BankReconciliationError> {
        let statement = self.find_statement(statement_id).await?;
        if statement.bank_account_id != bank_account_id.into_inner() {
            return Err(BankReconciliationError::StatementAccountMismatch {
                statement_id,
                account_id: bank_account_id,
            });
        }

        let account = accounts::Entity::find_by_id(statement.bank_account_id)
            .one(&self.db)
            .await?
            .ok_or(BankReconciliationError::AccountNotFound(bank_account_id))?;

        let ledger_balance = balance_as_of(&self.db, &account, date).await?;
        let (deposits, outstanding) = self.unmatched_sums(account.id, date).await?;

        let figures = ReconciliationFigures {
            statement_balance: statement.closing_balance,
            ledger_balance,
            outstanding_payments: outstanding,
            deposits_in_transit: deposits,
        };

        let now = chrono::Utc::now();
        let reconciliation = bank_reconciliations::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(statement.company_id),
            bank_account_id: Set(statement.bank_account_id),
            statement_id: Set(statement.id),
            reconciliation_date: Set(date),
            statement_balance: Set(figures.statement_balance),
            ledger_balance: Set(figures.ledger_balance),
            outstanding_payments: Set(figures.outstanding_payments),
            deposits_in_transit: Set(figures.deposits_in_transit),
            difference: Set(figures.difference()),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let reconciliation = reconciliation.insert(&self.db).await?;

        info!(
            reconciliation_id = %reconciliation.id,
            statement_id = %statement_id,
            difference = %reconciliation.difference,
            "reconciliation snapshot created"
        );

        Ok(reconciliation)
    }

    /// Sums posted, unmatched credits on the reconciliation's bank
    /// account dated on or before the reconciliation date: payments the
    /// bank has not seen yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the reconciliation is missing or the query
    /// fails.
    pub async fn outstanding_payments(
        &self,
        id: ReconciliationId,
    ) -> Result<Decimal, BankReconciliationError> {
        let reconciliation = self.find_reconciliation(id).await?;
        let (_, outstanding) = self
            .unmatched_sums(
                reconciliation.bank_account_id,
                reconciliation.reconciliation_date,
            )
            .await?;
        Ok(outstanding)
    }

    /// Sums posted, unmatched debits on the reconciliation's bank
    /// account dated on or before the reconciliation date: deposits the
    /// bank has not seen yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the reconciliation is missing or the query
    /// fails.
    pub async fn deposits_in_transit(
        &self,
        id: ReconciliationId,
    ) -> Result<Decimal, BankReconciliationError> {
        let reconciliation = self.find_reconciliation(id).await?;
        let (deposits, _) = self
            .unmatched_sums(
                reconciliation.bank_account_id,
                reconciliation.reconciliation_date,
            )
            .await?;
        Ok(deposits)
    }

    /// Recomputes and persists the reconciliation's bridge figures.
    /// Rejected once the reconciliation is completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the reconciliation is missing or completed,
    /// or the update fails.
    pub async fn refresh(
        &self,
        id: ReconciliationId,
    ) -> Result<bank_reconciliations::Model, BankReconciliationError> {
        let reconciliation = self.find_reconciliation(id).await?;
        if reconciliation.completed_at.is_some() {
            return Err(ReconciliationError::AlreadyCompleted(id).into());
        }

        let figures = self.compute_figures(&reconciliation).await?;

        let mut active: bank_reconciliations::ActiveModel = reconciliation.into();
        active.ledger_balance = Set(figures.ledger_balance);
        active.outstanding_payments = Set(figures.outstanding_payments);
        active.deposits_in_transit = Set(figures.deposits_in_transit);
        active.difference = Set(figures.difference());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&self.db).await?;

        Ok(updated)
    }

    /// Completes a reconciliation: refreshes the figures, requires a
    /// zero difference, stamps `completed_at`. Completed
    /// reconciliations are frozen.
    ///
    /// # Errors
    ///
    /// Returns an error if the reconciliation is missing or already
    /// completed, or the difference is non-zero.
    pub async fn complete(
        &self,
        id: ReconciliationId,
    ) -> Result<bank_reconciliations::Model, BankReconciliationError> {
        let reconciliation = self.find_reconciliation(id).await?;
        if reconciliation.completed_at.is_some() {
            return Err(ReconciliationError::AlreadyCompleted(id).into());
        }

        let figures = self.compute_figures(&reconciliation).await?;
        if !figures.is_balanced() {
            return Err(ReconciliationError::UnresolvedDifference(figures.difference()).into());
        }

        let now = chrono::Utc::now();
        let mut active: bank_reconciliations::ActiveModel = reconciliation.into();
        active.ledger_balance = Set(figures.ledger_balance);
        active.outstanding_payments = Set(figures.outstanding_payments);
        active.deposits_in_transit = Set(figures.deposits_in_transit);
        active.difference = Set(figures.difference());
        active.completed_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let completed = active.update(&self.db).await?;

        info!(reconciliation_id = %id, "reconciliation completed");
        Ok(completed)
    }

    /// Posts bank charge vouchers for negative, unmatched statement
    /// lines: per line, debit the expense account and credit the bank
    /// account with the absolute amount, post, and link the line to the
    /// bank-side entry, in one transaction per line.
    ///
    /// Every selected line is validated before the first voucher is
    /// created.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement, a line, or the expense account
    /// fails validation, or if posting fails.
    pub async fn post_bank_charges(
        &self,
        statement_id: BankStatementId,
        line_ids: &[StatementLineId],
        expense_account_id: AccountId,
    ) -> Result<Vec<VoucherWithEntries>, BankReconciliationError> {
        let statement = self.find_statement(statement_id).await?;

        let bank_account = accounts::Entity::find_by_id(statement.bank_account_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                BankReconciliationError::AccountNotFound(statement.bank_account_id.into())
            })?;

        let expense_account = accounts::Entity::find_by_id(expense_account_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BankReconciliationError::AccountNotFound(expense_account_id))?;

        if expense_account.company_id != statement.company_id {
            return Err(LedgerError::AccountCompanyMismatch(expense_account_id).into());
        }
        validate_postable(&expense_account)?;

        let mut charge_lines = Vec::with_capacity(line_ids.len());
        for &line_id in line_ids {
            let line = bank_statement_lines::Entity::find_by_id(line_id.into_inner())
                .one(&self.db)
                .await?
                .filter(|line| line.statement_id == statement.id)
                .ok_or(ReconciliationError::LineNotInStatement {
                    line_id,
                    statement_id,
                })?;

            let charge = ChargeLine {
                line_id,
                line_date: line.line_date,
                description: line.description.clone(),
                amount: line.amount,
                is_reconciled: line.is_reconciled,
            };
            validate_charge_line(&charge)?;
            charge_lines.push(charge);
        }

        let mut posted = Vec::with_capacity(charge_lines.len());
        for charge in &charge_lines {
            let input = build_charge_voucher(
                CompanyId::from(statement.company_id),
                &bank_account.currency,
                AccountId::from(bank_account.id),
                expense_account_id,
                charge,
            );

            let txn = self.db.begin().await?;
            let voucher = create_and_post_in_txn(&txn, &input, None).await?;

            let bank_entry_id = voucher
                .entries
                .iter()
                .find(|entry| entry.account_id == bank_account.id)
                .map(|entry| entry.id)
                .ok_or_else(|| {
                    DbErr::Custom("bank charge voucher has no bank-side entry".to_string())
                })?;

            let claim = bank_statement_lines::Entity::update_many()
                .col_expr(bank_statement_lines::Column::IsReconciled, Expr::value(true))
                .col_expr(
                    bank_statement_lines::Column::MatchedEntryId,
                    Expr::value(bank_entry_id),
                )
                .col_expr(
                    bank_statement_lines::Column::UpdatedAt,
                    Expr::value(chrono::Utc::now()),
                )
                .filter(bank_statement_lines::Column::Id.eq(charge.line_id.into_inner()))
                .filter(bank_statement_lines::Column::IsReconciled.eq(false))
                .exec(&txn)
                .await?;

            if claim.rows_affected == 0 {
                // The line got matched between validation and this claim.
                txn.rollback().await?;
                return Err(ReconciliationError::LineAlreadyMatched(charge.line_id).into());
            }

            txn.commit().await?;

            debug!(
                line_id = %charge.line_id,
                voucher_id = %voucher.voucher.id,
                number = %voucher.voucher.voucher_number,
                "bank charge posted"
            );
            posted.push(voucher);
        }

        info!(
            statement_id = %statement_id,
            charges = posted.len(),
            "bank charges posted"
        );

        Ok(posted)
    }

    /// Loads a statement by ID.
    async fn find_statement(
        &self,
        id: BankStatementId,
    ) -> Result<bank_statements::Model, BankReconciliationError> {
        let statement = bank_statements::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::StatementNotFound(id))?;
        Ok(statement)
    }

    /// Loads a reconciliation by ID.
    async fn find_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<bank_reconciliations::Model, BankReconciliationError> {
        let reconciliation = bank_reconciliations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::ReconciliationNotFound(id))?;
        Ok(reconciliation)
    }

    /// Recomputes the bridge figures for an existing snapshot. The
    /// statement balance keeps the value captured at creation.
    async fn compute_figures(
        &self,
        reconciliation: &bank_reconciliations::Model,
    ) -> Result<ReconciliationFigures, BankReconciliationError> {
        let account = accounts::Entity::find_by_id(reconciliation.bank_account_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                BankReconciliationError::AccountNotFound(reconciliation.bank_account_id.into())
            })?;

        let ledger_balance =
            balance_as_of(&self.db, &account, reconciliation.reconciliation_date).await?;
        let (deposits, outstanding) = self
            .unmatched_sums(account.id, reconciliation.reconciliation_date)
            .await?;

        Ok(ReconciliationFigures {
            statement_balance: reconciliation.statement_balance,
            ledger_balance,
            outstanding_payments: outstanding,
            deposits_in_transit: deposits,
        })
    }

    /// Entry IDs already claimed by any statement line of the bank
    /// account.
    async fn claimed_entry_ids(&self, bank_account_id: Uuid) -> Result<HashSet<Uuid>, DbErr> {
        let ids: Vec<Option<Uuid>> = bank_statement_lines::Entity::find()
            .select_only()
            .column(bank_statement_lines::Column::MatchedEntryId)
            .filter(bank_statement_lines::Column::MatchedEntryId.is_not_null())
            .join(
                JoinType::InnerJoin,
                bank_statement_lines::Relation::BankStatements.def(),
            )
            .filter(bank_statements::Column::BankAccountId.eq(bank_account_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids.into_iter().flatten().collect())
    }

    /// Fetches posted entries on the bank account inside the date window
    /// around `line_date`, excluding already-claimed entries.
    async fn window_candidates(
        &self,
        bank_account_id: Uuid,
        line_date: NaiveDate,
        claimed: &HashSet<Uuid>,
    ) -> Result<Vec<CandidateEntry>, DbErr> {
        #[derive(Debug, FromQueryResult)]
        struct CandidateRow {
            id: Uuid,
            debit: Decimal,
            credit: Decimal,
            voucher_date: NaiveDate,
        }

        let window = chrono::Duration::days(self.match_params.window_days);

        let rows = voucher_entries::Entity::find()
            .select_only()
            .column(voucher_entries::Column::Id)
            .column(voucher_entries::Column::Debit)
            .column(voucher_entries::Column::Credit)
            .column_as(vouchers::Column::VoucherDate, "voucher_date")
            .join(
                JoinType::InnerJoin,
                voucher_entries::Relation::Vouchers.def(),
            )
            .filter(voucher_entries::Column::AccountId.eq(bank_account_id))
            .filter(vouchers::Column::Status.eq(DbVoucherStatus::Posted))
            .filter(vouchers::Column::VoucherDate.gte(line_date - window))
            .filter(vouchers::Column::VoucherDate.lte(line_date + window))
            .into_model::<CandidateRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|row| !claimed.contains(&row.id))
            .map(|row| CandidateEntry {
                entry_id: row.id.into(),
                voucher_date: row.voucher_date,
                signed_amount: row.debit - row.credit,
            })
            .collect())
    }

    /// Attempts to atomically link a line to an entry in its own small
    /// transaction.
    async fn try_claim(&self, line_id: Uuid, entry_id: Uuid) -> Result<ClaimOutcome, DbErr> {
        let txn = self.db.begin().await?;

        let result = bank_statement_lines::Entity::update_many()
            .col_expr(bank_statement_lines::Column::IsReconciled, Expr::value(true))
            .col_expr(
                bank_statement_lines::Column::MatchedEntryId,
                Expr::value(entry_id),
            )
            .col_expr(
                bank_statement_lines::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(bank_statement_lines::Column::Id.eq(line_id))
            .filter(bank_statement_lines::Column::IsReconciled.eq(false))
            .exec(&txn)
            .await;

        match result {
            Ok(update) if update.rows_affected == 0 => {
                txn.rollback().await?;
                Ok(ClaimOutcome::LineTaken)
            }
            Ok(_) => {
                txn.commit().await?;
                Ok(ClaimOutcome::Claimed)
            }
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                Ok(ClaimOutcome::EntryTaken)
            }
            Err(err) => Err(err),
        }
    }

    /// Sums posted, unmatched (debit, credit) movement on the bank
    /// account dated on or before `up_to`.
    async fn unmatched_sums(
        &self,
        bank_account_id: Uuid,
        up_to: NaiveDate,
    ) -> Result<(Decimal, Decimal), DbErr> {
        #[derive(Debug, FromQueryResult)]
        struct MovementSums {
            total_debit: Option<Decimal>,
            total_credit: Option<Decimal>,
        }

        let claimed = self.claimed_entry_ids(bank_account_id).await?;

        let mut query = voucher_entries::Entity::find()
            .select_only()
            .column_as(voucher_entries::Column::Debit.sum(), "total_debit")
            .column_as(voucher_entries::Column::Credit.sum(), "total_credit")
            .join(
                JoinType::InnerJoin,
                voucher_entries::Relation::Vouchers.def(),
            )
            .filter(voucher_entries::Column::AccountId.eq(bank_account_id))
            .filter(vouchers::Column::Status.eq(DbVoucherStatus::Posted))
            .filter(vouchers::Column::VoucherDate.lte(up_to));

        if !claimed.is_empty() {
            let claimed_ids: Vec<Uuid> = claimed.into_iter().collect();
            query = query.filter(voucher_entries::Column::Id.is_not_in(claimed_ids));
        }

        let sums = query.into_model::<MovementSums>().one(&self.db).await?;

        Ok(sums.map_or((Decimal::ZERO, Decimal::ZERO), |s| {
            (
                s.total_debit.unwrap_or(Decimal::ZERO),
                s.total_credit.unwrap_or(Decimal::ZERO),
            )
        }))
    }
}

// ============================================================================
// Account guards
// ============================================================================

/// Checks an account can take statements: an active postable leaf
/// flagged as a bank account.
fn validate_bank_account(account: &accounts::Model) -> Result<(), BankReconciliationError> {
    validate_postable(account)?;
    if !account.is_bank_account {
        return Err(ReconciliationError::NotABankAccount(AccountId::from(account.id)).into());
    }
    Ok(())
}

/// Checks an account is an active postable leaf.
fn validate_postable(account: &accounts::Model) -> Result<(), BankReconciliationError> {
    let account_id = AccountId::from(account.id);
    if !account.is_active {
        return Err(LedgerError::AccountInactive(account_id).into());
    }
    if account.is_group {
        return Err(LedgerError::AccountIsGroup(account_id).into());
    }
    Ok(())
}
