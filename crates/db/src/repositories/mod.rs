//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

use sea_orm::{DbErr, SqlErr};

pub mod account;
pub mod company;
pub mod numbering;
pub mod reconciliation;
pub mod voucher;

pub use account::{
    AccountError, AccountFilter, AccountRepository, CreateAccountInput, LedgerEntryWithVoucher,
    PaginatedAccountLedger, UpdateAccountInput,
};
pub use company::{CompanyError, CompanyRepository, CreateCompanyInput};
pub use numbering::{AllocationError, CreateSchemeInput, NumberingRepository};
pub use reconciliation::{
    BankReconciliationError, ImportStatementInput, ReconciliationRepository, StatementWithLines,
};
pub use voucher::{
    PaginatedVouchers, UpdateDraftInput, VoucherError, VoucherFilter, VoucherRepository,
    VoucherWithEntries,
};

/// True when the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
