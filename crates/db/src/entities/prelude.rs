//! Entity re-exports under their table names.

pub use super::accounts::Entity as Accounts;
pub use super::bank_reconciliations::Entity as BankReconciliations;
pub use super::bank_statement_lines::Entity as BankStatementLines;
pub use super::bank_statements::Entity as BankStatements;
pub use super::companies::Entity as Companies;
pub use super::currencies::Entity as Currencies;
pub use super::numbering_schemes::Entity as NumberingSchemes;
pub use super::voucher_entries::Entity as VoucherEntries;
pub use super::vouchers::Entity as Vouchers;
