//! `SeaORM` entity models for the saldo schema.

pub mod prelude;

pub mod accounts;
pub mod bank_reconciliations;
pub mod bank_statement_lines;
pub mod bank_statements;
pub mod companies;
pub mod currencies;
pub mod numbering_schemes;
pub mod sea_orm_active_enums;
pub mod voucher_entries;
pub mod vouchers;
