//! Core business logic for Saldo.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: vouchers, entries, balance rules
//! - `numbering` - Document number formatting and counter reset policies
//! - `reconciliation` - Bank statement validation and entry matching
//! - `conversion` - Closed-set quantity conversion rules
//! - `error` - Error classification shared by the domain error types

pub mod conversion;
pub mod error;
pub mod ledger;
pub mod numbering;
pub mod reconciliation;
