//! Ledger domain types for voucher creation and validation.
//!
//! This module defines the core types used for creating and validating
//! vouchers in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, CompanyId};
use serde::{Deserialize, Serialize};

/// Entry side: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

/// Voucher type classification.
///
/// Determines the numbering scheme scope and the semantic category of the
/// document for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// General journal entry.
    Journal,
    /// Sales invoice.
    SalesInvoice,
    /// Purchase invoice (vendor bill).
    PurchaseInvoice,
    /// Incoming payment.
    CashReceipt,
    /// Outgoing payment.
    CashPayment,
    /// Transfer between accounts.
    Transfer,
    /// Adjustment entry.
    Adjustment,
    /// Opening balance entry.
    OpeningBalance,
    /// Bank charge recorded during reconciliation.
    BankCharge,
    /// Reversal of a posted voucher.
    Reversal,
}

impl VoucherType {
    /// The document-type key used to look up numbering schemes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::SalesInvoice => "sales_invoice",
            Self::PurchaseInvoice => "purchase_invoice",
            Self::CashReceipt => "cash_receipt",
            Self::CashPayment => "cash_payment",
            Self::Transfer => "transfer",
            Self::Adjustment => "adjustment",
            Self::OpeningBalance => "opening_balance",
            Self::BankCharge => "bank_charge",
            Self::Reversal => "reversal",
        }
    }

    /// Short prefix used when no numbering scheme exists for this type.
    #[must_use]
    pub fn number_prefix(self) -> &'static str {
        match self {
            Self::Journal => "JV",
            Self::SalesInvoice => "SINV",
            Self::PurchaseInvoice => "PINV",
            Self::CashReceipt => "CR",
            Self::CashPayment => "CP",
            Self::Transfer => "TRF",
            Self::Adjustment => "ADJ",
            Self::OpeningBalance => "OB",
            Self::BankCharge => "BC",
            Self::Reversal => "RV",
        }
    }
}

/// Voucher lifecycle status.
///
/// A voucher starts in `Draft` and moves exactly once to either `Posted`
/// or `Cancelled`. Both are terminal; reversal of a posted voucher is a
/// new voucher, never a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is being drafted and can be modified.
    Draft,
    /// Voucher has been posted to the ledger (immutable).
    Posted,
    /// Voucher has been cancelled without posting (immutable).
    Cancelled,
}

impl VoucherStatus {
    /// Returns true if the voucher can be modified.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the voucher has reached a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Posted | Self::Cancelled)
    }
}

/// Input for a single voucher entry line.
///
/// Amounts follow the standard convention: both columns are non-negative
/// and exactly one of them is non-zero.
#[derive(Debug, Clone)]
pub struct VoucherEntryInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional description for this line.
    pub description: Option<String>,
    /// Optional cost center tag.
    pub cost_center: Option<String>,
}

impl VoucherEntryInput {
    /// The side of this entry, if it is well-formed.
    ///
    /// Returns `None` when both columns are zero or both are set; the
    /// validation layer turns those cases into specific errors.
    #[must_use]
    pub fn side(&self) -> Option<EntryType> {
        if self.debit > Decimal::ZERO && self.credit == Decimal::ZERO {
            Some(EntryType::Debit)
        } else if self.credit > Decimal::ZERO && self.debit == Decimal::ZERO {
            Some(EntryType::Credit)
        } else {
            None
        }
    }

    /// Signed amount: positive for debits, negative for credits.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Input for creating a new voucher.
#[derive(Debug, Clone)]
pub struct CreateVoucherInput {
    /// The company this voucher belongs to.
    pub company_id: CompanyId,
    /// The type of voucher.
    pub voucher_type: VoucherType,
    /// The document date.
    pub voucher_date: NaiveDate,
    /// Currency code (ISO 4217) for all entry amounts.
    pub currency: String,
    /// Explicit voucher number. When `None` the numbering service assigns
    /// one; manual numbers are preserved verbatim.
    pub voucher_number: Option<String>,
    /// Optional description of the voucher.
    pub description: Option<String>,
    /// The entry lines (at least 2).
    pub entries: Vec<VoucherEntryInput>,
}

/// Debit/credit totals of a voucher.
#[derive(Debug, Clone)]
pub struct VoucherTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the voucher is balanced (debits == credits, exact).
    pub is_balanced: bool,
}

impl VoucherTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_voucher_status_editable() {
        assert!(VoucherStatus::Draft.is_editable());
        assert!(!VoucherStatus::Posted.is_editable());
        assert!(!VoucherStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_voucher_status_terminal() {
        assert!(!VoucherStatus::Draft.is_terminal());
        assert!(VoucherStatus::Posted.is_terminal());
        assert!(VoucherStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_entry_side() {
        let mut entry = VoucherEntryInput {
            account_id: AccountId::new(),
            debit: dec!(100),
            credit: Decimal::ZERO,
            description: None,
            cost_center: None,
        };
        assert_eq!(entry.side(), Some(EntryType::Debit));
        assert_eq!(entry.signed_amount(), dec!(100));

        entry.debit = Decimal::ZERO;
        entry.credit = dec!(100);
        assert_eq!(entry.side(), Some(EntryType::Credit));
        assert_eq!(entry.signed_amount(), dec!(-100));

        entry.debit = dec!(100);
        assert_eq!(entry.side(), None);

        entry.debit = Decimal::ZERO;
        entry.credit = Decimal::ZERO;
        assert_eq!(entry.side(), None);
    }

    #[test]
    fn test_voucher_totals_balanced() {
        let totals = VoucherTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_voucher_totals_unbalanced() {
        let totals = VoucherTotals::new(dec!(100.00), dec!(50.00));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50.00));
    }

    #[test]
    fn test_voucher_type_codes_are_distinct() {
        let types = [
            VoucherType::Journal,
            VoucherType::SalesInvoice,
            VoucherType::PurchaseInvoice,
            VoucherType::CashReceipt,
            VoucherType::CashPayment,
            VoucherType::Transfer,
            VoucherType::Adjustment,
            VoucherType::OpeningBalance,
            VoucherType::BankCharge,
            VoucherType::Reversal,
        ];
        let mut keys: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), types.len());

        let mut prefixes: Vec<&str> = types.iter().map(|t| t.number_prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), types.len());
    }
}
