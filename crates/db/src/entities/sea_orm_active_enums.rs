//! Postgres enum mappings shared by the entity models.
//!
//! Each enum mirrors a database type created by the initial migration and
//! converts to and from the domain enums in `saldo-core`.

use saldo_core::ledger::{
    AccountType as CoreAccountType, VoucherStatus as CoreVoucherStatus,
    VoucherType as CoreVoucherType,
};
use saldo_core::numbering::{DateFormat as CoreDateFormat, ResetFrequency as CoreResetFrequency};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification stored in the `account_type` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<CoreAccountType> for AccountType {
    fn from(value: CoreAccountType) -> Self {
        match value {
            CoreAccountType::Asset => Self::Asset,
            CoreAccountType::Liability => Self::Liability,
            CoreAccountType::Equity => Self::Equity,
            CoreAccountType::Revenue => Self::Revenue,
            CoreAccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for CoreAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

/// Voucher lifecycle state stored in the `voucher_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_status")]
pub enum VoucherStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<CoreVoucherStatus> for VoucherStatus {
    fn from(value: CoreVoucherStatus) -> Self {
        match value {
            CoreVoucherStatus::Draft => Self::Draft,
            CoreVoucherStatus::Posted => Self::Posted,
            CoreVoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<VoucherStatus> for CoreVoucherStatus {
    fn from(value: VoucherStatus) -> Self {
        match value {
            VoucherStatus::Draft => Self::Draft,
            VoucherStatus::Posted => Self::Posted,
            VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Document category stored in the `voucher_type` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_type")]
pub enum VoucherType {
    #[sea_orm(string_value = "journal")]
    Journal,
    #[sea_orm(string_value = "sales_invoice")]
    SalesInvoice,
    #[sea_orm(string_value = "purchase_invoice")]
    PurchaseInvoice,
    #[sea_orm(string_value = "cash_receipt")]
    CashReceipt,
    #[sea_orm(string_value = "cash_payment")]
    CashPayment,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "opening_balance")]
    OpeningBalance,
    #[sea_orm(string_value = "bank_charge")]
    BankCharge,
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

impl From<CoreVoucherType> for VoucherType {
    fn from(value: CoreVoucherType) -> Self {
        match value {
            CoreVoucherType::Journal => Self::Journal,
            CoreVoucherType::SalesInvoice => Self::SalesInvoice,
            CoreVoucherType::PurchaseInvoice => Self::PurchaseInvoice,
            CoreVoucherType::CashReceipt => Self::CashReceipt,
            CoreVoucherType::CashPayment => Self::CashPayment,
            CoreVoucherType::Transfer => Self::Transfer,
            CoreVoucherType::Adjustment => Self::Adjustment,
            CoreVoucherType::OpeningBalance => Self::OpeningBalance,
            CoreVoucherType::BankCharge => Self::BankCharge,
            CoreVoucherType::Reversal => Self::Reversal,
        }
    }
}

impl From<VoucherType> for CoreVoucherType {
    fn from(value: VoucherType) -> Self {
        match value {
            VoucherType::Journal => Self::Journal,
            VoucherType::SalesInvoice => Self::SalesInvoice,
            VoucherType::PurchaseInvoice => Self::PurchaseInvoice,
            VoucherType::CashReceipt => Self::CashReceipt,
            VoucherType::CashPayment => Self::CashPayment,
            VoucherType::Transfer => Self::Transfer,
            VoucherType::Adjustment => Self::Adjustment,
            VoucherType::OpeningBalance => Self::OpeningBalance,
            VoucherType::BankCharge => Self::BankCharge,
            VoucherType::Reversal => Self::Reversal,
        }
    }
}

/// Date segment layout stored in the `date_format` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "date_format")]
pub enum DateFormat {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "year")]
    Year,
    #[sea_orm(string_value = "year_month")]
    YearMonth,
    #[sea_orm(string_value = "year_month_day")]
    YearMonthDay,
}

impl From<CoreDateFormat> for DateFormat {
    fn from(value: CoreDateFormat) -> Self {
        match value {
            CoreDateFormat::None => Self::None,
            CoreDateFormat::Year => Self::Year,
            CoreDateFormat::YearMonth => Self::YearMonth,
            CoreDateFormat::YearMonthDay => Self::YearMonthDay,
        }
    }
}

impl From<DateFormat> for CoreDateFormat {
    fn from(value: DateFormat) -> Self {
        match value {
            DateFormat::None => Self::None,
            DateFormat::Year => Self::Year,
            DateFormat::YearMonth => Self::YearMonth,
            DateFormat::YearMonthDay => Self::YearMonthDay,
        }
    }
}

/// Counter reset cadence stored in the `reset_frequency` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reset_frequency")]
pub enum ResetFrequency {
    #[sea_orm(string_value = "never")]
    Never,
    #[sea_orm(string_value = "yearly")]
    Yearly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "daily")]
    Daily,
}

impl From<CoreResetFrequency> for ResetFrequency {
    fn from(value: CoreResetFrequency) -> Self {
        match value {
            CoreResetFrequency::Never => Self::Never,
            CoreResetFrequency::Yearly => Self::Yearly,
            CoreResetFrequency::Monthly => Self::Monthly,
            CoreResetFrequency::Daily => Self::Daily,
        }
    }
}

impl From<ResetFrequency> for CoreResetFrequency {
    fn from(value: ResetFrequency) -> Self {
        match value {
            ResetFrequency::Never => Self::Never,
            ResetFrequency::Yearly => Self::Yearly,
            ResetFrequency::Monthly => Self::Monthly,
            ResetFrequency::Daily => Self::Daily,
        }
    }
}
