//! Voucher validation service.
//!
//! Pure business logic with no database access. Account data is supplied
//! through lookup closures so the service can be driven by a repository
//! in production and by in-memory maps in tests.

use saldo_shared::types::{AccountId, CompanyId, VoucherId};

use super::account::AccountType;
use super::error::LedgerError;
use super::types::{CreateVoucherInput, VoucherEntryInput, VoucherStatus, VoucherTotals};
use super::validation::{validate_balanced, validate_entry_shape};

/// Account data needed to validate a posting.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account id.
    pub id: AccountId,
    /// The owning company.
    pub company_id: CompanyId,
    /// The account type.
    pub account_type: AccountType,
    /// The account's currency code.
    pub currency: String,
    /// Whether this is a group (non-postable) node.
    pub is_group: bool,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Validation service for voucher lifecycle operations.
#[derive(Debug, Default)]
pub struct LedgerService;

impl LedgerService {
    /// Creates a new ledger service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validates a voucher for draft creation.
    ///
    /// Checks entry shape and account references. Balance is not checked;
    /// drafts may be transiently unbalanced.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed entries or an account
    /// error when a referenced account is missing, inactive, a group
    /// node, in another company, or in another currency.
    pub fn validate_draft<A>(
        &self,
        input: &CreateVoucherInput,
        lookup_account: A,
    ) -> Result<(), LedgerError>
    where
        A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
    {
        validate_entry_shape(&input.entries)?;
        self.validate_accounts(
            input.company_id,
            &input.currency,
            &input.entries,
            lookup_account,
        )
    }

    /// Validates a voucher for posting.
    ///
    /// Re-checks shape and accounts, then requires exact balance.
    /// Returns the totals so the caller can stamp `total_amount`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::validate_draft`] plus
    /// [`LedgerError::Unbalanced`] when debits and credits differ.
    pub fn validate_post<A>(
        &self,
        company_id: CompanyId,
        currency: &str,
        entries: &[VoucherEntryInput],
        lookup_account: A,
    ) -> Result<VoucherTotals, LedgerError>
    where
        A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
    {
        validate_entry_shape(entries)?;
        self.validate_accounts(company_id, currency, entries, lookup_account)?;
        validate_balanced(entries)
    }

    /// Checks every referenced account: active postable leaf in the same
    /// company, currency matching the voucher's.
    fn validate_accounts<A>(
        &self,
        company_id: CompanyId,
        currency: &str,
        entries: &[VoucherEntryInput],
        lookup_account: A,
    ) -> Result<(), LedgerError>
    where
        A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
    {
        for entry in entries {
            let account = lookup_account(entry.account_id)?;
            if account.company_id != company_id {
                return Err(LedgerError::AccountCompanyMismatch(account.id));
            }
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account.id));
            }
            if account.is_group {
                return Err(LedgerError::AccountIsGroup(account.id));
            }
            if account.currency != currency {
                return Err(LedgerError::CurrencyMismatch {
                    account_id: account.id,
                    account_currency: account.currency,
                    voucher_currency: currency.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validates that a voucher can transition to posted.
    ///
    /// # Errors
    ///
    /// Returns the state error when the voucher is already terminal.
    pub fn validate_can_post(
        &self,
        status: VoucherStatus,
        id: VoucherId,
    ) -> Result<(), LedgerError> {
        match status {
            VoucherStatus::Draft => Ok(()),
            VoucherStatus::Posted => Err(LedgerError::AlreadyPosted(id)),
            VoucherStatus::Cancelled => Err(LedgerError::AlreadyCancelled(id)),
        }
    }

    /// Validates that a voucher can be modified.
    ///
    /// # Errors
    ///
    /// Returns the state error when the voucher is already terminal.
    pub fn validate_can_modify(
        &self,
        status: VoucherStatus,
        id: VoucherId,
    ) -> Result<(), LedgerError> {
        match status {
            VoucherStatus::Draft => Ok(()),
            VoucherStatus::Posted => Err(LedgerError::CannotModifyPosted(id)),
            VoucherStatus::Cancelled => Err(LedgerError::CannotModifyCancelled(id)),
        }
    }

    /// Validates that a voucher can transition to cancelled.
    ///
    /// # Errors
    ///
    /// Returns the state error when the voucher is already terminal.
    pub fn validate_can_cancel(
        &self,
        status: VoucherStatus,
        id: VoucherId,
    ) -> Result<(), LedgerError> {
        self.validate_can_post(status, id)
    }

    /// Validates that a voucher can be reversed.
    ///
    /// Only posted vouchers that have not been reversed yet qualify.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotPosted`] or [`LedgerError::AlreadyReversed`].
    pub fn validate_can_reverse(
        &self,
        status: VoucherStatus,
        reversed_by: Option<VoucherId>,
        id: VoucherId,
    ) -> Result<(), LedgerError> {
        if status != VoucherStatus::Posted {
            return Err(LedgerError::NotPosted(id));
        }
        if reversed_by.is_some() {
            return Err(LedgerError::AlreadyReversed(id));
        }
        Ok(())
    }

    /// Validates assigning `parent` as the parent of `account_id`.
    ///
    /// `parent_chain` is the ancestor walk starting at the parent's own
    /// parent up to the root, supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ParentNotGroup`] when the parent is a leaf,
    /// or [`LedgerError::ParentCycle`] when the account would become its
    /// own ancestor.
    pub fn validate_parent(
        &self,
        account_id: AccountId,
        parent: &AccountInfo,
        parent_chain: &[AccountId],
    ) -> Result<(), LedgerError> {
        if !parent.is_group {
            return Err(LedgerError::ParentNotGroup(parent.id));
        }
        if parent.id == account_id || parent_chain.contains(&account_id) {
            return Err(LedgerError::ParentCycle(account_id));
        }
        Ok(())
    }

    /// Validates an account type change.
    ///
    /// The type is frozen once the account has posted entries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TypeFrozen`] when entries exist and the
    /// type differs.
    pub fn validate_type_change(
        &self,
        account_id: AccountId,
        current: AccountType,
        requested: AccountType,
        has_entries: bool,
    ) -> Result<(), LedgerError> {
        if current != requested && has_entries {
            return Err(LedgerError::TypeFrozen(account_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::super::types::VoucherType;
    use super::*;

    fn make_account(company_id: CompanyId, account_type: AccountType) -> AccountInfo {
        AccountInfo {
            id: AccountId::new(),
            company_id,
            account_type,
            currency: "USD".to_string(),
            is_group: false,
            is_active: true,
        }
    }

    fn make_entry(account_id: AccountId, debit: Decimal, credit: Decimal) -> VoucherEntryInput {
        VoucherEntryInput {
            account_id,
            debit,
            credit,
            description: None,
            cost_center: None,
        }
    }

    fn make_input(company_id: CompanyId, entries: Vec<VoucherEntryInput>) -> CreateVoucherInput {
        CreateVoucherInput {
            company_id,
            voucher_type: VoucherType::Journal,
            voucher_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            currency: "USD".to_string(),
            voucher_number: None,
            description: None,
            entries,
        }
    }

    fn lookup_from(
        accounts: &HashMap<AccountId, AccountInfo>,
    ) -> impl Fn(AccountId) -> Result<AccountInfo, LedgerError> + '_ {
        |id| {
            accounts
                .get(&id)
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id))
        }
    }

    #[test]
    fn test_draft_allows_unbalanced() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let sales = make_account(company, AccountType::Revenue);
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (sales.id, sales.clone())].into();

        let input = make_input(
            company,
            vec![
                make_entry(bank.id, dec!(100.00), Decimal::ZERO),
                make_entry(sales.id, Decimal::ZERO, dec!(75.00)),
            ],
        );

        let service = LedgerService::new();
        assert!(service.validate_draft(&input, lookup_from(&accounts)).is_ok());
    }

    #[test]
    fn test_post_rejects_unbalanced() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let sales = make_account(company, AccountType::Revenue);
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (sales.id, sales.clone())].into();

        let entries = vec![
            make_entry(bank.id, dec!(100.00), Decimal::ZERO),
            make_entry(sales.id, Decimal::ZERO, dec!(75.00)),
        ];

        let service = LedgerService::new();
        let err = service
            .validate_post(company, "USD", &entries, lookup_from(&accounts))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unbalanced {
                debit: dec!(100.00),
                credit: dec!(75.00),
            }
        );
    }

    #[test]
    fn test_post_returns_totals() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let sales = make_account(company, AccountType::Revenue);
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (sales.id, sales.clone())].into();

        let entries = vec![
            make_entry(bank.id, dec!(500.00), Decimal::ZERO),
            make_entry(sales.id, Decimal::ZERO, dec!(500.00)),
        ];

        let service = LedgerService::new();
        let totals = service
            .validate_post(company, "USD", &entries, lookup_from(&accounts))
            .unwrap();
        assert_eq!(totals.debit, dec!(500.00));
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_rejects_unknown_account() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let accounts: HashMap<_, _> = [(bank.id, bank.clone())].into();

        let ghost = AccountId::new();
        let input = make_input(
            company,
            vec![
                make_entry(bank.id, dec!(100), Decimal::ZERO),
                make_entry(ghost, Decimal::ZERO, dec!(100)),
            ],
        );

        let service = LedgerService::new();
        assert_eq!(
            service.validate_draft(&input, lookup_from(&accounts)),
            Err(LedgerError::AccountNotFound(ghost))
        );
    }

    #[test]
    fn test_rejects_inactive_account() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let mut closed = make_account(company, AccountType::Revenue);
        closed.is_active = false;
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (closed.id, closed.clone())].into();

        let input = make_input(
            company,
            vec![
                make_entry(bank.id, dec!(100), Decimal::ZERO),
                make_entry(closed.id, Decimal::ZERO, dec!(100)),
            ],
        );

        let service = LedgerService::new();
        assert_eq!(
            service.validate_draft(&input, lookup_from(&accounts)),
            Err(LedgerError::AccountInactive(closed.id))
        );
    }

    #[test]
    fn test_rejects_group_account() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let mut group = make_account(company, AccountType::Asset);
        group.is_group = true;
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (group.id, group.clone())].into();

        let input = make_input(
            company,
            vec![
                make_entry(group.id, dec!(100), Decimal::ZERO),
                make_entry(bank.id, Decimal::ZERO, dec!(100)),
            ],
        );

        let service = LedgerService::new();
        assert_eq!(
            service.validate_draft(&input, lookup_from(&accounts)),
            Err(LedgerError::AccountIsGroup(group.id))
        );
    }

    #[test]
    fn test_rejects_foreign_company_account() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let foreign = make_account(CompanyId::new(), AccountType::Revenue);
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (foreign.id, foreign.clone())].into();

        let input = make_input(
            company,
            vec![
                make_entry(bank.id, dec!(100), Decimal::ZERO),
                make_entry(foreign.id, Decimal::ZERO, dec!(100)),
            ],
        );

        let service = LedgerService::new();
        assert_eq!(
            service.validate_draft(&input, lookup_from(&accounts)),
            Err(LedgerError::AccountCompanyMismatch(foreign.id))
        );
    }

    #[test]
    fn test_rejects_currency_mismatch() {
        let company = CompanyId::new();
        let bank = make_account(company, AccountType::Asset);
        let mut euro = make_account(company, AccountType::Revenue);
        euro.currency = "EUR".to_string();
        let accounts: HashMap<_, _> =
            [(bank.id, bank.clone()), (euro.id, euro.clone())].into();

        let input = make_input(
            company,
            vec![
                make_entry(bank.id, dec!(100), Decimal::ZERO),
                make_entry(euro.id, Decimal::ZERO, dec!(100)),
            ],
        );

        let service = LedgerService::new();
        assert_eq!(
            service.validate_draft(&input, lookup_from(&accounts)),
            Err(LedgerError::CurrencyMismatch {
                account_id: euro.id,
                account_currency: "EUR".to_string(),
                voucher_currency: "USD".to_string(),
            })
        );
    }

    #[test]
    fn test_state_transitions() {
        let service = LedgerService::new();
        let id = VoucherId::new();

        assert!(service.validate_can_post(VoucherStatus::Draft, id).is_ok());
        assert_eq!(
            service.validate_can_post(VoucherStatus::Posted, id),
            Err(LedgerError::AlreadyPosted(id))
        );
        assert_eq!(
            service.validate_can_post(VoucherStatus::Cancelled, id),
            Err(LedgerError::AlreadyCancelled(id))
        );

        assert!(service.validate_can_modify(VoucherStatus::Draft, id).is_ok());
        assert_eq!(
            service.validate_can_modify(VoucherStatus::Posted, id),
            Err(LedgerError::CannotModifyPosted(id))
        );
        assert_eq!(
            service.validate_can_modify(VoucherStatus::Cancelled, id),
            Err(LedgerError::CannotModifyCancelled(id))
        );
    }

    #[test]
    fn test_reverse_requires_posted_unreversed() {
        let service = LedgerService::new();
        let id = VoucherId::new();

        assert!(
            service
                .validate_can_reverse(VoucherStatus::Posted, None, id)
                .is_ok()
        );
        assert_eq!(
            service.validate_can_reverse(VoucherStatus::Draft, None, id),
            Err(LedgerError::NotPosted(id))
        );
        assert_eq!(
            service.validate_can_reverse(VoucherStatus::Posted, Some(VoucherId::new()), id),
            Err(LedgerError::AlreadyReversed(id))
        );
    }

    #[test]
    fn test_parent_must_be_group() {
        let service = LedgerService::new();
        let company = CompanyId::new();
        let leaf = make_account(company, AccountType::Asset);
        let child = AccountId::new();

        assert_eq!(
            service.validate_parent(child, &leaf, &[]),
            Err(LedgerError::ParentNotGroup(leaf.id))
        );
    }

    #[test]
    fn test_parent_cycle_detected() {
        let service = LedgerService::new();
        let company = CompanyId::new();
        let mut group = make_account(company, AccountType::Asset);
        group.is_group = true;
        let grandparent = AccountId::new();

        // Direct self-parenting
        assert_eq!(
            service.validate_parent(group.id, &group, &[]),
            Err(LedgerError::ParentCycle(group.id))
        );

        // Account appears in the ancestor chain
        let child = AccountId::new();
        assert_eq!(
            service.validate_parent(child, &group, &[grandparent, child]),
            Err(LedgerError::ParentCycle(child))
        );

        // Clean chain passes
        assert!(service.validate_parent(child, &group, &[grandparent]).is_ok());
    }

    #[test]
    fn test_type_frozen_with_entries() {
        let service = LedgerService::new();
        let id = AccountId::new();

        assert!(
            service
                .validate_type_change(id, AccountType::Asset, AccountType::Asset, true)
                .is_ok()
        );
        assert!(
            service
                .validate_type_change(id, AccountType::Asset, AccountType::Expense, false)
                .is_ok()
        );
        assert_eq!(
            service.validate_type_change(id, AccountType::Asset, AccountType::Expense, true),
            Err(LedgerError::TypeFrozen(id))
        );
    }
}
