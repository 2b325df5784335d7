//! Account classification and balance arithmetic.
//!
//! Implements the sign conventions of double-entry bookkeeping: asset and
//! expense accounts are debit-normal (debits increase the balance), while
//! liability, equity and revenue accounts are credit-normal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, bank, receivables).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's stake.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

/// Which side increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalBalance {
    /// Debits increase, credits decrease.
    Debit,
    /// Credits increase, debits decrease.
    Credit,
}

impl AccountType {
    /// The lowercase code stored in the database enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// The normal balance side for this account type.
    #[must_use]
    pub fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Computes the balance change from a debit/credit pair.
    ///
    /// Debit-normal accounts: `debit - credit`.
    /// Credit-normal accounts: `credit - debit`.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_balance() {
            NormalBalance::Debit => debit - credit,
            NormalBalance::Credit => credit - debit,
        }
    }
}

/// Accumulator that rebuilds an account balance from posted movements.
///
/// Used by the recompute path to independently derive what
/// `current_balance` should be, starting from the opening balance.
#[derive(Debug, Clone)]
pub struct RunningBalance {
    account_type: AccountType,
    opening: Decimal,
    debit_total: Decimal,
    credit_total: Decimal,
}

impl RunningBalance {
    /// Starts an accumulation from the account's opening balance.
    #[must_use]
    pub fn new(account_type: AccountType, opening: Decimal) -> Self {
        Self {
            account_type,
            opening,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Folds one posted movement into the running totals.
    pub fn apply(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
    }

    /// The balance after all movements applied so far.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.opening
            + self
                .account_type
                .balance_change(self.debit_total, self.credit_total)
    }

    /// Total debits folded in so far.
    #[must_use]
    pub fn debit_total(&self) -> Decimal {
        self.debit_total
    }

    /// Total credits folded in so far.
    #[must_use]
    pub fn credit_total(&self) -> Decimal {
        self.credit_total
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_normal_balance_sides() {
        assert_eq!(AccountType::Asset.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.normal_balance(), NormalBalance::Debit);
        assert_eq!(
            AccountType::Liability.normal_balance(),
            NormalBalance::Credit
        );
        assert_eq!(AccountType::Equity.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Revenue.normal_balance(), NormalBalance::Credit);
    }

    #[test]
    fn test_balance_change_debit_normal() {
        // Asset: debit increases, credit decreases
        assert_eq!(
            AccountType::Asset.balance_change(dec!(100), Decimal::ZERO),
            dec!(100)
        );
        assert_eq!(
            AccountType::Asset.balance_change(Decimal::ZERO, dec!(40)),
            dec!(-40)
        );
    }

    #[test]
    fn test_balance_change_credit_normal() {
        // Revenue: credit increases, debit decreases
        assert_eq!(
            AccountType::Revenue.balance_change(Decimal::ZERO, dec!(100)),
            dec!(100)
        );
        assert_eq!(
            AccountType::Revenue.balance_change(dec!(40), Decimal::ZERO),
            dec!(-40)
        );
    }

    #[test]
    fn test_running_balance_asset() {
        let mut rb = RunningBalance::new(AccountType::Asset, dec!(1000.00));
        rb.apply(dec!(500.00), Decimal::ZERO);
        rb.apply(Decimal::ZERO, dec!(200.00));
        assert_eq!(rb.balance(), dec!(1300.00));
        assert_eq!(rb.debit_total(), dec!(500.00));
        assert_eq!(rb.credit_total(), dec!(200.00));
    }

    #[test]
    fn test_running_balance_liability() {
        let mut rb = RunningBalance::new(AccountType::Liability, dec!(1000.00));
        rb.apply(Decimal::ZERO, dec!(500.00));
        rb.apply(dec!(200.00), Decimal::ZERO);
        assert_eq!(rb.balance(), dec!(1300.00));
    }

    #[test]
    fn test_running_balance_empty_is_opening() {
        let rb = RunningBalance::new(AccountType::Equity, dec!(42.42));
        assert_eq!(rb.balance(), dec!(42.42));
    }
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        // Amounts up to 10M with 2 decimal places
        (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn account_type_strategy() -> impl Strategy<Value = AccountType> {
        prop_oneof![
            Just(AccountType::Asset),
            Just(AccountType::Liability),
            Just(AccountType::Equity),
            Just(AccountType::Revenue),
            Just(AccountType::Expense),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// *For any* account type, the change from (debit, credit) is the
        /// exact negation of the change from (credit, debit).
        #[test]
        fn prop_balance_change_antisymmetric(
            account_type in account_type_strategy(),
            debit in amount_strategy(),
            credit in amount_strategy(),
        ) {
            let forward = account_type.balance_change(debit, credit);
            let swapped = account_type.balance_change(credit, debit);
            prop_assert_eq!(forward, -swapped);
        }

        /// *For any* movement stream, the running balance equals the opening
        /// balance plus the fold of per-movement changes.
        #[test]
        fn prop_running_balance_matches_fold(
            account_type in account_type_strategy(),
            opening in amount_strategy(),
            movements in prop::collection::vec((amount_strategy(), amount_strategy()), 0..50),
        ) {
            let mut rb = RunningBalance::new(account_type, opening);
            let mut expected = opening;
            for (debit, credit) in &movements {
                rb.apply(*debit, *credit);
                expected += account_type.balance_change(*debit, *credit);
            }
            prop_assert_eq!(rb.balance(), expected);
        }

        /// *For any* debit-normal and credit-normal pair given the same
        /// movement, the changes are negations of each other.
        #[test]
        fn prop_sides_mirror(
            debit in amount_strategy(),
            credit in amount_strategy(),
        ) {
            let asset = AccountType::Asset.balance_change(debit, credit);
            let revenue = AccountType::Revenue.balance_change(debit, credit);
            prop_assert_eq!(asset, -revenue);
        }
    }
}
