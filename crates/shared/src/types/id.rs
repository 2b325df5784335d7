//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `VoucherId` where an
//! `AccountId` is expected. Repositories convert to and from the raw
//! `Uuid` at the persistence boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(CompanyId, "Unique identifier for a company.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(VoucherId, "Unique identifier for a voucher.");
typed_id!(VoucherEntryId, "Unique identifier for a voucher entry line.");
typed_id!(
    NumberingSchemeId,
    "Unique identifier for a document numbering scheme."
);
typed_id!(BankStatementId, "Unique identifier for a bank statement.");
typed_id!(
    StatementLineId,
    "Unique identifier for a bank statement line."
);
typed_id!(
    ReconciliationId,
    "Unique identifier for a bank reconciliation snapshot."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = VoucherId::new();
        let b = VoucherId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn v7_ids_are_time_ordered() {
        let earlier = VoucherEntryId::new();
        let later = VoucherEntryId::new();
        assert!(earlier <= later);
    }

    #[test]
    fn display_and_parse_round_trip() {
        let id = AccountId::new();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn uuid_conversions_preserve_value() {
        let raw = Uuid::now_v7();
        let id = CompanyId::from(raw);
        assert_eq!(Uuid::from(id), raw);
        assert_eq!(CompanyId::from_uuid(raw).into_inner(), raw);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<BankStatementId>().is_err());
    }
}
