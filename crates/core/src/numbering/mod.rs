//! Document numbering: formatted, gap-free sequence allocation.
//!
//! The pure half of the allocator lives here: reset-policy evaluation and
//! number formatting against an in-memory scheme snapshot. Locking and
//! persistence belong to the repository layer.

pub mod allocator;
pub mod error;
pub mod format;
pub mod types;

#[cfg(test)]
mod allocator_props;

pub use allocator::resolve_allocation;
pub use error::{validate_scheme_config, NumberingError};
pub use format::{fallback_number, format_number};
pub use types::{DateFormat, ResetFrequency, ResolvedAllocation, SchemeSnapshot};
