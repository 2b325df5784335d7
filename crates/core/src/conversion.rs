//! Quantity conversion rules for document lines.
//!
//! A closed set of tagged rule variants, never dynamic expression
//! evaluation. Results are rounded half-to-even at the target precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors from applying a conversion rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// Factor must be strictly positive.
    #[error("Conversion factor must be positive, got {0}")]
    NonPositiveFactor(Decimal),

    /// Density must be strictly positive.
    #[error("Density must be positive, got {0}")]
    NonPositiveDensity(Decimal),
}

impl ConversionError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveFactor(_) => "NON_POSITIVE_FACTOR",
            Self::NonPositiveDensity(_) => "NON_POSITIVE_DENSITY",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// A unit or rate conversion between document quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ConversionRule {
    /// Simple multiplier, e.g. boxes to pieces.
    Factor {
        /// Units of target per unit of source.
        factor: Decimal,
    },
    /// Volume to mass (or back with the reciprocal).
    Density {
        /// Mass per unit volume.
        density: Decimal,
    },
    /// Parametrized linear map, e.g. temperature scales.
    Affine {
        /// Multiplier.
        factor: Decimal,
        /// Additive offset, applied after the multiplication.
        offset: Decimal,
    },
}

impl ConversionRule {
    /// Applies the rule to `quantity`, rounding half-to-even at
    /// `decimal_places`.
    ///
    /// # Errors
    ///
    /// Returns an error when the factor or density is not strictly
    /// positive.
    pub fn apply(
        &self,
        quantity: Decimal,
        decimal_places: u32,
    ) -> Result<Decimal, ConversionError> {
        let raw = match self {
            Self::Factor { factor } => {
                if *factor <= Decimal::ZERO {
                    return Err(ConversionError::NonPositiveFactor(*factor));
                }
                quantity * factor
            }
            Self::Density { density } => {
                if *density <= Decimal::ZERO {
                    return Err(ConversionError::NonPositiveDensity(*density));
                }
                quantity * density
            }
            Self::Affine { factor, offset } => {
                if *factor <= Decimal::ZERO {
                    return Err(ConversionError::NonPositiveFactor(*factor));
                }
                quantity * factor + offset
            }
        };
        Ok(raw.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven))
    }
}
