//! Company repository for company database operations.
//!
//! Companies are the ownership scope for accounts, vouchers and numbering
//! schemes. This is the setup surface; the ledger repositories assume the
//! company already exists.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use saldo_core::error::ErrorKind;
use saldo_shared::types::CompanyId;

use crate::entities::{companies, currencies};

/// Error types for company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Company code already exists.
    #[error("Company code '{0}' already exists")]
    DuplicateCode(String),

    /// Default currency not found.
    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    /// Company not found.
    #[error("Company not found: {0}")]
    NotFound(CompanyId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CompanyError {
    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateCode(_) => "DUPLICATE_COMPANY_CODE",
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::NotFound(_) => "COMPANY_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateCode(_) => ErrorKind::Validation,
            Self::CurrencyNotFound(_) | Self::NotFound(_) => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the operation can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Company code (globally unique).
    pub code: String,
    /// Company name.
    pub name: String,
    /// Default currency code.
    pub default_currency: String,
}

/// Company repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new company with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Company code already exists
    /// - Default currency does not exist
    /// - Database operation fails
    pub async fn create_company(
        &self,
        input: CreateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        let existing = companies::Entity::find()
            .filter(companies::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(CompanyError::DuplicateCode(input.code));
        }

        let currency = currencies::Entity::find_by_id(&input.default_currency)
            .one(&self.db)
            .await?;

        if currency.is_none() {
            return Err(CompanyError::CurrencyNotFound(input.default_currency));
        }

        let now = chrono::Utc::now().into();
        let company = companies::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            name: Set(input.name),
            default_currency: Set(input.default_currency),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let company = company.insert(&self.db).await?;
        Ok(company)
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the company is not found or the query fails.
    pub async fn find_company(&self, id: CompanyId) -> Result<companies::Model, CompanyError> {
        let company = companies::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotFound(id))?;

        Ok(company)
    }
}
