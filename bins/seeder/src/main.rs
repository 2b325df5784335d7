//! Database seeder for Saldo development and testing.
//!
//! Seeds a demo company with a small chart of accounts and the document
//! numbering schemes local development expects. Re-running is safe:
//! every step skips what already exists.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saldo_core::ledger::AccountType;
use saldo_core::numbering::{DateFormat, ResetFrequency};
use saldo_db::entities::{accounts, companies};
use saldo_db::repositories::account::{AccountRepository, CreateAccountInput};
use saldo_db::repositories::company::{CompanyRepository, CreateCompanyInput};
use saldo_db::repositories::numbering::{AllocationError, CreateSchemeInput, NumberingRepository};
use saldo_shared::config::AppConfig;
use saldo_shared::types::{AccountId, CompanyId};

/// Company code of the seeded demo company.
const DEMO_COMPANY_CODE: &str = "DEMO";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saldo=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = saldo_db::connect_with(&config.database).await?;
    info!("Connected to database");

    let company_id = seed_demo_company(&db).await?;
    seed_chart_of_accounts(&db, company_id).await?;
    seed_numbering_schemes(&db, company_id).await?;

    info!("Seeding complete");
    Ok(())
}

/// Creates the demo company, or reuses it when the code is taken.
async fn seed_demo_company(db: &DatabaseConnection) -> anyhow::Result<CompanyId> {
    if let Some(existing) = companies::Entity::find()
        .filter(companies::Column::Code.eq(DEMO_COMPANY_CODE))
        .one(db)
        .await?
    {
        info!(company_id = %existing.id, "Demo company already exists, skipping");
        return Ok(CompanyId::from(existing.id));
    }

    let company = CompanyRepository::new(db.clone())
        .create_company(CreateCompanyInput {
            code: DEMO_COMPANY_CODE.to_string(),
            name: "Demo Trading Co".to_string(),
            default_currency: "USD".to_string(),
        })
        .await?;

    info!(company_id = %company.id, "Created demo company");
    Ok(CompanyId::from(company.id))
}

/// One seeded account: code, name, type and shape.
struct SeedAccount {
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent: Option<AccountId>,
    is_group: bool,
    is_bank_account: bool,
    opening_balance: Decimal,
}

impl SeedAccount {
    fn group(code: &'static str, name: &'static str, account_type: AccountType) -> Self {
        Self {
            code,
            name,
            account_type,
            parent: None,
            is_group: true,
            is_bank_account: false,
            opening_balance: Decimal::ZERO,
        }
    }

    fn leaf(
        code: &'static str,
        name: &'static str,
        account_type: AccountType,
        parent: AccountId,
    ) -> Self {
        Self {
            code,
            name,
            account_type,
            parent: Some(parent),
            is_group: false,
            is_bank_account: false,
            opening_balance: Decimal::ZERO,
        }
    }
}

/// Seeds a minimal chart: asset, revenue and expense groups with the
/// leaves the reconciliation workflow needs (one bank account, one
/// charges account).
async fn seed_chart_of_accounts(
    db: &DatabaseConnection,
    company_id: CompanyId,
) -> anyhow::Result<()> {
    let repo = AccountRepository::new(db.clone());

    let assets = ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::group("1000", "Assets", AccountType::Asset),
    )
    .await?;
    ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount {
            is_bank_account: true,
            opening_balance: dec!(25000.00),
            ..SeedAccount::leaf("1100", "Main Bank Account", AccountType::Asset, assets)
        },
    )
    .await?;
    ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::leaf("1200", "Accounts Receivable", AccountType::Asset, assets),
    )
    .await?;

    let revenue = ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::group("4000", "Revenue", AccountType::Revenue),
    )
    .await?;
    ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::leaf("4100", "Sales Revenue", AccountType::Revenue, revenue),
    )
    .await?;

    let expenses = ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::group("5000", "Expenses", AccountType::Expense),
    )
    .await?;
    ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::leaf("5100", "Office Expenses", AccountType::Expense, expenses),
    )
    .await?;
    ensure_account(
        db,
        &repo,
        company_id,
        SeedAccount::leaf("5900", "Bank Charges", AccountType::Expense, expenses),
    )
    .await?;

    Ok(())
}

/// Creates one account, or reuses it when the code is taken.
async fn ensure_account(
    db: &DatabaseConnection,
    repo: &AccountRepository,
    company_id: CompanyId,
    seed: SeedAccount,
) -> anyhow::Result<AccountId> {
    if let Some(existing) = accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .filter(accounts::Column::Code.eq(seed.code))
        .one(db)
        .await?
    {
        info!(code = seed.code, "Account already exists, skipping");
        return Ok(AccountId::from(existing.id));
    }

    let account = repo
        .create_account(CreateAccountInput {
            company_id,
            code: seed.code.to_string(),
            name: seed.name.to_string(),
            account_type: seed.account_type,
            currency: "USD".to_string(),
            parent_id: seed.parent,
            is_group: seed.is_group,
            is_bank_account: seed.is_bank_account,
            opening_balance: seed.opening_balance,
        })
        .await?;

    info!(code = seed.code, account_id = %account.id, "Created account");
    Ok(AccountId::from(account.id))
}

/// Seeds the document numbering schemes: yearly-resetting journal and
/// sales invoice sequences, and a never-resetting bank charge sequence.
async fn seed_numbering_schemes(
    db: &DatabaseConnection,
    company_id: CompanyId,
) -> anyhow::Result<()> {
    let repo = NumberingRepository::new(db.clone());

    ensure_scheme(
        &repo,
        company_id,
        "journal",
        "JV",
        DateFormat::Year,
        ResetFrequency::Yearly,
    )
    .await?;
    ensure_scheme(
        &repo,
        company_id,
        "sales_invoice",
        "SINV",
        DateFormat::Year,
        ResetFrequency::Yearly,
    )
    .await?;
    ensure_scheme(
        &repo,
        company_id,
        "bank_charge",
        "BC",
        DateFormat::None,
        ResetFrequency::Never,
    )
    .await?;

    Ok(())
}

/// Creates a company-scoped numbering scheme, skipping when one is
/// already active for the document type.
async fn ensure_scheme(
    repo: &NumberingRepository,
    company_id: CompanyId,
    document_type: &str,
    prefix: &str,
    date_format: DateFormat,
    reset_frequency: ResetFrequency,
) -> anyhow::Result<()> {
    let result = repo
        .create_scheme(CreateSchemeInput {
            company_id: Some(company_id),
            document_type: document_type.to_string(),
            prefix: Some(prefix.to_string()),
            suffix: None,
            separator: "-".to_string(),
            date_format,
            padding: 6,
            next_number: 1,
            reset_frequency,
        })
        .await;

    match result {
        Ok(scheme) => {
            info!(document_type, scheme_id = %scheme.id, "Created numbering scheme");
            Ok(())
        }
        Err(AllocationError::DuplicateActiveScheme(_)) => {
            info!(document_type, "Numbering scheme already exists, skipping");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
