//! Initial database migration.
//!
//! Creates all core tables, enums, triggers, and seed data for the voucher
//! ledger: companies, currencies, accounts, vouchers, voucher entries,
//! numbering schemes, and the bank reconciliation tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: EXTENSIONS & ENUMS
        // ============================================================
        db.execute_unprepared(EXTENSIONS_SQL).await?;
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE DATA TABLES
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(COMPANIES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: VOUCHERS & ENTRIES
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: DOCUMENT NUMBERING
        // ============================================================
        db.execute_unprepared(NUMBERING_SCHEMES_SQL).await?;

        // ============================================================
        // PART 6: BANK RECONCILIATION
        // ============================================================
        db.execute_unprepared(BANK_STATEMENTS_SQL).await?;
        db.execute_unprepared(BANK_STATEMENT_LINES_SQL).await?;
        db.execute_unprepared(BANK_RECONCILIATIONS_SQL).await?;

        // ============================================================
        // PART 7: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 8: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_CURRENCIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const EXTENSIONS_SQL: &str = r"
CREATE EXTENSION IF NOT EXISTS pgcrypto;
";

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Voucher lifecycle
CREATE TYPE voucher_status AS ENUM ('draft', 'posted', 'cancelled');

-- Voucher document categories
CREATE TYPE voucher_type AS ENUM (
    'journal',
    'sales_invoice',
    'purchase_invoice',
    'cash_receipt',
    'cash_payment',
    'transfer',
    'adjustment',
    'opening_balance',
    'bank_charge',
    'reversal'
);

-- Numbering date segment layout
CREATE TYPE date_format AS ENUM (
    'none',
    'year',
    'year_month',
    'year_month_day'
);

-- Numbering counter reset cadence
CREATE TYPE reset_frequency AS ENUM ('never', 'yearly', 'monthly', 'daily');
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    code CHAR(3) PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    decimal_places SMALLINT NOT NULL DEFAULT 2
);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    default_currency CHAR(3) NOT NULL REFERENCES currencies(code),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    currency CHAR(3) NOT NULL REFERENCES currencies(code),
    parent_id UUID REFERENCES accounts(id),
    is_group BOOLEAN NOT NULL DEFAULT false,
    is_bank_account BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id) WHERE is_active = true;
CREATE INDEX idx_accounts_type ON accounts(company_id, account_type);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
CREATE INDEX idx_accounts_bank ON accounts(company_id) WHERE is_bank_account = true;
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    voucher_number VARCHAR(100) NOT NULL,
    voucher_type voucher_type NOT NULL,
    voucher_date DATE NOT NULL,
    status voucher_status NOT NULL DEFAULT 'draft',
    currency CHAR(3) NOT NULL REFERENCES currencies(code),
    description TEXT,
    total_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    posted_at TIMESTAMPTZ,
    cancelled_at TIMESTAMPTZ,
    reverses_voucher_id UUID REFERENCES vouchers(id),
    reversed_by_voucher_id UUID REFERENCES vouchers(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, voucher_number)
);

CREATE INDEX idx_vouchers_company_date ON vouchers(company_id, voucher_date);
CREATE INDEX idx_vouchers_company_status ON vouchers(company_id, status);
CREATE INDEX idx_vouchers_type ON vouchers(company_id, voucher_type);
";

const VOUCHER_ENTRIES_SQL: &str = r"
CREATE TABLE voucher_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    voucher_id UUID NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description VARCHAR(500),
    cost_center VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_debit_or_credit CHECK (
        (debit > 0 AND credit = 0) OR (debit = 0 AND credit > 0)
    ),
    UNIQUE (voucher_id, line_number)
);

CREATE INDEX idx_entries_voucher ON voucher_entries(voucher_id);
CREATE INDEX idx_entries_account ON voucher_entries(account_id);
";

const NUMBERING_SCHEMES_SQL: &str = r"
CREATE TABLE numbering_schemes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID REFERENCES companies(id) ON DELETE CASCADE,
    document_type VARCHAR(50) NOT NULL,
    prefix VARCHAR(20),
    suffix VARCHAR(20),
    separator VARCHAR(5) NOT NULL DEFAULT '-',
    date_format date_format NOT NULL DEFAULT 'none',
    padding SMALLINT NOT NULL DEFAULT 4,
    next_number BIGINT NOT NULL DEFAULT 1,
    reset_frequency reset_frequency NOT NULL DEFAULT 'never',
    last_reset_date DATE,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_padding_range CHECK (padding BETWEEN 1 AND 10),
    CONSTRAINT chk_next_number_positive CHECK (next_number >= 1)
);

-- At most one active scheme per scope. Two partial indexes because
-- NULL company_id rows never collide in a plain unique index.
CREATE UNIQUE INDEX idx_schemes_active_company
    ON numbering_schemes(document_type, company_id)
    WHERE is_active = true AND company_id IS NOT NULL;
CREATE UNIQUE INDEX idx_schemes_active_global
    ON numbering_schemes(document_type)
    WHERE is_active = true AND company_id IS NULL;
";

const BANK_STATEMENTS_SQL: &str = r"
CREATE TABLE bank_statements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    bank_account_id UUID NOT NULL REFERENCES accounts(id),
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    opening_balance NUMERIC(19, 4) NOT NULL,
    closing_balance NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_statement_period CHECK (period_start <= period_end)
);

CREATE INDEX idx_statements_company ON bank_statements(company_id);
CREATE INDEX idx_statements_account ON bank_statements(bank_account_id, period_end);
";

const BANK_STATEMENT_LINES_SQL: &str = r"
CREATE TABLE bank_statement_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    statement_id UUID NOT NULL REFERENCES bank_statements(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    line_date DATE NOT NULL,
    description VARCHAR(500) NOT NULL,
    reference VARCHAR(100),
    amount NUMERIC(19, 4) NOT NULL,
    running_balance NUMERIC(19, 4) NOT NULL,
    is_reconciled BOOLEAN NOT NULL DEFAULT false,
    matched_entry_id UUID REFERENCES voucher_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (statement_id, line_number)
);

CREATE INDEX idx_lines_statement ON bank_statement_lines(statement_id);
CREATE INDEX idx_lines_unmatched ON bank_statement_lines(statement_id, line_date)
    WHERE is_reconciled = false;

-- A ledger entry can back at most one statement line. The partial unique
-- index is the atomic claim: the second matcher hits a unique violation.
CREATE UNIQUE INDEX idx_lines_matched_entry ON bank_statement_lines(matched_entry_id)
    WHERE matched_entry_id IS NOT NULL;
";

const BANK_RECONCILIATIONS_SQL: &str = r"
CREATE TABLE bank_reconciliations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    bank_account_id UUID NOT NULL REFERENCES accounts(id),
    statement_id UUID NOT NULL REFERENCES bank_statements(id),
    reconciliation_date DATE NOT NULL,
    statement_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    ledger_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    outstanding_payments NUMERIC(19, 4) NOT NULL DEFAULT 0,
    deposits_in_transit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    difference NUMERIC(19, 4) NOT NULL DEFAULT 0,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_reconciliations_company ON bank_reconciliations(company_id, reconciliation_date);
CREATE INDEX idx_reconciliations_statement ON bank_reconciliations(statement_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_voucher_balance
-- Ensures double-entry balance (debit = credit) when a voucher
-- reaches posted status. Deferred to commit so all entry rows of
-- the posting transaction are visible.
-- ============================================================
CREATE OR REPLACE FUNCTION check_voucher_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
BEGIN
    SELECT
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0)
    INTO total_debit, total_credit
    FROM voucher_entries
    WHERE voucher_id = NEW.id;

    IF total_debit <> total_credit THEN
        RAISE EXCEPTION 'Voucher is not balanced. Debit: %, Credit: %',
            total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_voucher_balance
AFTER UPDATE OF status ON vouchers
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
WHEN (NEW.status = 'posted')
EXECUTE FUNCTION check_voucher_balance();

-- ============================================================
-- FUNCTION: prevent_posted_modification
-- Posted vouchers are immutable except for stamping the
-- reversed_by_voucher_id link. Cancelled vouchers are frozen.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'cancelled' THEN
        RAISE EXCEPTION 'Cannot modify cancelled voucher.';
    END IF;

    IF OLD.status = 'posted' AND (
        NEW.status <> OLD.status
        OR NEW.voucher_number <> OLD.voucher_number
        OR NEW.voucher_type <> OLD.voucher_type
        OR NEW.voucher_date <> OLD.voucher_date
        OR NEW.currency <> OLD.currency
        OR NEW.total_amount <> OLD.total_amount
        OR NEW.description IS DISTINCT FROM OLD.description
        OR NEW.reverses_voucher_id IS DISTINCT FROM OLD.reverses_voucher_id
        OR NEW.posted_at IS DISTINCT FROM OLD.posted_at
    ) THEN
        RAISE EXCEPTION 'Cannot modify posted voucher. Create a reversing voucher instead.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_mod
BEFORE UPDATE ON vouchers
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_modification();

-- ============================================================
-- FUNCTION: prevent_posted_entry_modification
-- Entry rows of a posted voucher can never change or disappear.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_entry_modification()
RETURNS TRIGGER AS $$
DECLARE
    v_status voucher_status;
BEGIN
    IF TG_OP = 'DELETE' THEN
        SELECT status INTO v_status FROM vouchers WHERE id = OLD.voucher_id;
        IF v_status = 'posted' THEN
            RAISE EXCEPTION 'Cannot delete entries of a posted voucher.';
        END IF;
        RETURN OLD;
    END IF;

    SELECT status INTO v_status FROM vouchers WHERE id = NEW.voucher_id;
    IF v_status = 'posted' THEN
        RAISE EXCEPTION 'Cannot modify entries of a posted voucher.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_entry_mod
BEFORE INSERT OR UPDATE OR DELETE ON voucher_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_entry_modification();
";

const SEED_CURRENCIES_SQL: &str = r"
-- ============================================================
-- SEED: Common currencies
-- ============================================================
INSERT INTO currencies (code, name, decimal_places) VALUES
('USD', 'US Dollar', 2),
('EUR', 'Euro', 2),
('IDR', 'Indonesian Rupiah', 0),
('SGD', 'Singapore Dollar', 2),
('JPY', 'Japanese Yen', 0)
ON CONFLICT (code) DO NOTHING;
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_posted_entry_mod ON voucher_entries;
DROP TRIGGER IF EXISTS trg_prevent_posted_mod ON vouchers;
DROP TRIGGER IF EXISTS trg_check_voucher_balance ON vouchers;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_posted_entry_modification();
DROP FUNCTION IF EXISTS prevent_posted_modification();
DROP FUNCTION IF EXISTS check_voucher_balance();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS bank_reconciliations CASCADE;
DROP TABLE IF EXISTS bank_statement_lines CASCADE;
DROP TABLE IF EXISTS bank_statements CASCADE;
DROP TABLE IF EXISTS numbering_schemes CASCADE;
DROP TABLE IF EXISTS voucher_entries CASCADE;
DROP TABLE IF EXISTS vouchers CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS companies CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;

-- Drop enums
DROP TYPE IF EXISTS reset_frequency CASCADE;
DROP TYPE IF EXISTS date_format CASCADE;
DROP TYPE IF EXISTS voucher_type CASCADE;
DROP TYPE IF EXISTS voucher_status CASCADE;
DROP TYPE IF EXISTS account_type CASCADE;
";
