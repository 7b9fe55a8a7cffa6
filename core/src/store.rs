//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The normalizer hands canonical rows in, the join builder reads rows out;
//! neither executes SQL directly.
//!
//! Load semantics are full snapshot replace: each run's normalized tables
//! fully supersede prior persisted content. A replace runs inside a single
//! transaction, so partial historical data never lingers after a failed load.

use crate::{
    error::PipelineResult,
    join::JoinedTransactionRecord,
    normalize::{ClientRecord, ProductRecord, TransactionRecord},
};
use rusqlite::{params, Connection};

const CLIENTS_DDL: &str = "CREATE TABLE IF NOT EXISTS clients (
    code             TEXT,
    client_type      TEXT,
    last_update_date TEXT,
    pep_flag         TEXT,
    risk_level       TEXT,
    country          TEXT
)";

const PRODUCTS_DDL: &str = "CREATE TABLE IF NOT EXISTS products (
    client_code                     TEXT,
    account_number                  TEXT,
    account_type                    TEXT,
    account_status                  TEXT,
    inbound_wire_profile_amount     REAL,
    inbound_wire_profile_frequency  INTEGER,
    outbound_wire_profile_amount    REAL,
    outbound_wire_profile_frequency INTEGER
)";

const TRANSACTIONS_DDL: &str = "CREATE TABLE IF NOT EXISTS transactions (
    account_number      TEXT,
    transaction_date    TEXT,
    transaction_type    TEXT,
    amount              REAL,
    origin_country      TEXT,
    destination_country TEXT
)";

/// The fixed three-way inner join behind the denormalized transaction view.
/// Rows without a matching product or client are excluded by construction.
const JOINED_VIEW_SQL: &str = "SELECT
    c.code,
    c.client_type,
    c.pep_flag,
    c.risk_level,
    c.country,
    p.account_number,
    p.account_type,
    p.account_status,
    p.inbound_wire_profile_amount,
    p.inbound_wire_profile_frequency,
    p.outbound_wire_profile_amount,
    p.outbound_wire_profile_frequency,
    t.transaction_date,
    t.transaction_type,
    t.amount,
    t.origin_country,
    t.destination_country
 FROM clients c
 INNER JOIN products p ON c.code = p.client_code
 INNER JOIN transactions t ON p.account_number = t.account_number";

pub struct ScreenStore {
    conn: Connection,
}

impl ScreenStore {
    /// Open (or create) the screening database at `path`.
    pub fn open(path: &str) -> PipelineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only applies to real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Idempotently create the three canonical tables if missing.
    pub fn create_schema_if_absent(&self) -> PipelineResult<()> {
        self.conn.execute_batch(CLIENTS_DDL)?;
        self.conn.execute_batch(PRODUCTS_DDL)?;
        self.conn.execute_batch(TRANSACTIONS_DDL)?;
        Ok(())
    }

    // ── Replace-on-load ───────────────────────────────────────────

    /// Atomically replace the entire contents of `clients`.
    pub fn load_clients(&mut self, rows: &[ClientRecord]) -> PipelineResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS clients", [])?;
        tx.execute(CLIENTS_DDL, [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO clients (code, client_type, last_update_date, pep_flag, risk_level, country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in rows {
                stmt.execute(params![
                    r.code,
                    r.client_type,
                    r.last_update_date,
                    r.pep_flag,
                    r.risk_level,
                    r.country,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Atomically replace the entire contents of `products`.
    pub fn load_products(&mut self, rows: &[ProductRecord]) -> PipelineResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS products", [])?;
        tx.execute(PRODUCTS_DDL, [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO products (client_code, account_number, account_type, account_status,
                                       inbound_wire_profile_amount, inbound_wire_profile_frequency,
                                       outbound_wire_profile_amount, outbound_wire_profile_frequency)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in rows {
                stmt.execute(params![
                    r.client_code,
                    r.account_number,
                    r.account_type,
                    r.account_status,
                    r.inbound_wire_profile_amount,
                    r.inbound_wire_profile_frequency,
                    r.outbound_wire_profile_amount,
                    r.outbound_wire_profile_frequency,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Atomically replace the entire contents of `transactions`.
    pub fn load_transactions(&mut self, rows: &[TransactionRecord]) -> PipelineResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DROP TABLE IF EXISTS transactions", [])?;
        tx.execute(TRANSACTIONS_DDL, [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (account_number, transaction_date, transaction_type,
                                           amount, origin_country, destination_country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in rows {
                stmt.execute(params![
                    r.account_number,
                    r.transaction_date,
                    r.transaction_type,
                    r.amount,
                    r.origin_country,
                    r.destination_country,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    // ── Read side ─────────────────────────────────────────────────

    /// Execute the fixed three-way join and materialize one record per
    /// transaction. Dates come back exactly as stored; truncation happens
    /// in the join builder.
    pub fn joined_transactions(&self) -> PipelineResult<Vec<JoinedTransactionRecord>> {
        let mut stmt = self.conn.prepare(JOINED_VIEW_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(JoinedTransactionRecord {
                client_code: row.get(0)?,
                client_type: row.get(1)?,
                pep_flag: row.get(2)?,
                risk_level: row.get(3)?,
                client_country: row.get(4)?,
                account_number: row.get(5)?,
                account_type: row.get(6)?,
                account_status: row.get(7)?,
                inbound_wire_profile_amount: row.get(8)?,
                inbound_wire_profile_frequency: row.get(9)?,
                outbound_wire_profile_amount: row.get(10)?,
                outbound_wire_profile_frequency: row.get(11)?,
                transaction_date: row.get(12)?,
                transaction_type: row.get(13)?,
                amount: row.get(14)?,
                origin_country: row.get(15)?,
                destination_country: row.get(16)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn client_count(&self) -> PipelineResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn product_count(&self) -> PipelineResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn transaction_count(&self) -> PipelineResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}
