//! Source normalization: three raw extracts into canonical records.
//!
//! Each extract arrives with its own known malformation:
//!   - client registry: space-delimited, but two risk categories contain a
//!     literal space ("MEDIO ALTO"), colliding with the delimiter
//!   - product registry: comma-delimited, otherwise well formed
//!   - transaction ledger: tab-delimited, with stray single quotes in four
//!     text fields (export artifact)
//!
//! Normalization repairs these defects, then assigns canonical column names
//! positionally. The first line of every extract is a header and is skipped.
//! A preview of the first rows is logged per extract for triage; nothing
//! downstream depends on it.

use crate::{
    error::{PipelineError, PipelineResult},
    types::{repair_risk_levels, AccountNumber, ClientCode},
};
use log::info;
use std::fmt::Debug;
use std::fs;
use std::path::Path;

// ── Canonical arities ────────────────────────────────────────────────────────

pub const CLIENT_ARITY: usize = 6;
pub const PRODUCT_ARITY: usize = 8;
pub const TRANSACTION_ARITY: usize = 6;

const PREVIEW_ROWS: usize = 5;

// ── Canonical records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub code: ClientCode,
    pub client_type: String,
    pub last_update_date: String,
    pub pep_flag: String,
    /// Normalized vocabulary: never contains embedded whitespace.
    pub risk_level: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub client_code: ClientCode,
    pub account_number: AccountNumber,
    pub account_type: String,
    pub account_status: String,
    pub inbound_wire_profile_amount: f64,
    pub inbound_wire_profile_frequency: i64,
    pub outbound_wire_profile_amount: f64,
    pub outbound_wire_profile_frequency: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Stripped of stray quote characters.
    pub account_number: AccountNumber,
    pub transaction_date: String,
    pub transaction_type: String,
    pub amount: f64,
    pub origin_country: String,
    pub destination_country: String,
}

// ── Client registry ──────────────────────────────────────────────────────────

/// Parse the client extract. The two-word risk categories are rewritten to
/// single-token form over the whole text before splitting, so the file's own
/// space delimiter stays unambiguous.
pub fn normalize_clients(path: &Path) -> PipelineResult<Vec<ClientRecord>> {
    let file = path.display().to_string();
    let raw = fs::read_to_string(path)?;
    let repaired = repair_risk_levels(&raw);

    let mut records = Vec::new();
    for (idx, line) in repaired.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != CLIENT_ARITY {
            return Err(PipelineError::MalformedRecord {
                file: file.clone(),
                line: idx + 1,
                detail: format!("expected {CLIENT_ARITY} fields, got {}", fields.len()),
            });
        }
        records.push(ClientRecord {
            code: fields[0].to_string(),
            client_type: fields[1].to_string(),
            last_update_date: fields[2].to_string(),
            pep_flag: fields[3].to_string(),
            risk_level: fields[4].to_string(),
            country: fields[5].to_string(),
        });
    }

    log_preview("clients", &file, &records);
    Ok(records)
}

// ── Product registry ─────────────────────────────────────────────────────────

/// Parse the product extract. Comma-delimited; the wire-profile thresholds
/// and frequencies must be numeric.
pub fn normalize_products(path: &Path) -> PipelineResult<Vec<ProductRecord>> {
    let file = path.display().to_string();
    let raw = fs::read_to_string(path)?;

    let mut records = Vec::new();
    for (idx, line) in raw.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != PRODUCT_ARITY {
            return Err(PipelineError::SchemaMismatch {
                file: file.clone(),
                expected: PRODUCT_ARITY,
                actual: fields.len(),
            });
        }
        records.push(ProductRecord {
            client_code: fields[0].trim().to_string(),
            account_number: fields[1].trim().to_string(),
            account_type: fields[2].trim().to_string(),
            account_status: fields[3].trim().to_string(),
            inbound_wire_profile_amount: parse_f64(&file, idx + 1, "inbound_wire_profile_amount", fields[4])?,
            inbound_wire_profile_frequency: parse_i64(&file, idx + 1, "inbound_wire_profile_frequency", fields[5])?,
            outbound_wire_profile_amount: parse_f64(&file, idx + 1, "outbound_wire_profile_amount", fields[6])?,
            outbound_wire_profile_frequency: parse_i64(&file, idx + 1, "outbound_wire_profile_frequency", fields[7])?,
        });
    }

    log_preview("products", &file, &records);
    Ok(records)
}

// ── Transaction ledger ───────────────────────────────────────────────────────

/// Parse the transaction extract. Tab-delimited; the four text fields carry
/// embedded single quotes from the source export, stripped here.
pub fn normalize_transactions(path: &Path) -> PipelineResult<Vec<TransactionRecord>> {
    let file = path.display().to_string();
    let raw = fs::read_to_string(path)?;

    let mut records = Vec::new();
    for (idx, line) in raw.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != TRANSACTION_ARITY {
            return Err(PipelineError::SchemaMismatch {
                file: file.clone(),
                expected: TRANSACTION_ARITY,
                actual: fields.len(),
            });
        }
        records.push(TransactionRecord {
            account_number: strip_quotes(fields[0]),
            transaction_date: fields[1].trim().to_string(),
            transaction_type: strip_quotes(fields[2]),
            amount: parse_f64(&file, idx + 1, "amount", fields[3])?,
            origin_country: strip_quotes(fields[4]),
            destination_country: strip_quotes(fields[5]),
        });
    }

    log_preview("transactions", &file, &records);
    Ok(records)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn strip_quotes(field: &str) -> String {
    field.trim().replace('\'', "")
}

fn parse_f64(file: &str, line: usize, column: &str, value: &str) -> PipelineResult<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| PipelineError::MalformedRecord {
            file: file.to_string(),
            line,
            detail: format!("invalid {column} value '{}'", value.trim()),
        })
}

fn parse_i64(file: &str, line: usize, column: &str, value: &str) -> PipelineResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| PipelineError::MalformedRecord {
            file: file.to_string(),
            line,
            detail: format!("invalid {column} value '{}'", value.trim()),
        })
}

fn log_preview<T: Debug>(table: &str, file: &str, records: &[T]) {
    info!("{table}: normalized {} rows from {file}", records.len());
    for record in records.iter().take(PREVIEW_ROWS) {
        info!("  {record:?}");
    }
}
