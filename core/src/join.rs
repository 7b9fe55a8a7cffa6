//! Join view builder: one denormalized record per transaction.
//!
//! Inner-join semantics are the completeness invariant: every row in the
//! view carries a fully resolved client and account. A transaction whose
//! account has no product, or whose product has no client, is dropped
//! silently; only a store-level query failure is an error.

use crate::{
    error::{PipelineError, PipelineResult},
    store::ScreenStore,
    types::{AccountNumber, ClientCode},
};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use serde::Serialize;

/// Every transaction field, plus the account's wire-profile thresholds and
/// metadata, plus the client's risk attributes. Output ordering is
/// unspecified; downstream stages never depend on it.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedTransactionRecord {
    pub client_code: ClientCode,
    pub client_type: String,
    pub pep_flag: String,
    pub risk_level: String,
    pub client_country: String,
    pub account_number: AccountNumber,
    pub account_type: String,
    pub account_status: String,
    pub inbound_wire_profile_amount: f64,
    pub inbound_wire_profile_frequency: i64,
    pub outbound_wire_profile_amount: f64,
    pub outbound_wire_profile_frequency: i64,
    pub transaction_date: String,
    pub transaction_type: String,
    pub amount: f64,
    pub origin_country: String,
    pub destination_country: String,
}

/// Execute the three-way join and materialize the view. Timestamps are
/// truncated to calendar dates on the way out.
pub fn build_joined_view(store: &ScreenStore) -> PipelineResult<Vec<JoinedTransactionRecord>> {
    let mut rows = store
        .joined_transactions()
        .map_err(|e| PipelineError::JoinIntegrity {
            detail: e.to_string(),
        })?;

    for row in &mut rows {
        row.transaction_date = truncate_to_date(&row.transaction_date);
    }

    info!("joined view: {} rows", rows.len());
    Ok(rows)
}

/// Datetime strings lose their time component; date strings pass through;
/// anything unparseable is left verbatim. Normalization is not a date
/// validator.
fn truncate_to_date(raw: &str) -> String {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.date().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}
