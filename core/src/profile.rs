//! Descriptive profile document over the joined view.
//!
//! Downstream consumer only: a function from the joined table to a document.
//! The pipeline invokes it when a profile path is configured; normalization
//! and detection never depend on it, so it can be swapped or omitted.

use crate::{error::PipelineResult, join::JoinedTransactionRecord};
use log::info;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const TOP_VALUES: usize = 10;

struct NumericSummary {
    name: &'static str,
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    std: f64,
}

struct CategoricalSummary {
    name: &'static str,
    distinct: usize,
    top: Vec<(String, usize)>,
}

/// Compute per-column descriptive statistics and write a self-contained
/// HTML document to `path`.
pub fn render_profile(records: &[JoinedTransactionRecord], path: &Path) -> PipelineResult<()> {
    let numeric = [
        summarize_numeric("amount", records, |r| r.amount),
        summarize_numeric("inbound_wire_profile_amount", records, |r| {
            r.inbound_wire_profile_amount
        }),
        summarize_numeric("inbound_wire_profile_frequency", records, |r| {
            r.inbound_wire_profile_frequency as f64
        }),
        summarize_numeric("outbound_wire_profile_amount", records, |r| {
            r.outbound_wire_profile_amount
        }),
        summarize_numeric("outbound_wire_profile_frequency", records, |r| {
            r.outbound_wire_profile_frequency as f64
        }),
    ];

    let categorical = [
        summarize_categorical("client_type", records, |r| &r.client_type),
        summarize_categorical("pep_flag", records, |r| &r.pep_flag),
        summarize_categorical("risk_level", records, |r| &r.risk_level),
        summarize_categorical("client_country", records, |r| &r.client_country),
        summarize_categorical("account_type", records, |r| &r.account_type),
        summarize_categorical("account_status", records, |r| &r.account_status),
        summarize_categorical("transaction_type", records, |r| &r.transaction_type),
        summarize_categorical("origin_country", records, |r| &r.origin_country),
        summarize_categorical("destination_country", records, |r| &r.destination_country),
    ];

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html><head><meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Joined transaction view profile</title>")?;
    writeln!(
        out,
        "<style>body{{font-family:sans-serif}}table{{border-collapse:collapse}}\
         td,th{{border:1px solid #999;padding:4px 8px;text-align:right}}\
         th{{background:#eee}}td:first-child,th:first-child{{text-align:left}}</style>"
    )?;
    writeln!(out, "</head><body>")?;
    writeln!(out, "<h1>Joined transaction view profile</h1>")?;
    writeln!(out, "<p>{} records</p>", records.len())?;

    writeln!(out, "<h2>Numeric columns</h2>")?;
    writeln!(
        out,
        "<table><tr><th>column</th><th>count</th><th>min</th><th>max</th><th>mean</th><th>std</th></tr>"
    )?;
    for s in &numeric {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            s.name, s.count, s.min, s.max, s.mean, s.std
        )?;
    }
    writeln!(out, "</table>")?;

    writeln!(out, "<h2>Categorical columns</h2>")?;
    for s in &categorical {
        writeln!(out, "<h3>{} ({} distinct)</h3>", s.name, s.distinct)?;
        writeln!(out, "<table><tr><th>value</th><th>count</th></tr>")?;
        for (value, count) in &s.top {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(value),
                count
            )?;
        }
        writeln!(out, "</table>")?;
    }

    writeln!(out, "</body></html>")?;
    out.flush()?;

    info!("profile document: {}", path.display());
    Ok(())
}

fn summarize_numeric(
    name: &'static str,
    records: &[JoinedTransactionRecord],
    value: impl Fn(&JoinedTransactionRecord) -> f64,
) -> NumericSummary {
    let values: Vec<f64> = records.iter().map(value).collect();
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            name,
            count,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std: 0.0,
        };
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
    NumericSummary {
        name,
        count,
        min,
        max,
        mean,
        std: variance.sqrt(),
    }
}

fn summarize_categorical<'a>(
    name: &'static str,
    records: &'a [JoinedTransactionRecord],
    value: impl Fn(&'a JoinedTransactionRecord) -> &'a str,
) -> CategoricalSummary {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(value(record)).or_default() += 1;
    }
    let distinct = counts.len();
    let mut top: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(v, c)| (v.to_string(), c))
        .collect();
    // Highest count first; ties resolved by value for a stable document.
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(TOP_VALUES);
    CategoricalSummary {
        name,
        distinct,
        top,
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
