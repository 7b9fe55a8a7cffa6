//! Report emission: flagged-record CSV and cluster scatter plots.
//!
//! Pure output stage. Fails only on I/O or rendering errors, which are
//! fatal for the run; nothing is retried.

use crate::{
    dbscan::{feature_vector, FeatureVector},
    error::{PipelineError, PipelineResult},
    join::JoinedTransactionRecord,
    types::{risk_level_display, ClusterId, NOISE},
};
use log::info;
use plotters::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FLAGGED_FILE: &str = "flagged_anomalies.csv";

const PLOT_SIZE: (u32, u32) = (1000, 600);

/// Column order of the flagged CSV: the joined fields, then the label.
const FLAGGED_COLUMNS: [&str; 18] = [
    "client_code",
    "client_type",
    "pep_flag",
    "risk_level",
    "client_country",
    "account_number",
    "account_type",
    "account_status",
    "inbound_wire_profile_amount",
    "inbound_wire_profile_frequency",
    "outbound_wire_profile_amount",
    "outbound_wire_profile_frequency",
    "transaction_date",
    "transaction_type",
    "amount",
    "origin_country",
    "destination_country",
    "cluster",
];

/// The three pairwise views of the feature space: (file, x index, y index,
/// x label, y label).
const SCATTER_VIEWS: [(&str, usize, usize, &str, &str); 3] = [
    ("wires_in_vs_amount.svg", 1, 0, "inbound profile amount", "transaction amount"),
    ("wires_out_vs_amount.svg", 2, 0, "outbound profile amount", "transaction amount"),
    ("wires_in_vs_wires_out.svg", 1, 2, "inbound profile amount", "outbound profile amount"),
];

// ── Flagged CSV ──────────────────────────────────────────────────────────────

/// Write every noise-labeled record to `path`, comma-delimited with a
/// header row. Returns the flagged count.
pub fn write_flagged_csv(
    records: &[JoinedTransactionRecord],
    labels: &[ClusterId],
    path: &Path,
) -> PipelineResult<usize> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", FLAGGED_COLUMNS.join(","))?;

    let mut flagged = 0;
    for (record, &label) in records.iter().zip(labels.iter()) {
        if label != NOISE {
            continue;
        }
        writeln!(out, "{}", flagged_line(record, label))?;
        flagged += 1;
    }
    out.flush()?;

    info!("flagged CSV: {flagged} records -> {}", path.display());
    Ok(flagged)
}

fn flagged_line(r: &JoinedTransactionRecord, label: ClusterId) -> String {
    [
        csv_field(&r.client_code),
        csv_field(&r.client_type),
        csv_field(&r.pep_flag),
        csv_field(&risk_level_display(&r.risk_level)),
        csv_field(&r.client_country),
        csv_field(&r.account_number),
        csv_field(&r.account_type),
        csv_field(&r.account_status),
        r.inbound_wire_profile_amount.to_string(),
        r.inbound_wire_profile_frequency.to_string(),
        r.outbound_wire_profile_amount.to_string(),
        r.outbound_wire_profile_frequency.to_string(),
        csv_field(&r.transaction_date),
        csv_field(&r.transaction_type),
        r.amount.to_string(),
        csv_field(&r.origin_country),
        csv_field(&r.destination_country),
        label.to_string(),
    ]
    .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ── Scatter plots ────────────────────────────────────────────────────────────

/// Render the three pairwise scatter plots into `out_dir`, one point per
/// record, colored by cluster label. Returns the artifact paths.
pub fn render_scatter_plots(
    records: &[JoinedTransactionRecord],
    labels: &[ClusterId],
    out_dir: &Path,
) -> PipelineResult<Vec<PathBuf>> {
    let features: Vec<FeatureVector> = records.iter().map(feature_vector).collect();

    let mut paths = Vec::with_capacity(SCATTER_VIEWS.len());
    for (name, x, y, x_desc, y_desc) in SCATTER_VIEWS {
        let path = out_dir.join(name);
        draw_scatter(&features, labels, &path, x, y, x_desc, y_desc).map_err(|e| {
            PipelineError::Render {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        info!("scatter plot: {}", path.display());
        paths.push(path);
    }
    Ok(paths)
}

fn draw_scatter(
    features: &[FeatureVector],
    labels: &[ClusterId],
    path: &Path,
    x: usize,
    y: usize,
    x_desc: &str,
    y_desc: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded_range(features.iter().map(|f| f[x]));
    let (y_min, y_max) = padded_range(features.iter().map(|f| f[y]));

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{y_desc} vs {x_desc} (DBSCAN)"), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(features.iter().zip(labels.iter()).map(|(f, &label)| {
        Circle::new((f[x], f[y]), 4, label_color(label).filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Noise is drawn red; clusters cycle through the palette.
fn label_color(label: ClusterId) -> RGBAColor {
    if label == NOISE {
        RED.to_rgba()
    } else {
        Palette99::pick(label as usize).to_rgba()
    }
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    // Degenerate single-value axes still need a drawable span.
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}
