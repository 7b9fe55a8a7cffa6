//! End-to-end batch orchestration.
//!
//! Stage order: normalize -> load -> join -> detect -> report. Each stage
//! fully completes and materializes its output before the next begins; there
//! is no streaming across stages. The store connection is scoped to the
//! load-and-query phase and released on every exit path, including failure.
//!
//! Every error is fatal: a run either produces a fully normalized store and
//! a complete anomaly report, or nothing beyond the store's own transaction
//! guarantees. Overlapping runs against the same database are not defended
//! here; callers serialize runs.

use crate::{
    config::PipelineConfig,
    dbscan,
    error::PipelineResult,
    join, normalize, profile, report,
    store::ScreenStore,
};
use log::info;
use serde::Serialize;
use std::path::Path;

/// What a completed run produced. Exists only on full success.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub clients_loaded: usize,
    pub products_loaded: usize,
    pub transactions_loaded: usize,
    pub joined_rows: usize,
    pub clusters: usize,
    pub flagged: usize,
    pub flagged_csv: String,
    pub plots: Vec<String>,
    pub profile: Option<String>,
}

pub fn run(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    info!("normalizing source extracts");
    let clients = normalize::normalize_clients(Path::new(&config.clients_path))?;
    let products = normalize::normalize_products(Path::new(&config.products_path))?;
    let transactions = normalize::normalize_transactions(Path::new(&config.transactions_path))?;

    let (clients_loaded, products_loaded, transactions_loaded, joined) = {
        let mut store = ScreenStore::open(&config.db_path)?;
        store.create_schema_if_absent()?;

        info!("replace-loading canonical tables into {}", config.db_path);
        let clients_loaded = store.load_clients(&clients)?;
        let products_loaded = store.load_products(&products)?;
        let transactions_loaded = store.load_transactions(&transactions)?;

        let joined = join::build_joined_view(&store)?;
        (clients_loaded, products_loaded, transactions_loaded, joined)
        // Store connection released here on every exit path.
    };

    let labels = dbscan::detect(&joined, config.detection.eps, config.detection.min_pts);
    let clusters = dbscan::cluster_count(&labels);

    let out_dir = Path::new(&config.output_dir);
    std::fs::create_dir_all(out_dir)?;

    let flagged_csv = out_dir.join(report::FLAGGED_FILE);
    let flagged = report::write_flagged_csv(&joined, &labels, &flagged_csv)?;
    let plots = report::render_scatter_plots(&joined, &labels, out_dir)?;

    let profile = match &config.profile_path {
        Some(path) => {
            profile::render_profile(&joined, Path::new(path))?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(RunSummary {
        clients_loaded,
        products_loaded,
        transactions_loaded,
        joined_rows: joined.len(),
        clusters,
        flagged,
        flagged_csv: flagged_csv.display().to_string(),
        plots: plots.iter().map(|p| p.display().to_string()).collect(),
        profile,
    })
}
