//! screen-runner: headless batch runner for the wire screening pipeline.
//!
//! Usage:
//!   screen-runner --clients media/CLIENTES.csv --products media/PRODUCTO.csv \
//!                 --transactions media/TRANSACCIONES.csv --db wire_screen.db \
//!                 --out-dir out
//!   screen-runner --config pipeline.json --eps 0.5 --min-pts 5

use anyhow::Result;
use std::env;
use wirescreen_core::{config::PipelineConfig, pipeline};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config = match find_arg(&args, "--config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(v) = find_arg(&args, "--clients") {
        config.clients_path = v.to_string();
    }
    if let Some(v) = find_arg(&args, "--products") {
        config.products_path = v.to_string();
    }
    if let Some(v) = find_arg(&args, "--transactions") {
        config.transactions_path = v.to_string();
    }
    if let Some(v) = find_arg(&args, "--db") {
        config.db_path = v.to_string();
    }
    if let Some(v) = find_arg(&args, "--out-dir") {
        config.output_dir = v.to_string();
    }
    if let Some(v) = find_arg(&args, "--profile") {
        config.profile_path = Some(v.to_string());
    }
    config.detection.eps = parse_arg(&args, "--eps", config.detection.eps);
    config.detection.min_pts = parse_arg(&args, "--min-pts", config.detection.min_pts);

    log::info!(
        "screening run: {} / {} / {} -> {}",
        config.clients_path,
        config.products_path,
        config.transactions_path,
        config.db_path
    );

    let summary = pipeline::run(&config)?;

    if let Some(path) = find_arg(&args, "--summary-json") {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
    }

    println!("=== RUN SUMMARY ===");
    println!("  clients:       {}", summary.clients_loaded);
    println!("  products:      {}", summary.products_loaded);
    println!("  transactions:  {}", summary.transactions_loaded);
    println!("  joined rows:   {}", summary.joined_rows);
    println!("  clusters:      {}", summary.clusters);
    println!("  flagged:       {}", summary.flagged);
    println!("  flagged csv:   {}", summary.flagged_csv);
    for plot in &summary.plots {
        println!("  plot:          {plot}");
    }
    if let Some(profile) = &summary.profile {
        println!("  profile:       {profile}");
    }

    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
