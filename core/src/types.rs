//! Shared primitive types used across the entire pipeline.

/// Canonical client identifier from the client registry extract.
pub type ClientCode = String;

/// Canonical account identifier linking products to transactions.
pub type AccountNumber = String;

/// Cluster label assigned by the anomaly detector.
pub type ClusterId = i64;

/// Label for points not density-reachable from any core point.
/// Records carrying this label are the anomaly signal.
pub const NOISE: ClusterId = -1;

/// Risk categories whose raw two-word form collides with the client
/// extract's space-delimited layout. Stored single-token, displayed two-word.
const RISK_REWRITES: [(&str, &str); 2] = [
    ("MEDIO ALTO", "MEDIO_ALTO"),
    ("MEDIO BAJO", "MEDIO_BAJO"),
];

/// Rewrite every literal two-word risk category into its single-token form.
/// Applied to the whole extract text before any field splitting.
pub fn repair_risk_levels(text: &str) -> String {
    let mut repaired = text.to_string();
    for (raw, token) in RISK_REWRITES {
        repaired = repaired.replace(raw, token);
    }
    repaired
}

/// Map a stored risk level back to its display form. Single-word
/// categories pass through unchanged; the mapping is bijective with
/// `repair_risk_levels` over the known vocabulary.
pub fn risk_level_display(level: &str) -> String {
    for (raw, token) in RISK_REWRITES {
        if level == token {
            return raw.to_string();
        }
    }
    level.to_string()
}
