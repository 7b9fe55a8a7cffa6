//! Source normalizer tests: risk-category repair, quote stripping, and the
//! arity failure modes.

use std::fs;
use std::path::PathBuf;
use wirescreen_core::{
    error::PipelineError,
    normalize::{normalize_clients, normalize_products, normalize_transactions},
    types::{repair_risk_levels, risk_level_display},
};

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("wirescreen-norm-{}-{}", std::process::id(), name));
    fs::write(&path, content).expect("write scratch file");
    path
}

const CLIENT_HEADER: &str = "CODIGO TIPO_CLIENTE FECHA_ACTUALIZACION PEP RIESGO PAIS";
const PRODUCT_HEADER: &str = "CODIGO,CUENTA,TIPO_CUENTA,ESTADO_CUENTA,PERFIL_WIRES_IN_MONTO,PERFIL_WIRES_IN_FRECUENCIA,PERFIL_WIRES_OUT_MONTO,PERFIL_WIRES_OUT_FRECUENCIA";
const TRANSACTION_HEADER: &str = "CUENTA\tFECHA_TRANSACCION\tTIPO_TRANSACCION\tMONTO\tPAIS_ORIGEN_TRANSACCION\tPAIS_DESTINO_TRANSACCION";

#[test]
fn two_word_risk_categories_become_single_tokens() {
    let path = scratch_file(
        "clients-repair.txt",
        &format!(
            "{CLIENT_HEADER}\n\
             C1 NATURAL 2023-01-15 N MEDIO ALTO PA\n\
             C2 JURIDICO 2023-02-20 S ALTO CO\n\
             C3 NATURAL 2023-03-01 N MEDIO BAJO PA\n"
        ),
    );

    let clients = normalize_clients(&path).expect("normalize clients");
    assert_eq!(clients.len(), 3);
    assert_eq!(clients[0].risk_level, "MEDIO_ALTO");
    assert_eq!(clients[1].risk_level, "ALTO");
    assert_eq!(clients[2].risk_level, "MEDIO_BAJO");
    for client in &clients {
        assert!(
            !client.risk_level.contains(char::is_whitespace),
            "risk level contains whitespace: {}",
            client.risk_level
        );
    }
    let _ = fs::remove_file(path);
}

#[test]
fn risk_level_round_trip_is_bijective() {
    for (token, display) in [("MEDIO_ALTO", "MEDIO ALTO"), ("MEDIO_BAJO", "MEDIO BAJO")] {
        assert_eq!(risk_level_display(token), display);
        assert_eq!(repair_risk_levels(display), token);
    }
    // Single-word categories pass through both directions.
    assert_eq!(risk_level_display("ALTO"), "ALTO");
    assert_eq!(repair_risk_levels("BAJO"), "BAJO");
}

#[test]
fn client_row_with_wrong_field_count_is_malformed() {
    let path = scratch_file(
        "clients-bad-arity.txt",
        &format!("{CLIENT_HEADER}\nC4 NATURAL 2023-01-01 N ALTO\n"),
    );

    let err = normalize_clients(&path).expect_err("short row must fail");
    match err {
        PipelineError::MalformedRecord { line, .. } => {
            assert_eq!(line, 2, "failure should name the offending line");
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
    let _ = fs::remove_file(path);
}

#[test]
fn transaction_text_fields_are_quote_stripped() {
    let path = scratch_file(
        "txn-quotes.tsv",
        &format!(
            "{TRANSACTION_HEADER}\n\
             'A1'\t2023-02-01 09:00:00\t'WIRE_IN'\t250.0\t'US'\t'PA'\n"
        ),
    );

    let txns = normalize_transactions(&path).expect("normalize transactions");
    assert_eq!(txns.len(), 1);
    let t = &txns[0];
    assert_eq!(t.account_number, "A1");
    assert_eq!(t.transaction_type, "WIRE_IN");
    assert_eq!(t.origin_country, "US");
    assert_eq!(t.destination_country, "PA");
    for field in [
        &t.account_number,
        &t.transaction_type,
        &t.origin_country,
        &t.destination_country,
    ] {
        assert!(!field.contains('\''), "quote survived in {field}");
    }
    assert_eq!(t.amount, 250.0);
    let _ = fs::remove_file(path);
}

#[test]
fn transaction_wrong_column_count_is_schema_mismatch() {
    let path = scratch_file(
        "txn-bad-arity.tsv",
        &format!("{TRANSACTION_HEADER}\n'A1'\t2023-02-01\t'WIRE_IN'\t250.0\t'US'\n"),
    );

    let err = normalize_transactions(&path).expect_err("short row must fail");
    match err {
        PipelineError::SchemaMismatch { expected, actual, .. } => {
            assert_eq!(expected, 6);
            assert_eq!(actual, 5);
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
    let _ = fs::remove_file(path);
}

#[test]
fn product_wrong_column_count_is_schema_mismatch() {
    let path = scratch_file(
        "product-bad-arity.csv",
        &format!("{PRODUCT_HEADER}\nC1,A1,AHORRO,ACTIVA,1000,4,1000\n"),
    );

    let err = normalize_products(&path).expect_err("short row must fail");
    match err {
        PipelineError::SchemaMismatch { expected, actual, .. } => {
            assert_eq!(expected, 8);
            assert_eq!(actual, 7);
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
    let _ = fs::remove_file(path);
}

#[test]
fn product_non_numeric_threshold_is_malformed() {
    let path = scratch_file(
        "product-bad-number.csv",
        &format!("{PRODUCT_HEADER}\nC1,A1,AHORRO,ACTIVA,abc,4,1000,4\n"),
    );

    let err = normalize_products(&path).expect_err("non-numeric threshold must fail");
    match err {
        PipelineError::MalformedRecord { line, detail, .. } => {
            assert_eq!(line, 2);
            assert!(
                detail.contains("inbound_wire_profile_amount"),
                "detail should name the column: {detail}"
            );
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
    let _ = fs::remove_file(path);
}

#[test]
fn transaction_non_numeric_amount_is_malformed() {
    let path = scratch_file(
        "txn-bad-amount.tsv",
        &format!("{TRANSACTION_HEADER}\n'A1'\t2023-02-01\t'WIRE_IN'\tnope\t'US'\t'PA'\n"),
    );

    let err = normalize_transactions(&path).expect_err("non-numeric amount must fail");
    assert!(
        matches!(err, PipelineError::MalformedRecord { .. }),
        "expected MalformedRecord, got {err:?}"
    );
    let _ = fs::remove_file(path);
}

#[test]
fn header_only_extracts_normalize_to_empty() {
    let clients = scratch_file("clients-empty.txt", &format!("{CLIENT_HEADER}\n"));
    let products = scratch_file("products-empty.csv", &format!("{PRODUCT_HEADER}\n"));
    let txns = scratch_file("txn-empty.tsv", &format!("{TRANSACTION_HEADER}\n"));

    assert!(normalize_clients(&clients).expect("clients").is_empty());
    assert!(normalize_products(&products).expect("products").is_empty());
    assert!(normalize_transactions(&txns).expect("transactions").is_empty());

    for path in [clients, products, txns] {
        let _ = fs::remove_file(path);
    }
}

#[test]
fn product_numeric_fields_are_parsed() {
    let path = scratch_file(
        "product-numeric.csv",
        &format!("{PRODUCT_HEADER}\nC1,A1,AHORRO,ACTIVA,1500.5,4,2000,6\n"),
    );

    let products = normalize_products(&path).expect("normalize products");
    assert_eq!(products.len(), 1);
    let p = &products[0];
    assert_eq!(p.inbound_wire_profile_amount, 1500.5);
    assert_eq!(p.inbound_wire_profile_frequency, 4);
    assert_eq!(p.outbound_wire_profile_amount, 2000.0);
    assert_eq!(p.outbound_wire_profile_frequency, 6);
    let _ = fs::remove_file(path);
}
