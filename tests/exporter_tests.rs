// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use loanbook::models::{InterestType, RateSource, Rates};
use loanbook::{cli, commands::exporter, db, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::tempdir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let user = store::create_user(&mut conn, "Ana", "ana@example.com").unwrap();
    store::set_current_user(&conn, Some(user.id)).unwrap();
    store::insert_loan(
        &mut conn,
        user.id,
        &store::NewLoan {
            customer_name: "Sipho".to_string(),
            principal: dec!(500),
            rate_source: RateSource::Global,
            entered_rates: Rates::new(dec!(50), dec!(30)),
            start_date: ymd(2025, 3, 1),
            interest_type: InterestType::Simple,
            notes: "Taxi fare".to_string(),
        },
    )
    .unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "loanbook", "export", "loans", "--format", format, "--out", out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        if let Some(("loans", loans_m)) = export_m.subcommand() {
            return exporter::export_loans(conn, loans_m, ymd(2025, 5, 5));
        }
    }
    panic!("no export subcommand");
}

#[test]
fn export_loans_writes_pretty_json_with_accrual() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, "json", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let id = parsed[0]["id"].as_i64().unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": id,
                "customer": "Sipho",
                "startDate": "2025-03-01",
                "status": "ACTIVE",
                "interestType": "SIMPLE",
                "isFixedRate": true,
                "principal": "500",
                "effectiveInitialRate": "50",
                "effectiveMonthlyRate": "30",
                "monthsElapsed": 2,
                "interestAccrued": "700.00",
                "totalAmount": "1200.00",
                "notes": "Taxi fare"
            }
        ])
    );
}

#[test]
fn export_loans_writes_csv() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, "CSV", &out_str).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[1], "customer");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Sipho");
    assert_eq!(&rows[0][5], "global");
    assert_eq!(&rows[0][9], "2");
    assert_eq!(&rows[0][11], "1200.00");
}

#[test]
fn export_rounds_amounts_to_cents() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let user = store::create_user(&mut conn, "Ben", "ben@example.com").unwrap();
    store::set_current_user(&conn, Some(user.id)).unwrap();
    let rates = Rates::new(dec!(0), dec!(12.345));
    store::insert_loan(
        &mut conn,
        user.id,
        &store::NewLoan {
            customer_name: "Lerato".to_string(),
            principal: dec!(1000),
            rate_source: RateSource::Custom(rates),
            entered_rates: rates,
            start_date: ymd(2025, 3, 1),
            interest_type: InterestType::Compound,
            notes: String::new(),
        },
    )
    .unwrap();
    let dir = tempdir().unwrap();

    // 1000 * 1.12345^2 = 1262.1399025
    let json_path = dir.path().join("export.json");
    export(&conn, "json", &json_path.to_string_lossy()).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["interestAccrued"], "262.14");
    assert_eq!(parsed[0]["totalAmount"], "1262.14");

    let csv_path = dir.path().join("export.csv");
    export(&conn, "csv", &csv_path.to_string_lossy()).unwrap();
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let row = rdr.records().next().unwrap().unwrap();
    assert_eq!(&row[10], "262.14");
    assert_eq!(&row[11], "1262.14");
}

#[test]
fn export_loans_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(export(&conn, "xml", &out_str).is_err());
    assert!(!out_path.exists());
}
