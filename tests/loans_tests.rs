// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use loanbook::models::{LoanStatus, RateConfig, RateSource, Rates};
use loanbook::{cli, commands::loans, db, store};
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> (Connection, i64) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let user = store::create_user(&mut conn, "Ana", "ana@example.com").unwrap();
    store::set_current_user(&conn, Some(user.id)).unwrap();
    (conn, user.id)
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["loanbook", "loan"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("loan", loan_m)) = matches.subcommand() {
        loans::handle(conn, loan_m)
    } else {
        panic!("loan command not parsed");
    }
}

fn views(conn: &Connection, args: &[&str], as_of: NaiveDate) -> Vec<loans::LoanView> {
    let mut argv = vec!["loanbook", "loan", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("loan", loan_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = loan_m.subcommand() {
            return loans::loan_views(conn, list_m, as_of).unwrap();
        }
    }
    panic!("loan list not parsed");
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn add_defaults_to_global_compound_loan() {
    let (mut conn, user_id) = setup();
    run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "500", "--date", "2025-03-01"],
    )
    .unwrap();

    let records = store::load_loans(&conn, user_id).unwrap();
    assert_eq!(records.len(), 1);
    let loan = &records[0].loan;
    assert_eq!(records[0].customer, "Sipho");
    assert_eq!(loan.principal, dec!(500));
    assert_eq!(loan.rate_source, RateSource::Global);
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.start_date, ymd(2025, 3, 1));

    let v = views(&conn, &[], ymd(2025, 5, 5));
    assert_eq!(v[0].months_elapsed, 2);
    assert_eq!(v[0].total_amount, dec!(1267.50));
    assert_eq!(v[0].interest_accrued, dec!(767.50));
    assert_eq!(v[0].rate_source, "global");
}

#[test]
fn global_loans_pick_up_new_settings_on_every_read() {
    let (mut conn, user_id) = setup();
    run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "500", "--date", "2025-03-01"],
    )
    .unwrap();
    let as_of = ymd(2025, 4, 5);
    assert_eq!(views(&conn, &[], as_of)[0].total_amount, dec!(975));

    store::save_rate_config(
        &conn,
        user_id,
        &RateConfig {
            global_initial_interest_rate: dec!(10),
            global_interest_rate: dec!(5),
            global_compound_monthly: true,
        },
    )
    .unwrap();
    let v = views(&conn, &[], as_of);
    assert_eq!(v[0].total_amount, dec!(577.5));
    assert_eq!(v[0].effective_initial_rate, dec!(10));
    assert_eq!(v[0].effective_monthly_rate, dec!(5));
}

#[test]
fn stored_rates_of_fixed_loans_are_ignored() {
    let (mut conn, user_id) = setup();
    run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "500", "--date", "2025-03-01"],
    )
    .unwrap();
    conn.execute(
        "UPDATE loans SET initial_interest_rate='999', interest_rate='999'",
        [],
    )
    .unwrap();
    let records = store::load_loans(&conn, user_id).unwrap();
    assert_eq!(records[0].loan.rate_source, RateSource::Global);
    assert_eq!(views(&conn, &[], ymd(2025, 3, 1))[0].total_amount, dec!(750));
}

#[test]
fn custom_rate_loan_keeps_its_own_rates() {
    let (mut conn, user_id) = setup();
    run(
        &mut conn,
        &[
            "add",
            "--customer",
            "Lerato",
            "--principal",
            "1000",
            "--initial-rate",
            "20",
            "--monthly-rate",
            "10",
            "--type",
            "SIMPLE",
            "--custom-rate",
            "--date",
            "2025-01-01",
        ],
    )
    .unwrap();
    let records = store::load_loans(&conn, user_id).unwrap();
    assert_eq!(
        records[0].loan.rate_source,
        RateSource::Custom(Rates::new(dec!(20), dec!(10)))
    );

    store::save_rate_config(
        &conn,
        user_id,
        &RateConfig {
            global_initial_interest_rate: dec!(0),
            global_interest_rate: dec!(0),
            global_compound_monthly: false,
        },
    )
    .unwrap();
    // 1200 * (1 + 0.10 * 3)
    let v = views(&conn, &[], ymd(2025, 4, 5));
    assert_eq!(v[0].months_elapsed, 3);
    assert_eq!(v[0].total_amount, dec!(1560));
    assert_eq!(v[0].rate_source, "custom");
}

#[test]
fn explicit_rates_make_a_custom_rate_loan() {
    let (mut conn, user_id) = setup();
    run(
        &mut conn,
        &[
            "add",
            "--customer",
            "Thabo",
            "--principal",
            "500",
            "--initial-rate",
            "0",
            "--monthly-rate",
            "0",
            "--date",
            "2025-01-01",
        ],
    )
    .unwrap();

    let records = store::load_loans(&conn, user_id).unwrap();
    assert_eq!(
        records[0].loan.rate_source,
        RateSource::Custom(Rates::new(dec!(0), dec!(0)))
    );
    let stored: (String, String) = conn
        .query_row(
            "SELECT initial_interest_rate, interest_rate FROM loans",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored, ("0".to_string(), "0".to_string()));
    assert_eq!(views(&conn, &[], ymd(2025, 4, 5))[0].total_amount, dec!(500));
}

#[test]
fn global_loan_stores_the_rates_in_force() {
    let (mut conn, _) = setup();
    run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "500", "--date", "2025-03-01"],
    )
    .unwrap();
    let stored: (String, String) = conn
        .query_row(
            "SELECT initial_interest_rate, interest_rate FROM loans",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored, ("50".to_string(), "30".to_string()));
}

#[test]
fn customers_are_matched_case_insensitively() {
    let (mut conn, user_id) = setup();
    for name in ["Sipho", "  sipho ", "SIPHO", "Lerato"] {
        run(&mut conn, &["add", "--customer", name, "--principal", "100"]).unwrap();
    }
    let customers = store::list_customers(&conn, user_id).unwrap();
    assert_eq!(customers.len(), 2);
    let sipho = customers.iter().find(|c| c.name == "Sipho").unwrap();
    assert_eq!(sipho.active_loans, 3);
}

#[test]
fn add_rejects_invalid_input() {
    let (mut conn, user_id) = setup();
    let err = run(&mut conn, &["add", "--customer", "Sipho", "--principal", "0"]).unwrap_err();
    assert_eq!(err.to_string(), "Principal must be greater than zero");
    let err = run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "10", "--date", "2025-02-30"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid date '2025-02-30'"));
    let err = run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "10", "--monthly-rate", "1001"],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Monthly interest rate must be between 0 and 1000");
    let err = run(&mut conn, &["add", "--customer", "   ", "--principal", "10"]).unwrap_err();
    assert!(err.to_string().contains("Customer name"));
    let err = run(
        &mut conn,
        &["add", "--customer", "Sipho", "--principal", "10", "--type", "weekly"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown interest type"));

    assert!(store::load_loans(&conn, user_id).unwrap().is_empty());
}

#[test]
fn list_hides_closed_loans_unless_all() {
    let (mut conn, user_id) = setup();
    run(&mut conn, &["add", "--customer", "Sipho", "--principal", "100"]).unwrap();
    run(&mut conn, &["add", "--customer", "Lerato", "--principal", "200"]).unwrap();
    let lerato_id = store::load_loans(&conn, user_id)
        .unwrap()
        .into_iter()
        .find(|r| r.customer == "Lerato")
        .unwrap()
        .loan
        .id;

    run(&mut conn, &["status", "--id", &lerato_id.to_string(), "paid"]).unwrap();

    let today = chrono::Utc::now().date_naive();
    let active = views(&conn, &[], today);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].customer, "Sipho");

    let all = views(&conn, &["--all"], today);
    assert_eq!(all.len(), 2);
    let paid = all.iter().find(|v| v.id == lerato_id).unwrap();
    assert_eq!(paid.status, LoanStatus::Paid);
}

#[test]
fn list_search_matches_customer_or_date() {
    let (mut conn, _) = setup();
    run(
        &mut conn,
        &["add", "--customer", "Sipho Dlamini", "--principal", "100", "--date", "2025-03-14"],
    )
    .unwrap();
    run(
        &mut conn,
        &["add", "--customer", "Lerato", "--principal", "200", "--date", "2025-06-01"],
    )
    .unwrap();
    let as_of = ymd(2025, 7, 1);

    let by_name = views(&conn, &["--search", "dlam"], as_of);
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].customer, "Sipho Dlamini");

    let by_date = views(&conn, &["--search", "2025-06"], as_of);
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].customer, "Lerato");

    let by_long_date = views(&conn, &["--search", "14 mar"], as_of);
    assert_eq!(by_long_date.len(), 1);

    assert!(views(&conn, &["--search", "nobody"], as_of).is_empty());
}

#[test]
fn status_and_rm_report_unknown_loans() {
    let (mut conn, user_id) = setup();
    let err = run(&mut conn, &["status", "--id", "42", "paid"]).unwrap_err();
    assert_eq!(err.to_string(), "Loan not found");
    let err = run(&mut conn, &["rm", "--id", "42"]).unwrap_err();
    assert_eq!(err.to_string(), "Loan not found");
    let err = run(&mut conn, &["status", "--id", "1", "closed"]).unwrap_err();
    assert!(err.to_string().contains("Unknown loan status"));

    run(&mut conn, &["add", "--customer", "Sipho", "--principal", "100"]).unwrap();
    let id = store::load_loans(&conn, user_id).unwrap()[0].loan.id;
    run(&mut conn, &["rm", "--id", &format!(" {} ", id)]).unwrap();
    assert!(store::load_loans(&conn, user_id).unwrap().is_empty());
}

#[test]
fn loans_are_scoped_to_their_owner() {
    let (mut conn, ana) = setup();
    run(&mut conn, &["add", "--customer", "Sipho", "--principal", "100"]).unwrap();
    let loan_id = store::load_loans(&conn, ana).unwrap()[0].loan.id;

    let ben = store::create_user(&mut conn, "Ben", "ben@example.com").unwrap();
    store::set_current_user(&conn, Some(ben.id)).unwrap();
    assert!(views(&conn, &["--all"], ymd(2025, 1, 1)).is_empty());
    let err = run(&mut conn, &["rm", "--id", &loan_id.to_string()]).unwrap_err();
    assert_eq!(err.to_string(), "Loan not found");
    assert_eq!(store::load_loans(&conn, ana).unwrap().len(), 1);
}
