//! Performance benchmarks for the workforce engine.
//!
//! Covers the hot paths:
//! - Single payroll calculation
//! - Payroll calculation through the HTTP router
//! - Trial run scoring for growing exams
//! - Import planning for growing payroll files
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::collections::HashSet;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use workforce_engine::api::{AppState, create_router};
use workforce_engine::calculation::{calculate_payroll, score_trial_run};
use workforce_engine::config::{ConfigLoader, PayrollConfig};
use workforce_engine::import::{ImportProfile, PayrollImport, Sheet, plan_import};
use workforce_engine::models::{PayrollInputs, Question, SalaryProfile};

use axum::{body::Body, http::Request};
use rust_decimal::Decimal;
use tower::ServiceExt;

fn salary_profile() -> SalaryProfile {
    serde_json::from_value(serde_json::json!({
        "employee_code": "NV0001",
        "base_salary": "7500000",
        "insurance_salary": "5000000",
        "responsibility_per_day": "50000",
        "allowances": { "meal": "730000", "phone": "200000", "hazardous": "150000" }
    }))
    .expect("Failed to build salary profile")
}

fn full_month_inputs() -> PayrollInputs {
    PayrollInputs {
        regular_hours: Some(Decimal::new(200, 0)),
        weekday_overtime_hours: Some(Decimal::new(125, 1)),
        weekend_overtime_hours: Some(Decimal::new(8, 0)),
        night_overtime_hours: Some(Decimal::new(6, 0)),
        responsible_days: Some(Decimal::new(5, 0)),
        union_fee: Some(Decimal::new(50_000, 0)),
        advance: Some(Decimal::new(1_000_000, 0)),
        ..Default::default()
    }
}

fn questions(count: u32) -> Vec<Question> {
    (1..=count)
        .map(|order| Question {
            display_order: order,
            content: format!("Question {}", order),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct_option: ["A", "B", "C", "D"][(order % 4) as usize].to_string(),
            critical: order % 5 == 0,
        })
        .collect()
}

fn answer_string(count: u32) -> String {
    (1..=count)
        .map(|order| format!("{}.{}", order, ["A", "B", "C", "D"][(order % 3) as usize]))
        .collect::<Vec<_>>()
        .join("-")
}

/// A payroll import with `rows` rows, every tenth one a duplicate.
fn payroll_csv(rows: usize) -> String {
    let mut csv = String::from("Mã NV,Năm,Tháng,Giờ công,Tăng ca ngày thường,Tạm ứng\n");
    for i in 0..rows {
        let employee = if i % 10 == 9 { i - 1 } else { i };
        csv.push_str(&format!(
            "NV{:05},2024,3,{},{},\"1,000,000\"\n",
            employee,
            160 + i % 40,
            i % 12
        ));
    }
    csv
}

/// Benchmark: Single payroll calculation.
///
/// Target: < 50μs mean
fn bench_single_payroll(c: &mut Criterion) {
    let salary = salary_profile();
    let inputs = full_month_inputs();
    let config = PayrollConfig::default();

    c.bench_function("single_payroll", |b| {
        b.iter(|| {
            black_box(calculate_payroll(
                black_box(&salary),
                black_box(&inputs),
                &config,
            ))
        })
    });
}

/// Benchmark: Payroll calculation through the router.
///
/// Target: < 200μs mean
fn bench_calculate_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let router = create_router(AppState::new(config));
    let body = serde_json::json!({
        "salary": salary_profile(),
        "inputs": full_month_inputs()
    })
    .to_string();

    c.bench_function("calculate_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/payroll/calculate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: Trial run scoring for exams of growing size.
fn bench_trial_run_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("trial_run_scoring");

    for count in [10u32, 50, 200].iter() {
        let questions = questions(*count);
        let answers = answer_string(*count);

        group.throughput(Throughput::Elements(u64::from(*count)));
        group.bench_with_input(BenchmarkId::new("questions", count), count, |b, _| {
            b.iter(|| black_box(score_trial_run(black_box(&answers), &questions)))
        });
    }

    group.finish();
}

/// Benchmark: Planning payroll imports of growing size.
///
/// Target: 20,000 rows < 100ms mean
fn bench_import_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_planning");
    group.sample_size(20);

    for rows in [100usize, 1_000, 20_000].iter() {
        let csv = payroll_csv(*rows);
        let employees: HashSet<String> = (0..*rows).map(|i| format!("NV{:05}", i)).collect();
        let profile = PayrollImport::new(employees);
        let existing = HashSet::new();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), rows, |b, _| {
            b.iter(|| {
                let sheet = Sheet::parse(black_box(&csv), profile.columns()).unwrap();
                black_box(plan_import(&profile, &sheet, &existing))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_payroll,
    bench_calculate_endpoint,
    bench_trial_run_scoring,
    bench_import_planning,
);
criterion_main!(benches);
