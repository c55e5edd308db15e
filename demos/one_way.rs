//! One-way ANOVA example for the oneway library.
//!
//! Parses a small yield trial, prints the per-group summary and the ANOVA
//! table, then analyzes every numeric measure at once.
//!
//! Set `RUST_LOG=oneway=debug` to see parser and analysis events.

use oneway::anova::{compute_one_way_anova, compute_one_way_anova_all};
use oneway::dataset::DatasetParser;
use tracing_subscriber::EnvFilter;

const TRIAL: &str = "\
plot;fertilizer;yield;height
1;control;20.1;31
2;control;21.4;29
3;control;19.8;NA
4;control;20.6;30
5;nitrate;23.9;34
6;nitrate;24.6;35
7;nitrate;22.8;33
8;nitrate;;36
9;organic;22.0;32
10;organic;21.1;31
11;organic;22.7;33
12;organic;21.9;30
";

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    println!("oneway - One-way ANOVA Example\n");

    let data = DatasetParser::new()
        .detect_delimiter()
        .parse_str(TRIAL)
        .expect("Failed to parse trial data");

    println!("Rows: {}", data.row_count());
    println!("Numeric columns: {:?}", data.numeric_headers());
    println!("Categorical columns: {:?}", data.categorical_headers());
    println!();

    let result = compute_one_way_anova(&data, "fertilizer", "yield").expect("ANOVA failed");

    println!("Groups ({} rows excluded):", result.excluded_rows);
    println!("  {:<10} {:>3} {:>8} {:>8}", "group", "n", "mean", "sd");
    for (label, g) in &result.groups {
        println!("  {:<10} {:>3} {:>8.3} {:>8.3}", label, g.n, g.mean, g.std_dev);
    }
    println!();

    println!("ANOVA table for yield by fertilizer:");
    println!(
        "  {:<16} {:>10} {:>4} {:>10} {:>8} {:>10}",
        "Source", "SS", "df", "MS", "F", "p"
    );
    for row in result.table() {
        let fmt_opt = |v: Option<f64>, prec: usize| {
            v.map_or_else(String::new, |v| format!("{v:.prec$}"))
        };
        println!(
            "  {:<16} {:>10.4} {:>4} {:>10} {:>8} {:>10}",
            row.source.to_string(),
            row.sum_of_squares,
            row.degrees_of_freedom,
            fmt_opt(row.mean_square, 4),
            fmt_opt(row.f_ratio, 3),
            fmt_opt(row.p_value, 6),
        );
    }
    println!();
    println!("eta squared = {:.3}", result.eta_squared());
    if result.is_significant(0.05) {
        println!("✓ Group means differ at alpha = 0.05");
    } else {
        println!("✗ No significant difference at alpha = 0.05");
    }
    println!();

    println!("All numeric measures by fertilizer:");
    for (measure, outcome) in compute_one_way_anova_all(&data, "fertilizer").expect("Invalid group column") {
        match outcome {
            Ok(r) => println!("  {measure:<8} F = {:>8.3}  p = {:.6}", r.f_stat, r.p_value),
            Err(e) => println!("  {measure:<8} skipped: {e}"),
        }
    }
}
