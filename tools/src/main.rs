//! report-runner: headless runner for the complaint report pipeline.
//!
//! Usage:
//!   report-runner --input complaints.csv --out ./report
//!   report-runner --input complaints.csv --data-dir ./data --json

use anyhow::{Context, Result};
use crimestat_core::{
    config::ReportConfig,
    pipeline::ReportPipeline,
    render::{render_text_table, BarSeries},
    report::{render_report, CrimeReport},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = arg_value(&args, "--input")
        .context("missing required flag --input <csv>")?;
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let out_dir = PathBuf::from(arg_value(&args, "--out").unwrap_or("./report"));
    let json = args.iter().any(|a| a == "--json");

    let config = ReportConfig::load_or_default(data_dir)?;
    let style = config.render.clone();
    let mut pipeline = ReportPipeline::new(config)?;
    let output = pipeline.run_path(Path::new(input))?;

    for event in pipeline.events() {
        log::debug!("{}: {}", event.type_name(), serde_json::to_string(event)?);
    }

    let charts = render_report(&output.report, &style);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    for chart in &charts {
        let path = out_dir.join(&chart.file_name);
        fs::write(&path, &chart.svg)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    log::info!("wrote {} charts to {}", charts.len(), out_dir.display());

    if json {
        println!("{}", serde_json::to_string_pretty(&output.report)?);
    } else {
        println!("Complaint report");
        println!("  input:     {input}");
        println!("  data_dir:  {data_dir}");
        println!("  out:       {}", out_dir.display());
        println!();
        print_summary(&output.report);
    }
    Ok(())
}

fn print_summary(report: &CrimeReport) {
    let t = &report.totals;
    println!("=== RUN SUMMARY ===");
    println!("  rows loaded:            {}", t.rows_loaded);
    println!("  rows cleaned:           {}", t.rows_cleaned);
    println!("  rows excluded:          {}", t.rows_excluded);
    println!("  end dates substituted:  {}", t.end_dates_substituted);
    println!("  unparsed dates:         {}", t.unparsed_dates);
    println!("  labels canonicalized:   {}", t.labels_canonicalized);
    println!("  sentinels filled:       {}", t.sentinels_filled);
    println!();

    for (_, title, table, _) in report.chart_sections() {
        print!("{}", render_text_table(&BarSeries::new(title, table.series())));
        println!();
    }

    println!("Top offense per year");
    if report.top_offense_per_year.is_empty() {
        println!("  (no dated complaints)");
    }
    for top in &report.top_offense_per_year {
        println!("  {} | {} | {}", top.year, top.offense_desc, top.count);
    }
    println!();

    println!("Most frequent locations");
    for loc in &report.top_locations {
        println!("  ({:.6}, {:.6}) | {}", loc.latitude, loc.longitude, loc.count);
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
