use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "sparsekit workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the criterion benches serially and with rayon, then compare
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Only run this bench target
        #[arg(long)]
        bench: Option<String>,
    },
}

const BENCHES: &[&str] = &["id_map_benchmark", "coo_sort_benchmark", "choice_benchmark"];

/// Baseline name and the cargo features it is built with.
const BASELINES: &[(&str, &[&str])] = &[("serial", &[]), ("parallel", &["parallel"])];

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            bench,
        } => {
            if !report_only {
                let targets: Vec<&str> = match bench.as_deref() {
                    Some(name) if BENCHES.contains(&name) => vec![name],
                    Some(name) => bail!("unknown bench '{name}', expected one of {BENCHES:?}"),
                    None => BENCHES.to_vec(),
                };
                run_benchmarks(&targets, quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(targets: &[&str], quick: bool) -> Result<()> {
    for (baseline, features) in BASELINES {
        for target in targets {
            println!("\n>>> {target} [{baseline}]");
            let start = Instant::now();

            let mut cmd = Command::new("cargo");
            cmd.env("CARGO_INCREMENTAL", "0");
            cmd.arg("bench").arg("--bench").arg(target);
            if !features.is_empty() {
                cmd.arg("--features").arg(features.join(","));
            }

            // Args for the test runner (Criterion) go after --
            cmd.arg("--");
            cmd.arg("--save-baseline").arg(baseline);
            if quick {
                cmd.arg("--measurement-time").arg("0.1");
                cmd.arg("--noplot");
                cmd.arg("--sample-size").arg("10");
            }

            let status = cmd
                .status()
                .with_context(|| format!("failed to run {target} [{baseline}]"))?;
            if status.success() {
                println!("Finished {target} [{baseline}] in {:.2?}", start.elapsed());
            } else {
                eprintln!("Warning: {target} [{baseline}] failed");
            }
        }
    }
    Ok(())
}

/// Mean time in nanoseconds, keyed by benchmark id and then by baseline.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("cannot create {}", report_path.display()))?;

    writeln!(file, "# sparsekit Benchmark Report")?;
    writeln!(file)?;
    write!(file, "| Benchmark |")?;
    for (baseline, _) in BASELINES {
        write!(file, " {baseline} |")?;
    }
    writeln!(file, " parallel vs serial |")?;
    write!(file, "|---|")?;
    for _ in BASELINES {
        write!(file, "---|")?;
    }
    writeln!(file, "---|")?;

    for (bench, by_baseline) in &results {
        write!(file, "| {bench} |")?;
        for (baseline, _) in BASELINES {
            match by_baseline.get(*baseline) {
                Some(ns) => write!(file, " {} |", format_time(*ns))?,
                None => write!(file, " N/A |")?,
            }
        }
        match (by_baseline.get("serial"), by_baseline.get("parallel")) {
            (Some(s), Some(p)) if *p > 0.0 => writeln!(file, " **{:.2}x** |", s / p)?,
            _ => writeln!(file, " - |")?,
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_time(ns: f64) -> String {
    if ns >= 1e9 {
        format!("{:.2} s", ns / 1e9)
    } else if ns >= 1e6 {
        format!("{:.2} ms", ns / 1e6)
    } else if ns >= 1e3 {
        format!("{:.2} µs", ns / 1e3)
    } else {
        format!("{ns:.0} ns")
    }
}

// Layout: target/criterion/<group>/<function>[/<param>]/<baseline>/estimates.json
fn collect_results(root: &Path, dir: &Path, results: &mut Results) -> Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "report") {
                continue;
            }
            collect_results(root, &path, results)?;
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else { continue };
        let baseline = baseline_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !BASELINES.iter().any(|(name, _)| *name == baseline) {
            continue;
        }
        let Some(bench_dir) = baseline_dir.parent() else { continue };
        let bench = bench_dir
            .strip_prefix(root)
            .unwrap_or(bench_dir)
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let estimates: Estimates = serde_json::from_str(&content)
            .with_context(|| format!("malformed {}", path.display()))?;
        results
            .entry(bench)
            .or_default()
            .insert(baseline, estimates.mean.point_estimate);
    }
    Ok(())
}
