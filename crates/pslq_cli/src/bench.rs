//! Planted Relation Benchmark
//!
//! Builds inputs x₁ < … < xₙ₋₁ drawn from [1, 2) and appends xₙ = Σ cᵢxᵢ
//! with random positive cᵢ, then checks that PSLQ recovers (c₁, …, cₙ₋₁, −1)
//! up to sign.

use num_bigint::BigInt;
use pslq_core::{Pslq, PslqConfig, PslqOutcome, PslqStats, TracingSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Aggregated results for one input dimension
#[derive(Debug, Clone)]
pub struct PlantedBenchResult {
    pub n: usize,
    pub trials: usize,
    pub recovered: usize,
    /// Found a relation, but not the planted one
    pub other: usize,
    pub missed: usize,
    pub mean_iterations: f64,
    pub max_iterations: usize,
    pub mean_ms: f64,
    pub max_ms: f64,
}

impl PlantedBenchResult {
    pub fn recovery_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.recovered as f64 / self.trials as f64
        }
    }
}

/// One planted instance: ascending values and the relation they satisfy
///
/// Coefficients are drawn from 1..=max_coefficient; bounds below 1 act as 1.
pub fn planted_instance(rng: &mut StdRng, n: usize, max_coefficient: i64) -> (Vec<f64>, Vec<BigInt>) {
    let max_coefficient = max_coefficient.max(1);
    let mut values: Vec<f64> = (0..n - 1).map(|_| rng.gen_range(1.0..2.0)).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let coefficients: Vec<i64> = (0..n - 1).map(|_| rng.gen_range(1..=max_coefficient)).collect();

    let last: f64 = values.iter().zip(&coefficients).map(|(v, &c)| v * c as f64).sum();
    values.push(last);

    let mut planted: Vec<BigInt> = coefficients.into_iter().map(BigInt::from).collect();
    planted.push(BigInt::from(-1));
    (values, planted)
}

/// Run `trials` instances at one dimension
pub fn bench_dimension(
    rng: &mut StdRng,
    n: usize,
    trials: usize,
    max_coefficient: i64,
    config: &PslqConfig,
) -> PlantedBenchResult {
    let mut result = PlantedBenchResult {
        n,
        trials,
        recovered: 0,
        other: 0,
        missed: 0,
        mean_iterations: 0.0,
        max_iterations: 0,
        mean_ms: 0.0,
        max_ms: 0.0,
    };
    let mut pslq = Pslq::with_sink(config.clone(), TracingSink);

    for _ in 0..trials {
        let (values, planted) = planted_instance(rng, n, max_coefficient);
        let (outcome, stats) = match pslq.run(&values) {
            Ok(run) => run,
            Err(e) => {
                // Duplicate draws fail the ascending check
                tracing::warn!(n, error = %e, "skipping planted instance");
                result.missed += 1;
                continue;
            }
        };
        record(&mut result, &outcome, &stats, &planted);
    }

    let done = result.trials.max(1) as f64;
    result.mean_iterations /= done;
    result.mean_ms /= done;
    result
}

fn record(
    result: &mut PlantedBenchResult,
    outcome: &PslqOutcome<f64>,
    stats: &PslqStats,
    planted: &[BigInt],
) {
    let ms = stats.total_time * 1000.0;
    result.mean_iterations += stats.iterations as f64;
    result.max_iterations = result.max_iterations.max(stats.iterations);
    result.mean_ms += ms;
    result.max_ms = result.max_ms.max(ms);

    match outcome.relation() {
        Some(relation) if relation.normalized().coefficients() == planted => result.recovered += 1,
        Some(_) => result.other += 1,
        None => result.missed += 1,
    }
}

/// Run the planted-relation benchmark for n = 3..=max_dim
pub fn run_planted_benchmark(
    max_dim: usize,
    trials: usize,
    max_coefficient: i64,
    seed: u64,
    export: Option<PathBuf>,
) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              PSLQ Planted Relation Benchmark                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Dimensions 3..={}, {} trials each, coefficients in 1..={}, seed {}",
        max_dim, trials, max_coefficient, seed
    );
    println!();

    let mut rng = StdRng::seed_from_u64(seed);
    let config = PslqConfig::default();
    let mut results = Vec::new();

    println!("┌──────┬──────────┬──────────┬──────────┬────────────┬────────────┬────────────┐");
    println!("│  n   │ Recovered│  Other   │  Missed  │ Mean iters │  Mean (ms) │  Max (ms)  │");
    println!("├──────┼──────────┼──────────┼──────────┼────────────┼────────────┼────────────┤");

    for n in 3..=max_dim {
        let result = bench_dimension(&mut rng, n, trials, max_coefficient, &config);
        println!(
            "│ {:>4} │ {:>8} │ {:>8} │ {:>8} │ {:>10.1} │ {:>10.3} │ {:>10.3} │",
            result.n, result.recovered, result.other, result.missed,
            result.mean_iterations, result.mean_ms, result.max_ms
        );
        results.push(result);
    }

    println!("└──────┴──────────┴──────────┴──────────┴────────────┴────────────┴────────────┘");
    println!();

    let total: usize = results.iter().map(|r| r.trials).sum();
    let recovered: usize = results.iter().map(|r| r.recovered).sum();
    if total > 0 {
        println!(
            "Recovered {}/{} planted relations ({:.1}%)",
            recovered,
            total,
            100.0 * recovered as f64 / total as f64
        );
    }

    if let Some(path) = export {
        match export_results(&results, &path) {
            Ok(()) => println!("Results exported to {:?}", path),
            Err(e) => eprintln!("error: failed to export results to {:?}: {}", path, e),
        }
    }
}

fn export_results(results: &[PlantedBenchResult], path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = File::create(path)?;
    writeln!(file, "n,trials,recovered,other,missed,recovery_rate,mean_iterations,max_iterations,mean_ms,max_ms")?;

    for r in results {
        writeln!(
            file,
            "{},{},{},{},{},{:.4},{:.2},{},{:.6},{:.6}",
            r.n, r.trials, r.recovered, r.other, r.missed, r.recovery_rate(),
            r.mean_iterations, r.max_iterations, r.mean_ms, r.max_ms
        )?;
    }
    Ok(())
}
