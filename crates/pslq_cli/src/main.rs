//! PSLQ CLI
//!
//! Integer relation detection from the command line.
//!
//! # Usage
//! ```bash
//! # Look for a relation among explicit values (ascending)
//! pslq find 0.6931471805599453 1.0986122886681098 1.791759469228055
//!
//! # Search a built-in dictionary, extended with extra constants
//! pslq describe --dictionary small --constant "ln(6)=1.791759469228055"
//!
//! # Recovery rate and timing on planted relations
//! pslq bench --max-dim 8 --trials 20 --export results/bench.csv
//! ```

mod bench;

use clap::{Parser, Subcommand, ValueEnum};
use pslq_core::{
    default_gamma, describe_relation_with, Dictionary, Pslq, PslqConfig, PslqOutcome, Real,
    TracingSink,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "pslq")]
#[command(about = "Integer relation detection with the PSLQ algorithm")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a relation among the given values
    Find {
        /// Strictly ascending positive values
        #[arg(required = true, num_args = 2..)]
        values: Vec<String>,

        #[command(flatten)]
        search: SearchArgs,

        /// Parse and search at 256-bit MPFR precision
        #[cfg(feature = "mpfr")]
        #[arg(long)]
        mp: bool,
    },

    /// Search a dictionary of named constants and describe the result
    Describe {
        /// Built-in dictionary to start from
        #[arg(long, value_enum, default_value = "tiny")]
        dictionary: DictionaryChoice,

        /// Extra constant as name=value (repeatable)
        #[arg(long = "constant", value_parser = parse_constant)]
        constants: Vec<(String, f64)>,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Measure recovery of planted relations
    Bench {
        /// Largest input dimension
        #[arg(long, default_value = "6")]
        max_dim: usize,

        /// Trials per dimension
        #[arg(long, default_value = "10")]
        trials: usize,

        /// Coefficient magnitude bound for planted relations
        #[arg(long, default_value = "9")]
        max_coefficient: i64,

        /// RNG seed
        #[arg(long, default_value = "24301")]
        seed: u64,

        /// Export results to CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(clap::Args, Clone)]
struct SearchArgs {
    /// Pivot weight γ, must exceed 2/√3
    #[arg(long, default_value_t = default_gamma())]
    gamma: f64,

    /// Norm ceiling for relations
    #[arg(long, default_value = "1e11")]
    max_norm: f64,

    /// Iteration budget
    #[arg(long, default_value = "100000")]
    max_iterations: usize,

    /// Wall-clock budget for the main loop
    #[arg(long)]
    time_limit_ms: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> PslqConfig {
        let config = PslqConfig::default()
            .with_gamma(self.gamma)
            .with_max_norm(self.max_norm)
            .with_max_iterations(self.max_iterations);
        match self.time_limit_ms {
            Some(ms) => config.with_time_limit(Duration::from_millis(ms)),
            None => config,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DictionaryChoice {
    /// π, e, √2, ln 2
    Tiny,
    /// Twenty-six common constants and logarithms of small primes
    Small,
    /// Only the constants given with --constant
    Empty,
}

fn parse_constant(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{}': {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn init_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        #[cfg(feature = "mpfr")]
        Commands::Find {
            values,
            search,
            mp,
        } => {
            if mp {
                run_find(&values, &search, |s| pslq_core::Mp256::parse(s))
            } else {
                run_find(&values, &search, |s| s.parse::<f64>().ok())
            }
        }
        #[cfg(not(feature = "mpfr"))]
        Commands::Find { values, search } => {
            run_find(&values, &search, |s| s.parse::<f64>().ok())
        }
        Commands::Describe {
            dictionary,
            constants,
            search,
        } => run_describe(dictionary, constants, &search),
        Commands::Bench {
            max_dim,
            trials,
            max_coefficient,
            seed,
            export,
        } => {
            bench::run_planted_benchmark(max_dim, trials, max_coefficient, seed, export);
            ExitCode::SUCCESS
        }
    }
}

fn run_find<R, P>(inputs: &[String], search: &SearchArgs, parse: P) -> ExitCode
where
    R: Real,
    P: Fn(&str) -> Option<R>,
{
    let mut values = Vec::with_capacity(inputs.len());
    for s in inputs {
        match parse(s) {
            Some(v) => values.push(v),
            None => {
                eprintln!("error: '{}' is not a number", s);
                return ExitCode::FAILURE;
            }
        }
    }

    let mut pslq = Pslq::with_sink(search.config(), TracingSink);
    let (outcome, stats) = match pslq.run(&values) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &outcome {
        PslqOutcome::RelationFound {
            relation,
            vanishing,
            ..
        } => {
            let relation = relation.normalized();
            println!("Relation found after {} iterations:", stats.iterations);
            println!("  {} = {}", relation, relation.residual());
            println!("  coefficients: {:?}", relation
                .coefficients()
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>());
            if *vanishing > 1 {
                println!("  ({} components of y vanished; other relations may exist)", vanishing);
            }
        }
        PslqOutcome::NoRelationFound { norm_bound } => {
            println!("No relation with norm below {:.3e}", norm_bound);
        }
        PslqOutcome::PrecisionExhausted {
            norm_bound,
            candidate_norm,
        } => {
            println!("Precision exhausted after {} iterations", stats.iterations);
            println!("  no relation with norm below {:.3e}", norm_bound);
            println!(
                "  spurious candidate of norm {:.3e} exceeds the ceiling {:.3e}; retry with more precision",
                candidate_norm, search.max_norm
            );
        }
        PslqOutcome::MaxIterationsExceeded {
            iterations,
            norm_bound,
        } => {
            println!("Iteration budget exhausted after {} iterations", iterations);
            println!("  no relation with norm below {:.3e}", norm_bound);
        }
        PslqOutcome::TimeLimitExceeded {
            iterations,
            norm_bound,
            elapsed,
        } => {
            println!(
                "Time budget exhausted after {} iterations ({:.1} ms)",
                iterations,
                elapsed.as_secs_f64() * 1000.0
            );
            println!("  no relation with norm below {:.3e}", norm_bound);
        }
    }

    println!();
    println!("Timing breakdown:");
    println!("  Decompose: {:>10.3} ms", stats.decompose_time * 1000.0);
    println!("  Reduce:    {:>10.3} ms ({} reductions)", stats.reduce_time * 1000.0, stats.reductions);
    println!("  Iterate:   {:>10.3} ms ({} swaps, {} corner rotations)",
             stats.iterate_time * 1000.0, stats.swaps, stats.corner_removals);
    println!("  Total:     {:>10.3} ms", stats.total_time * 1000.0);

    ExitCode::SUCCESS
}

fn run_describe(
    choice: DictionaryChoice,
    constants: Vec<(String, f64)>,
    search: &SearchArgs,
) -> ExitCode {
    let mut dictionary = match choice {
        DictionaryChoice::Tiny => Dictionary::<f64>::tiny(),
        DictionaryChoice::Small => Dictionary::<f64>::small(),
        DictionaryChoice::Empty => Dictionary::new(),
    };
    for (name, value) in constants {
        dictionary.insert(name, value);
    }

    println!("Searching {} constants: {}", dictionary.len(), dictionary.names().join(", "));
    let report = describe_relation_with(&dictionary, &search.config(), TracingSink);
    if report.is_empty() {
        println!("No relation found");
    } else {
        println!("{}", report);
    }
    ExitCode::SUCCESS
}
