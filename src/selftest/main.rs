//! KEM Exchange Self-Test
//!
//! Runs complete exchanges over an in-memory channel and reports timings
//! for each role.

use anyhow::{bail, Result};
use clap::Parser;
use log::{error, info};
use std::time::Instant;

use pqkem_exchange::{
    Algorithm, Artifact, ArtifactStore, Decapsulator, Encapsulator, KemContext, KeyGenerator,
    KemParams, MemoryArtifactStore,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "kem-selftest")]
#[command(about = "Run repeated in-memory KEM exchanges and report timings")]
struct Args {
    /// Algorithm identifier, or "all"
    #[arg(short, long = "alg", default_value = "all")]
    algorithm: String,

    /// Exchanges per algorithm
    #[arg(short, long, default_value = "10")]
    rounds: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output format
    #[arg(long)]
    json: bool,
}

/// Metrics for a single exchange
#[derive(Debug, serde::Serialize)]
struct RoundMetrics {
    round: u32,
    timestamp: String,
    keygen_us: u64,
    encapsulate_us: u64,
    decapsulate_us: u64,
    success: bool,
    error: Option<String>,
}

/// Results for one algorithm
#[derive(Debug, serde::Serialize)]
struct AlgorithmReport {
    algorithm: Algorithm,
    params: KemParams,
    rounds: u32,
    successful: u32,
    avg_keygen_us: f64,
    avg_encapsulate_us: f64,
    avg_decapsulate_us: f64,
    metrics: Vec<RoundMetrics>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let algorithms: Vec<Algorithm> = if args.algorithm.eq_ignore_ascii_case("all") {
        Algorithm::ALL.to_vec()
    } else {
        vec![args.algorithm.parse()?]
    };

    let reports: Vec<AlgorithmReport> = algorithms
        .into_iter()
        .map(|alg| run_algorithm(alg, args.rounds))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report, args.verbose);
        }
    }

    let failed: u32 = reports.iter().map(|r| r.rounds - r.successful).sum();
    if failed > 0 {
        bail!("{} exchange(s) failed", failed);
    }
    Ok(())
}

fn run_algorithm(algorithm: Algorithm, rounds: u32) -> AlgorithmReport {
    info!("Running {} rounds of {}", rounds, algorithm);
    let metrics: Vec<RoundMetrics> = (1..=rounds).map(|round| run_round(algorithm, round)).collect();
    let ok: Vec<&RoundMetrics> = metrics.iter().filter(|m| m.success).collect();

    AlgorithmReport {
        algorithm,
        params: algorithm.params(),
        rounds,
        successful: ok.len() as u32,
        avg_keygen_us: average(ok.iter().map(|m| m.keygen_us)),
        avg_encapsulate_us: average(ok.iter().map(|m| m.encapsulate_us)),
        avg_decapsulate_us: average(ok.iter().map(|m| m.decapsulate_us)),
        metrics,
    }
}

fn run_round(algorithm: Algorithm, round: u32) -> RoundMetrics {
    let mut metrics = RoundMetrics {
        round,
        timestamp: chrono::Utc::now().to_rfc3339(),
        keygen_us: 0,
        encapsulate_us: 0,
        decapsulate_us: 0,
        success: false,
        error: None,
    };
    let store = MemoryArtifactStore::new();
    let params = algorithm.params();

    let start = Instant::now();
    if let Err(e) = KeyGenerator::new(KemContext::for_algorithm(algorithm), &store).run() {
        metrics.error = Some(e.to_string());
        return metrics;
    }
    metrics.keygen_us = start.elapsed().as_micros() as u64;

    let start = Instant::now();
    let sender = match Encapsulator::new(KemContext::for_algorithm(algorithm), &store).run() {
        Ok(encapsulation) => encapsulation.shared_secret,
        Err(e) => {
            metrics.error = Some(e.to_string());
            return metrics;
        }
    };
    metrics.encapsulate_us = start.elapsed().as_micros() as u64;

    let start = Instant::now();
    let receiver = match Decapsulator::new(KemContext::for_algorithm(algorithm), &store).run() {
        Ok(shared_secret) => shared_secret,
        Err(e) => {
            metrics.error = Some(e.to_string());
            return metrics;
        }
    };
    metrics.decapsulate_us = start.elapsed().as_micros() as u64;

    let lengths_ok = store.load(Artifact::Public, params.length_public_key).is_ok()
        && store.load(Artifact::Secret, params.length_secret_key).is_ok()
        && store.load(Artifact::Ciphertext, params.length_ciphertext).is_ok();
    if !lengths_ok {
        metrics.error = Some("artifact lengths do not match parameters".to_string());
    } else if sender != receiver {
        error!("{} round {}: shared secrets differ", algorithm, round);
        metrics.error = Some("shared secrets differ".to_string());
    } else {
        metrics.success = true;
    }
    metrics
}

fn average(values: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn print_report(report: &AlgorithmReport, verbose: bool) {
    println!("{}", report.algorithm);
    println!(
        "  public key {} B, secret key {} B, ciphertext {} B, shared secret {} B",
        report.params.length_public_key,
        report.params.length_secret_key,
        report.params.length_ciphertext,
        report.params.length_shared_secret,
    );
    println!("  Successful:   {}/{}", report.successful, report.rounds);
    println!("  Keygen:       {:.1} us", report.avg_keygen_us);
    println!("  Encapsulate:  {:.1} us", report.avg_encapsulate_us);
    println!("  Decapsulate:  {:.1} us", report.avg_decapsulate_us);

    for metric in &report.metrics {
        match &metric.error {
            Some(err) => println!("  Round {}: FAILED: {}", metric.round, err),
            None if verbose => println!(
                "  Round {}: {} / {} / {} us",
                metric.round, metric.keygen_us, metric.encapsulate_us, metric.decapsulate_us
            ),
            None => {}
        }
    }
    println!();
}
