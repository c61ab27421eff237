//! Alice - Key Decapsulation
//!
//! Reads the `secret` and `ciphertext` artifacts and prints the recovered
//! shared secret as hex on stdout.

use anyhow::Result;
use clap::Parser;

use pqkem_exchange::cli::{self, CommonArgs};
use pqkem_exchange::pipeline::{acquire_context, Role};
use pqkem_exchange::{Decapsulator, ExchangeConfig, FsArtifactStore};

const PROGRAM: &str = "kem-decapsulate";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "kem-decapsulate")]
#[command(about = "Alice: recover the shared secret from Bob's ciphertext")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    let args = Args::parse();
    let config = match args.common.resolve() {
        Ok(config) => config,
        Err(e) => cli::fail(PROGRAM, e),
    };
    cli::init_logging(&config.log_level);

    if let Err(e) = run(&config) {
        cli::fail(PROGRAM, e);
    }
}

fn run(config: &ExchangeConfig) -> Result<()> {
    cli::log_settings(PROGRAM, config);

    let context = acquire_context(Role::Decapsulator, &config.algorithm)?;
    let store = FsArtifactStore::new(&config.artifact_dir);
    let shared_secret = Decapsulator::new(context, &store).run()?;

    println!("{}", shared_secret.to_hex().as_str());
    Ok(())
}
