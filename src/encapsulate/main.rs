//! Bob - Key Encapsulation
//!
//! Reads Alice's `public` artifact, writes the `ciphertext` artifact and
//! prints Bob's copy of the shared secret as hex on stdout.

use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use pqkem_exchange::cli::{self, CommonArgs};
use pqkem_exchange::pipeline::{acquire_context, Role};
use pqkem_exchange::{Artifact, Encapsulator, ExchangeConfig, FsArtifactStore};

const PROGRAM: &str = "kem-encapsulate";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "kem-encapsulate")]
#[command(about = "Bob: encapsulate a shared secret to Alice's public key")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Log the encapsulated ciphertext as hex (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let mut config = match args.common.resolve() {
        Ok(config) => config,
        Err(e) => cli::fail(PROGRAM, e),
    };
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    cli::init_logging(&config.log_level);

    if let Err(e) = run(&config) {
        cli::fail(PROGRAM, e);
    }
}

fn run(config: &ExchangeConfig) -> Result<()> {
    cli::log_settings(PROGRAM, config);

    let context = acquire_context(Role::Encapsulator, &config.algorithm)?;
    let store = FsArtifactStore::new(&config.artifact_dir);
    let encapsulation = Encapsulator::new(context, &store).run()?;

    info!(
        "Ciphertext saved to {}",
        store.path_of(Artifact::Ciphertext).display()
    );
    debug!("Encapsulated ciphertext: {}", hex::encode(encapsulation.ciphertext.as_bytes()));

    println!("{}", encapsulation.shared_secret.to_hex().as_str());
    Ok(())
}
