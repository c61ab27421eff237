//! Alice - Key Generation
//!
//! Generates a key pair and writes the `public` and `secret` artifacts.

use anyhow::Result;
use clap::Parser;
use log::info;

use pqkem_exchange::cli::{self, CommonArgs};
use pqkem_exchange::pipeline::{acquire_context, Role};
use pqkem_exchange::{Artifact, ExchangeConfig, FsArtifactStore, KeyGenerator};

const PROGRAM: &str = "kem-keygen";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "kem-keygen")]
#[command(about = "Alice: generate a KEM key pair and publish the public key")]
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

    let context = acquire_context(Role::KeyGenerator, &config.algorithm)?;
    let store = FsArtifactStore::new(&config.artifact_dir);
    let keys = KeyGenerator::new(context, &store).run()?;

    info!(
        "Public key saved to {} ({} bytes)",
        store.path_of(Artifact::Public).display(),
        keys.public_key.len()
    );
    info!(
        "Secret key saved to {}",
        store.path_of(Artifact::Secret).display()
    );
    Ok(())
}
