//! Command-line plumbing shared by the role binaries

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use crate::config::ExchangeConfig;
use crate::error::{ErrorClass, RoleError};

/// Configuration file read when `--config` is not given (if it exists)
pub const DEFAULT_CONFIG: &str = "config/exchange.toml";

/// Flags common to every role
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// KEM algorithm identifier (Kyber512, Kyber768, Kyber1024)
    #[arg(short, long = "alg")]
    pub algorithm: Option<String>,

    /// Directory holding the exchanged artifacts
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    pub log_level: Option<String>,
}

impl CommonArgs {
    /// Merge the configuration file with command-line overrides
    pub fn resolve(&self) -> Result<ExchangeConfig> {
        let mut config = match &self.config {
            Some(path) => ExchangeConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG);
                if default.exists() {
                    ExchangeConfig::from_file(&default)
                        .with_context(|| format!("loading config {}", default.display()))?
                } else {
                    ExchangeConfig::default()
                }
            }
        };

        if let Some(algorithm) = &self.algorithm {
            config.algorithm = algorithm.clone();
        }
        if let Some(dir) = &self.dir {
            config.artifact_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }
}

/// Initialize stderr logging at `level` unless RUST_LOG says otherwise
pub fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

/// Exit status for a failed run: 2 for configuration problems, 1 otherwise
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let config_error = err.chain().any(|cause| {
        matches!(cause.downcast_ref::<RoleError>(), Some(e) if e.kind().class() == ErrorClass::Configuration)
            || cause.is::<crate::config::ConfigError>()
    });
    if config_error {
        2
    } else {
        1
    }
}

/// Print a one-line diagnostic and terminate
pub fn fail(program: &str, err: anyhow::Error) -> ! {
    eprintln!("{}: {:#}", program, err);
    process::exit(exit_code(&err));
}

pub fn log_settings(program: &str, config: &ExchangeConfig) {
    info!(
        "{}: algorithm {}, artifacts in {}",
        program,
        config.algorithm,
        config.artifact_dir.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pipeline::{Role, Stage};

    fn args(algorithm: Option<&str>) -> CommonArgs {
        CommonArgs {
            config: None,
            algorithm: algorithm.map(str::to_string),
            dir: Some(PathBuf::from("/tmp/channel")),
            log_level: None,
        }
    }

    #[test]
    fn test_overrides_apply() {
        let config = args(Some("Kyber768")).resolve().unwrap();
        assert_eq!(config.algorithm, "Kyber768");
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/channel"));
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let mut args = args(None);
        args.config = Some(PathBuf::from("/nonexistent/exchange.toml"));
        let err = args.resolve().unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_codes() {
        let unsupported = anyhow::Error::new(RoleError::new(
            Role::KeyGenerator,
            Stage::ContextAcquired,
            Error::UnsupportedAlgorithm("Foo".into()),
        ));
        assert_eq!(exit_code(&unsupported), 2);

        let primitive = anyhow::Error::new(RoleError::new(
            Role::Decapsulator,
            Stage::PrimitiveInvoked,
            Error::DecapsulationFailed,
        ));
        assert_eq!(exit_code(&primitive), 1);
    }
}
