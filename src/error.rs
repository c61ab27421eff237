//! Error Types
//!
//! Every failure in the exchange is terminal for the current attempt and is
//! propagated to the caller unchanged.

use thiserror::Error;

use crate::pipeline::{Role, Stage};
use crate::transport::Artifact;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a key exchange
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },
    #[error("Artifact '{artifact}' not found")]
    ArtifactNotFound { artifact: Artifact },
    #[error("Artifact '{artifact}' has length {actual}, expected {expected}")]
    ArtifactLengthMismatch {
        artifact: Artifact,
        expected: usize,
        actual: usize,
    },
    #[error("I/O error on artifact '{artifact}': {source}")]
    ArtifactIo {
        artifact: Artifact,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid public key length: expected {expected}, got {actual}")]
    InvalidPublicKeyLength { expected: usize, actual: usize },
    #[error("Invalid secret key length: expected {expected}, got {actual}")]
    InvalidSecretKeyLength { expected: usize, actual: usize },
    #[error("Invalid ciphertext length: expected {expected}, got {actual}")]
    InvalidCiphertextLength { expected: usize, actual: usize },
    #[error("Key generation failed")]
    KeypairGenerationFailed,
    #[error("Encapsulation failed")]
    EncapsulationFailed,
    #[error("Decapsulation failed")]
    DecapsulationFailed,
}

/// Broad category of an [`Error`], used to decide what a caller can do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Unknown algorithm id; fix the input and re-run
    Configuration,
    /// Missing, malformed or unwritable artifact; the channel is at fault
    Transport,
    /// The KEM primitive (or resources it needs) failed; restart from keygen
    Primitive,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::UnsupportedAlgorithm(_) => ErrorClass::Configuration,
            Error::ArtifactNotFound { .. }
            | Error::ArtifactLengthMismatch { .. }
            | Error::ArtifactIo { .. }
            | Error::InvalidPublicKeyLength { .. }
            | Error::InvalidSecretKeyLength { .. }
            | Error::InvalidCiphertextLength { .. } => ErrorClass::Transport,
            Error::AllocationFailure { .. }
            | Error::KeypairGenerationFailed
            | Error::EncapsulationFailed
            | Error::DecapsulationFailed => ErrorClass::Primitive,
        }
    }
}

/// A failure of one role, tagged with the stage it was attempting
#[derive(Error, Debug)]
#[error("{role} failed at {stage}: {source}")]
pub struct RoleError {
    pub role: Role,
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl RoleError {
    pub fn new(role: Role, stage: Stage, source: Error) -> Self {
        Self { role, stage, source }
    }

    /// The underlying error kind
    pub fn kind(&self) -> &Error {
        &self.source
    }
}
