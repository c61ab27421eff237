//! PQ KEM Exchange - store-and-forward post-quantum key encapsulation
//!
//! Alice generates a key pair, Bob encapsulates a shared secret against her
//! public key, and Alice recovers the same secret from Bob's ciphertext.
//! The parties only ever exchange named artifacts through an
//! [`transport::ArtifactStore`].

pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod kem;
pub mod keys;
pub mod pipeline;
pub mod roles;
pub mod transport;

pub use config::ExchangeConfig;
pub use error::{Error, ErrorClass, Result, RoleError};
pub use exchange::{run_exchange, ExchangeOutcome};
pub use kem::{Algorithm, KemBackend, KemContext, KemParams};
pub use keys::{Ciphertext, PublicKey, SecretKey, SharedSecret};
pub use roles::{Decapsulator, Encapsulation, Encapsulator, GeneratedKeys, KeyGenerator};
pub use transport::{Artifact, ArtifactStore, FsArtifactStore, MemoryArtifactStore};
