//! Artifact Transport
//!
//! Roles never talk to each other directly. They exchange named, fixed-length
//! blobs through an [`ArtifactStore`], which stands in for the channel.

pub mod fs;
pub mod memory;

use std::fmt;

use zeroize::Zeroizing;

use crate::error::Result;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

/// The three artifacts of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Alice's public key
    Public,
    /// Alice's secret key
    Secret,
    /// Bob's encapsulation
    Ciphertext,
}

impl Artifact {
    pub fn name(&self) -> &'static str {
        match self {
            Artifact::Public => "public",
            Artifact::Secret => "secret",
            Artifact::Ciphertext => "ciphertext",
        }
    }

    /// Whether the artifact must stay with its owner
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Artifact::Secret)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named blob storage shared by the roles.
///
/// Writes are all-or-nothing: after a failed `store` the artifact is either
/// absent or still holds its previous content.
pub trait ArtifactStore {
    fn store(&self, artifact: Artifact, bytes: &[u8]) -> Result<()>;

    /// Load an artifact that must be exactly `expected_len` bytes long
    fn load(&self, artifact: Artifact, expected_len: usize) -> Result<Zeroizing<Vec<u8>>>;

    /// Remove an artifact; removing a missing artifact is not an error
    fn discard(&self, artifact: Artifact) -> Result<()>;

    fn contains(&self, artifact: Artifact) -> bool;
}

impl<T: ArtifactStore + ?Sized> ArtifactStore for &T {
    fn store(&self, artifact: Artifact, bytes: &[u8]) -> Result<()> {
        (**self).store(artifact, bytes)
    }

    fn load(&self, artifact: Artifact, expected_len: usize) -> Result<Zeroizing<Vec<u8>>> {
        (**self).load(artifact, expected_len)
    }

    fn discard(&self, artifact: Artifact) -> Result<()> {
        (**self).discard(artifact)
    }

    fn contains(&self, artifact: Artifact) -> bool {
        (**self).contains(artifact)
    }
}
