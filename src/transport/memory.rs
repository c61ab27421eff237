//! In-memory artifact store

use std::collections::HashMap;

use parking_lot::RwLock;
use zeroize::Zeroizing;

use super::{Artifact, ArtifactStore};
use crate::error::{Error, Result};
use crate::keys;

/// Artifact store held in process memory, used for tests and self-tests
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<HashMap<Artifact, Zeroizing<Vec<u8>>>>,
    writes: RwLock<Vec<Artifact>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts in the order they were stored
    pub fn write_log(&self) -> Vec<Artifact> {
        self.writes.read().clone()
    }

    /// Overwrite an artifact with arbitrary bytes, bypassing the write log
    pub fn tamper(&self, artifact: Artifact, bytes: &[u8]) {
        self.artifacts
            .write()
            .insert(artifact, Zeroizing::new(bytes.to_vec()));
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn store(&self, artifact: Artifact, bytes: &[u8]) -> Result<()> {
        let mut buf = keys::allocate(bytes.len())?;
        buf.copy_from_slice(bytes);
        self.artifacts.write().insert(artifact, buf);
        self.writes.write().push(artifact);
        Ok(())
    }

    fn load(&self, artifact: Artifact, expected_len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let artifacts = self.artifacts.read();
        let stored = artifacts
            .get(&artifact)
            .ok_or(Error::ArtifactNotFound { artifact })?;
        if stored.len() != expected_len {
            return Err(Error::ArtifactLengthMismatch {
                artifact,
                expected: expected_len,
                actual: stored.len(),
            });
        }
        let mut buf = keys::allocate(expected_len)?;
        buf.copy_from_slice(stored);
        Ok(buf)
    }

    fn discard(&self, artifact: Artifact) -> Result<()> {
        self.artifacts.write().remove(&artifact);
        Ok(())
    }

    fn contains(&self, artifact: Artifact) -> bool {
        self.artifacts.read().contains_key(&artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_checks_length() {
        let store = MemoryArtifactStore::new();
        store.store(Artifact::Public, &[1u8; 800]).unwrap();

        assert_eq!(store.load(Artifact::Public, 800).unwrap().len(), 800);
        assert!(matches!(
            store.load(Artifact::Public, 1184),
            Err(Error::ArtifactLengthMismatch { expected: 1184, actual: 800, .. })
        ));
        assert!(matches!(
            store.load(Artifact::Secret, 1632),
            Err(Error::ArtifactNotFound { artifact: Artifact::Secret })
        ));
    }

    #[test]
    fn test_write_log_and_discard() {
        let store = MemoryArtifactStore::new();
        store.store(Artifact::Secret, b"sk").unwrap();
        store.store(Artifact::Public, b"pk").unwrap();
        store.discard(Artifact::Secret).unwrap();

        assert_eq!(store.write_log(), vec![Artifact::Secret, Artifact::Public]);
        assert!(!store.contains(Artifact::Secret));
        assert!(store.contains(Artifact::Public));
    }
}
