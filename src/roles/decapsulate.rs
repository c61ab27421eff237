//! Decapsulation (Alice)
//!
//! Recovers the shared secret from Bob's ciphertext with Alice's secret key.

use log::info;

use crate::error::RoleError;
use crate::kem::KemContext;
use crate::keys::{Ciphertext, SecretBytes, SecretKey, SharedSecret};
use crate::pipeline::{Pipeline, Role, Stage};
use crate::transport::{Artifact, ArtifactStore};

pub struct Decapsulator<S> {
    context: KemContext,
    store: S,
}

impl<S: ArtifactStore> Decapsulator<S> {
    pub fn new(context: KemContext, store: S) -> Self {
        Self { context, store }
    }

    pub fn run(&self) -> Result<SharedSecret, RoleError> {
        let mut pipeline = Pipeline::start(Role::Decapsulator);
        let params = *self.context.params();

        let (secret_key, ciphertext) = pipeline.step(Stage::InputsLoaded, || {
            let secret_key = SecretKey::new(SecretBytes::new(
                self.store.load(Artifact::Secret, params.length_secret_key)?,
            ));
            let ciphertext = self.store.load(Artifact::Ciphertext, params.length_ciphertext)?;
            Ok((secret_key, Ciphertext::from_bytes(&ciphertext)))
        })?;
        info!("Loaded Alice's secret key and Bob's ciphertext");

        let shared_secret = pipeline.step(Stage::PrimitiveInvoked, || {
            self.context.decapsulate(&secret_key, &ciphertext)
        })?;
        drop(secret_key);
        info!("Key decapsulation successful");

        // Nothing is published by this role
        pipeline.step(Stage::OutputsPersisted, || Ok(()))?;
        pipeline.finish();
        Ok(shared_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::kem::testing::{CountingBackend, Fault};
    use crate::kem::Algorithm;
    use crate::roles::{Encapsulator, KeyGenerator};
    use crate::transport::MemoryArtifactStore;

    fn exchange_up_to_ciphertext(store: &MemoryArtifactStore, alg: Algorithm) -> SharedSecret {
        KeyGenerator::new(KemContext::for_algorithm(alg), store)
            .run()
            .unwrap();
        Encapsulator::new(KemContext::for_algorithm(alg), store)
            .run()
            .unwrap()
            .shared_secret
    }

    #[test]
    fn test_recovers_sender_secret() {
        for alg in Algorithm::ALL {
            let store = MemoryArtifactStore::new();
            let sender = exchange_up_to_ciphertext(&store, alg);
            let receiver = Decapsulator::new(KemContext::for_algorithm(alg), &store)
                .run()
                .unwrap();
            assert_eq!(receiver, sender);
            assert_eq!(receiver.to_hex().len(), 64);
        }
    }

    #[test]
    fn test_truncated_ciphertext_skips_primitive() {
        let store = MemoryArtifactStore::new();
        exchange_up_to_ciphertext(&store, Algorithm::Kyber512);
        let ciphertext = store.load(Artifact::Ciphertext, 768).unwrap();
        store.tamper(Artifact::Ciphertext, &ciphertext[..700]);

        let (ctx, calls) = CountingBackend::context(Algorithm::Kyber512, Fault::None);
        let err = Decapsulator::new(ctx, &store).run().unwrap_err();

        assert_eq!(err.stage, Stage::InputsLoaded);
        assert!(matches!(
            err.kind(),
            Error::ArtifactLengthMismatch { artifact: Artifact::Ciphertext, expected: 768, actual: 700 }
        ));
        assert_eq!(calls.total(), 0);
    }

    #[test]
    fn test_missing_secret_key() {
        let store = MemoryArtifactStore::new();
        store.store(Artifact::Ciphertext, &[0u8; 768]).unwrap();
        let err = Decapsulator::new(KemContext::for_algorithm(Algorithm::Kyber512), &store)
            .run()
            .unwrap_err();
        assert!(matches!(err.kind(), Error::ArtifactNotFound { artifact: Artifact::Secret }));
    }

    #[test]
    fn test_decapsulation_failure_is_reported() {
        let store = MemoryArtifactStore::new();
        exchange_up_to_ciphertext(&store, Algorithm::Kyber512);

        let (ctx, calls) = CountingBackend::context(Algorithm::Kyber512, Fault::Decapsulate);
        let err = Decapsulator::new(ctx, &store).run().unwrap_err();

        assert_eq!(err.stage, Stage::PrimitiveInvoked);
        assert!(matches!(err.kind(), Error::DecapsulationFailed));
        assert_eq!(calls.total(), 1);
    }

    #[test]
    fn test_tampered_ciphertext_disagrees() {
        let store = MemoryArtifactStore::new();
        let sender = exchange_up_to_ciphertext(&store, Algorithm::Kyber768);
        let mut ciphertext = store.load(Artifact::Ciphertext, 1088).unwrap();
        ciphertext[0] ^= 0x01;
        store.tamper(Artifact::Ciphertext, &ciphertext);

        let receiver = Decapsulator::new(KemContext::for_algorithm(Algorithm::Kyber768), &store)
            .run()
            .unwrap();
        assert_ne!(receiver, sender);
    }
}
