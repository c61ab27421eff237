//! Key Generation (Alice)
//!
//! Produces a key pair and publishes both halves: `public` for the
//! encapsulator and `secret` for Alice's own decapsulation later.

use log::{debug, info, warn};

use crate::error::RoleError;
use crate::kem::KemContext;
use crate::keys::PublicKey;
use crate::pipeline::{Pipeline, Role, Stage};
use crate::transport::{Artifact, ArtifactStore};

/// Result of a key generation run. The secret key is only ever persisted.
#[derive(Debug, Clone)]
pub struct GeneratedKeys {
    pub public_key: PublicKey,
}

pub struct KeyGenerator<S> {
    context: KemContext,
    store: S,
}

impl<S: ArtifactStore> KeyGenerator<S> {
    pub fn new(context: KemContext, store: S) -> Self {
        Self { context, store }
    }

    pub fn run(&self) -> Result<GeneratedKeys, RoleError> {
        let mut pipeline = Pipeline::start(Role::KeyGenerator);
        info!("Generating {} key pair", self.context.algorithm());

        let (public_key, secret_key) =
            pipeline.step(Stage::PrimitiveInvoked, || self.context.keypair())?;

        // Old public key and ciphertext go first, then secret before public,
        // so `public` never exists without its own secret half
        pipeline.step(Stage::OutputsPersisted, || {
            self.store.discard(Artifact::Public)?;
            self.store.discard(Artifact::Ciphertext)?;
            self.store.store(Artifact::Secret, secret_key.as_bytes())?;
            if let Err(e) = self.store.store(Artifact::Public, public_key.as_bytes()) {
                if let Err(cleanup) = self.store.discard(Artifact::Secret) {
                    warn!("Could not discard orphaned secret key: {}", cleanup);
                }
                return Err(e);
            }
            Ok(())
        })?;
        drop(secret_key);
        debug!("Public key: {}", public_key.to_hex());

        info!(
            "Key pair generated: public key {} bytes, secret key {} bytes",
            public_key.len(),
            self.context.params().length_secret_key
        );
        pipeline.finish();
        Ok(GeneratedKeys { public_key })
    }
}
