//! Encapsulation (Bob)
//!
//! Reads Alice's public key, derives a shared secret and publishes the
//! matching ciphertext.

use log::info;

use crate::error::RoleError;
use crate::kem::KemContext;
use crate::keys::{Ciphertext, PublicKey, SharedSecret};
use crate::pipeline::{Pipeline, Role, Stage};
use crate::transport::{Artifact, ArtifactStore};

/// Bob's side of a completed encapsulation
#[derive(Debug, Clone)]
pub struct Encapsulation {
    /// Published as the `ciphertext` artifact
    pub ciphertext: Ciphertext,
    /// Bob's copy of the shared secret; never published
    pub shared_secret: SharedSecret,
}

pub struct Encapsulator<S> {
    context: KemContext,
    store: S,
}

impl<S: ArtifactStore> Encapsulator<S> {
    pub fn new(context: KemContext, store: S) -> Self {
        Self { context, store }
    }

    pub fn run(&self) -> Result<Encapsulation, RoleError> {
        let mut pipeline = Pipeline::start(Role::Encapsulator);
        let params = *self.context.params();

        let public_key = pipeline.step(Stage::InputsLoaded, || {
            let bytes = self.store.load(Artifact::Public, params.length_public_key)?;
            Ok(PublicKey::from_bytes(&bytes))
        })?;
        info!("Loaded Alice's public key ({} bytes)", public_key.len());

        let (ciphertext, shared_secret) =
            pipeline.step(Stage::PrimitiveInvoked, || self.context.encapsulate(&public_key))?;

        pipeline.step(Stage::OutputsPersisted, || {
            self.store.store(Artifact::Ciphertext, ciphertext.as_bytes())
        })?;
        info!("Encapsulated ciphertext published ({} bytes)", ciphertext.len());

        pipeline.finish();
        Ok(Encapsulation {
            ciphertext,
            shared_secret,
        })
    }
}
