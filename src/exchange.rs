//! Complete Exchange
//!
//! Runs key generation, encapsulation and decapsulation back to back over one
//! store and reports whether both sides agree.

use log::{info, warn};

use crate::error::RoleError;
use crate::kem::{Algorithm, KemContext};
use crate::keys::{Ciphertext, PublicKey, SharedSecret};
use crate::roles::{Decapsulator, Encapsulator, KeyGenerator};
use crate::transport::ArtifactStore;

/// Everything observable after a full exchange
#[derive(Debug)]
pub struct ExchangeOutcome {
    pub algorithm: Algorithm,
    pub public_key: PublicKey,
    pub ciphertext: Ciphertext,
    pub sender: SharedSecret,
    pub receiver: SharedSecret,
}

impl ExchangeOutcome {
    pub fn agreed(&self) -> bool {
        self.sender == self.receiver
    }
}

/// Run all three roles in order, each with its own context
pub fn run_exchange<S: ArtifactStore>(algorithm: Algorithm, store: &S) -> Result<ExchangeOutcome, RoleError> {
    let keys = KeyGenerator::new(KemContext::for_algorithm(algorithm), store).run()?;
    let encapsulation = Encapsulator::new(KemContext::for_algorithm(algorithm), store).run()?;
    let receiver = Decapsulator::new(KemContext::for_algorithm(algorithm), store).run()?;

    let outcome = ExchangeOutcome {
        algorithm,
        public_key: keys.public_key,
        ciphertext: encapsulation.ciphertext,
        sender: encapsulation.shared_secret,
        receiver,
    };
    if outcome.agreed() {
        info!("{} exchange complete: shared secrets match", algorithm);
    } else {
        warn!("{} exchange complete but shared secrets differ", algorithm);
    }
    Ok(outcome)
}
