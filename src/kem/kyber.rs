//! Kyber Backend
//!
//! Kyber512/768/1024 key encapsulation through `pqcrypto-kyber`.
//!
//! The pqcrypto key and secret types do not clear themselves, so their bytes
//! are copied into zeroizing containers immediately and the library values
//! are dropped at the end of each call.

use pqcrypto_kyber::{kyber1024, kyber512, kyber768};
use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};

use super::{Algorithm, KemBackend};
use crate::error::{Error, Result};
use crate::keys::{Ciphertext, PublicKey, SecretKey, SharedSecret};

/// Construct the backend for an algorithm
pub fn backend(algorithm: Algorithm) -> Box<dyn KemBackend> {
    match algorithm {
        Algorithm::Kyber512 => Box::new(Kyber512),
        Algorithm::Kyber768 => Box::new(Kyber768),
        Algorithm::Kyber1024 => Box::new(Kyber1024),
    }
}

macro_rules! kyber_backend {
    ($name:ident, $module:ident) => {
        #[doc = concat!("`", stringify!($module), "` from pqcrypto-kyber")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl KemBackend for $name {
            fn algorithm(&self) -> Algorithm {
                Algorithm::$name
            }

            fn keypair(&self) -> Result<(PublicKey, SecretKey)> {
                let (public_key, secret_key) = $module::keypair();
                Ok((
                    PublicKey::from_bytes(public_key.as_bytes()),
                    SecretKey::from_bytes(secret_key.as_bytes())?,
                ))
            }

            fn encapsulate(&self, public_key: &PublicKey) -> Result<(Ciphertext, SharedSecret)> {
                let public_key = $module::PublicKey::from_bytes(public_key.as_bytes())
                    .map_err(|_| Error::EncapsulationFailed)?;
                let (shared_secret, ciphertext) = $module::encapsulate(&public_key);
                Ok((
                    Ciphertext::from_bytes(ciphertext.as_bytes()),
                    SharedSecret::from_bytes(shared_secret.as_bytes())?,
                ))
            }

            fn decapsulate(&self, secret_key: &SecretKey, ciphertext: &Ciphertext) -> Result<SharedSecret> {
                let secret_key = $module::SecretKey::from_bytes(secret_key.as_bytes())
                    .map_err(|_| Error::DecapsulationFailed)?;
                let ciphertext = $module::Ciphertext::from_bytes(ciphertext.as_bytes())
                    .map_err(|_| Error::DecapsulationFailed)?;
                let shared_secret = $module::decapsulate(&ciphertext, &secret_key);
                SharedSecret::from_bytes(shared_secret.as_bytes())
            }
        }
    };
}

kyber_backend!(Kyber512, kyber512);
kyber_backend!(Kyber768, kyber768);
kyber_backend!(Kyber1024, kyber1024);
