//! KEM Parameters
//!
//! The key encapsulation primitive is reached only through [`KemContext`],
//! which binds one algorithm's fixed lengths to a [`KemBackend`] and checks
//! every buffer crossing that boundary.

pub mod kyber;

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::keys::{Ciphertext, PublicKey, SecretKey, SharedSecret};

/// Supported algorithm identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Algorithm {
    Kyber512,
    Kyber768,
    Kyber1024,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Kyber512, Algorithm::Kyber768, Algorithm::Kyber1024];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Kyber512 => "Kyber512",
            Algorithm::Kyber768 => "Kyber768",
            Algorithm::Kyber1024 => "Kyber1024",
        }
    }

    /// Fixed byte lengths for this parameter set
    pub fn params(&self) -> KemParams {
        match self {
            Algorithm::Kyber512 => KemParams {
                length_public_key: 800,
                length_secret_key: 1632,
                length_ciphertext: 768,
                length_shared_secret: 32,
            },
            Algorithm::Kyber768 => KemParams {
                length_public_key: 1184,
                length_secret_key: 2400,
                length_ciphertext: 1088,
                length_shared_secret: 32,
            },
            Algorithm::Kyber1024 => KemParams {
                length_public_key: 1568,
                length_secret_key: 3168,
                length_ciphertext: 1568,
                length_shared_secret: 32,
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Byte lengths fixed by an algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KemParams {
    pub length_public_key: usize,
    pub length_secret_key: usize,
    pub length_ciphertext: usize,
    pub length_shared_secret: usize,
}

/// A concrete KEM implementation.
///
/// Backends work on raw bytes. Length checks are done by [`KemContext`]
/// before and after each call, so a backend may assume well-sized inputs.
pub trait KemBackend: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Returns (public_key, secret_key)
    fn keypair(&self) -> Result<(PublicKey, SecretKey)>;

    /// Returns (ciphertext, shared_secret)
    fn encapsulate(&self, public_key: &PublicKey) -> Result<(Ciphertext, SharedSecret)>;

    fn decapsulate(&self, secret_key: &SecretKey, ciphertext: &Ciphertext) -> Result<SharedSecret>;
}

/// An acquired KEM context for one algorithm
pub struct KemContext {
    params: KemParams,
    backend: Box<dyn KemBackend>,
}

impl KemContext {
    /// Acquire a context for an algorithm identifier such as `"Kyber512"`
    pub fn new(algorithm_id: &str) -> Result<Self> {
        let algorithm: Algorithm = algorithm_id.parse()?;
        Ok(Self::for_algorithm(algorithm))
    }

    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        Self::with_backend(kyber::backend(algorithm))
    }

    /// Wrap an arbitrary backend; lengths come from its algorithm
    pub fn with_backend(backend: Box<dyn KemBackend>) -> Self {
        let params = backend.algorithm().params();
        debug!("Acquired KEM context for {}", backend.algorithm());
        Self { params, backend }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.backend.algorithm()
    }

    pub fn params(&self) -> &KemParams {
        &self.params
    }

    pub fn keypair(&self) -> Result<(PublicKey, SecretKey)> {
        let (public_key, secret_key) = self.backend.keypair()?;
        if public_key.len() != self.params.length_public_key
            || secret_key.len() != self.params.length_secret_key
        {
            return Err(Error::KeypairGenerationFailed);
        }
        Ok((public_key, secret_key))
    }

    pub fn encapsulate(&self, public_key: &PublicKey) -> Result<(Ciphertext, SharedSecret)> {
        check_len(public_key.len(), self.params.length_public_key, |expected, actual| {
            Error::InvalidPublicKeyLength { expected, actual }
        })?;
        let (ciphertext, shared_secret) = self.backend.encapsulate(public_key)?;
        if ciphertext.len() != self.params.length_ciphertext
            || shared_secret.len() != self.params.length_shared_secret
        {
            return Err(Error::EncapsulationFailed);
        }
        Ok((ciphertext, shared_secret))
    }

    pub fn decapsulate(&self, secret_key: &SecretKey, ciphertext: &Ciphertext) -> Result<SharedSecret> {
        check_len(secret_key.len(), self.params.length_secret_key, |expected, actual| {
            Error::InvalidSecretKeyLength { expected, actual }
        })?;
        check_len(ciphertext.len(), self.params.length_ciphertext, |expected, actual| {
            Error::InvalidCiphertextLength { expected, actual }
        })?;
        let shared_secret = self.backend.decapsulate(secret_key, ciphertext)?;
        if shared_secret.len() != self.params.length_shared_secret {
            return Err(Error::DecapsulationFailed);
        }
        Ok(shared_secret)
    }
}

impl fmt::Debug for KemContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KemContext")
            .field("algorithm", &self.backend.algorithm())
            .field("params", &self.params)
            .finish()
    }
}

impl Drop for KemContext {
    fn drop(&mut self) {
        debug!("Released KEM context for {}", self.backend.algorithm());
    }
}

fn check_len(actual: usize, expected: usize, err: impl FnOnce(usize, usize) -> Error) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(err(expected, actual))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Test doubles for the KEM boundary.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Call counters shared between a test and its [`CountingBackend`]
    #[derive(Debug, Default)]
    pub struct Calls {
        pub keypair: AtomicUsize,
        pub encapsulate: AtomicUsize,
        pub decapsulate: AtomicUsize,
    }

    impl Calls {
        pub fn total(&self) -> usize {
            self.keypair.load(Ordering::SeqCst)
                + self.encapsulate.load(Ordering::SeqCst)
                + self.decapsulate.load(Ordering::SeqCst)
        }
    }

    /// Which primitive the backend should fail
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Fault {
        None,
        Keypair,
        Encapsulate,
        Decapsulate,
        /// Return a truncated shared secret from `encapsulate`
        ShortSharedSecret,
    }

    /// Real Kyber backend that counts calls and can inject faults
    pub struct CountingBackend {
        inner: Box<dyn KemBackend>,
        calls: Arc<Calls>,
        fault: Fault,
    }

    impl CountingBackend {
        pub fn context(algorithm: Algorithm, fault: Fault) -> (KemContext, Arc<Calls>) {
            let calls = Arc::new(Calls::default());
            let backend = CountingBackend {
                inner: kyber::backend(algorithm),
                calls: Arc::clone(&calls),
                fault,
            };
            (KemContext::with_backend(Box::new(backend)), calls)
        }
    }

    impl KemBackend for CountingBackend {
        fn algorithm(&self) -> Algorithm {
            self.inner.algorithm()
        }

        fn keypair(&self) -> Result<(PublicKey, SecretKey)> {
            self.calls.keypair.fetch_add(1, Ordering::SeqCst);
            if self.fault == Fault::Keypair {
                return Err(Error::KeypairGenerationFailed);
            }
            self.inner.keypair()
        }

        fn encapsulate(&self, public_key: &PublicKey) -> Result<(Ciphertext, SharedSecret)> {
            self.calls.encapsulate.fetch_add(1, Ordering::SeqCst);
            match self.fault {
                Fault::Encapsulate => Err(Error::EncapsulationFailed),
                Fault::ShortSharedSecret => {
                    let (ciphertext, shared_secret) = self.inner.encapsulate(public_key)?;
                    let short = SharedSecret::from_bytes(&shared_secret.as_bytes()[..16])?;
                    Ok((ciphertext, short))
                }
                _ => self.inner.encapsulate(public_key),
            }
        }

        fn decapsulate(&self, secret_key: &SecretKey, ciphertext: &Ciphertext) -> Result<SharedSecret> {
            self.calls.decapsulate.fetch_add(1, Ordering::SeqCst);
            if self.fault == Fault::Decapsulate {
                return Err(Error::DecapsulationFailed);
            }
            self.inner.decapsulate(secret_key, ciphertext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{CountingBackend, Fault};
    use super::*;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("Kyber512".parse::<Algorithm>().unwrap(), Algorithm::Kyber512);
        assert_eq!("kyber1024".parse::<Algorithm>().unwrap(), Algorithm::Kyber1024);
        assert!(matches!(
            "ML-DSA-65".parse::<Algorithm>(),
            Err(Error::UnsupportedAlgorithm(id)) if id == "ML-DSA-65"
        ));
    }

    #[test]
    fn test_unsupported_algorithm_context() {
        assert!(matches!(
            KemContext::new("Frodo640"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_lengths_match_params() {
        for alg in Algorithm::ALL {
            let ctx = KemContext::for_algorithm(alg);
            let params = *ctx.params();
            let (pk, sk) = ctx.keypair().unwrap();
            assert_eq!(pk.len(), params.length_public_key);
            assert_eq!(sk.len(), params.length_secret_key);

            let (ct, ss) = ctx.encapsulate(&pk).unwrap();
            assert_eq!(ct.len(), params.length_ciphertext);
            assert_eq!(ss.len(), params.length_shared_secret);

            let recovered = ctx.decapsulate(&sk, &ct).unwrap();
            assert_eq!(recovered.len(), params.length_shared_secret);
            assert_eq!(recovered, ss);
        }
    }

    #[test]
    fn test_encapsulate_rejects_wrong_public_key_length() {
        let (ctx, calls) = CountingBackend::context(Algorithm::Kyber512, Fault::None);
        let pk = PublicKey::from_bytes(&[0u8; 799]);
        assert!(matches!(
            ctx.encapsulate(&pk),
            Err(Error::InvalidPublicKeyLength { expected: 800, actual: 799 })
        ));
        assert_eq!(calls.total(), 0);
    }

    #[test]
    fn test_decapsulate_rejects_wrong_lengths() {
        let (ctx, calls) = CountingBackend::context(Algorithm::Kyber512, Fault::None);
        let sk = SecretKey::from_bytes(&[0u8; 1632]).unwrap();
        let short_sk = SecretKey::from_bytes(&[0u8; 100]).unwrap();
        let ct = Ciphertext::from_bytes(&[0u8; 768]);
        let long_ct = Ciphertext::from_bytes(&[0u8; 769]);

        assert!(matches!(
            ctx.decapsulate(&short_sk, &ct),
            Err(Error::InvalidSecretKeyLength { expected: 1632, actual: 100 })
        ));
        assert!(matches!(
            ctx.decapsulate(&sk, &long_ct),
            Err(Error::InvalidCiphertextLength { expected: 768, actual: 769 })
        ));
        assert_eq!(calls.total(), 0);
    }

    #[test]
    fn test_wrong_sized_output_is_primitive_failure() {
        let (ctx, _calls) = CountingBackend::context(Algorithm::Kyber512, Fault::ShortSharedSecret);
        let (pk, _sk) = ctx.keypair().unwrap();
        assert!(matches!(ctx.encapsulate(&pk), Err(Error::EncapsulationFailed)));
    }
}
