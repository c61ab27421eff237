//! Key Material
//!
//! Byte containers for the four entities that flow through an exchange.
//! Secret keys and shared secrets live in [`SecretBytes`], which overwrites
//! its buffer when dropped, so every exit path (including `?` returns)
//! clears them.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};

/// Reserve a zero-filled buffer of exactly `len` bytes.
///
/// Reports [`Error::AllocationFailure`] instead of aborting when the
/// allocator cannot satisfy the request.
pub fn allocate(len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure { requested: len })?;
    buf.resize(len, 0);
    Ok(Zeroizing::new(buf))
}

/// Copy `bytes` into a fresh zeroizing buffer
pub(crate) fn copy_secret(bytes: &[u8]) -> Result<SecretBytes> {
    let mut buf = allocate(bytes.len())?;
    buf.copy_from_slice(bytes);
    Ok(SecretBytes(buf))
}

/// Sensitive bytes, zeroed on drop
#[derive(Clone)]
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
    pub fn new(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Zeroize for SecretBytes {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

/// Public key, safe to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Encapsulation produced by the sender, safe to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Secret key, never leaves its owner except through the `secret` artifact
#[derive(Debug, Clone)]
pub struct SecretKey(SecretBytes);

impl SecretKey {
    pub fn new(bytes: SecretBytes) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        copy_secret(bytes).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shared secret established by an exchange
///
/// Equality is evaluated in constant time.
#[derive(Debug, Clone)]
pub struct SharedSecret(SecretBytes);

impl SharedSecret {
    pub fn new(bytes: SecretBytes) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        copy_secret(bytes).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex rendering; the string is wiped when dropped
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.as_bytes()))
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.as_bytes().ct_eq(other.as_bytes()))
    }
}

impl Eq for SharedSecret {}
