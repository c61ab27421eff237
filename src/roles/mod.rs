//! The three protocol roles
//!
//! Each role owns its KEM context and runs its pipeline exactly once.

pub mod decapsulate;
pub mod encapsulate;
pub mod keygen;

pub use decapsulate::Decapsulator;
pub use encapsulate::{Encapsulation, Encapsulator};
pub use keygen::{GeneratedKeys, KeyGenerator};
