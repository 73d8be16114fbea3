//! Signature admission for inbound transactions.
//!
//! The gate is a pure predicate: it parses the six witness fields and asks
//! the configured [`SignatureVerifier`] whether the signature checks out.
//! It never raises; any uncertainty is a `false`.

mod gate;
mod verifier;

pub use gate::SignatureGate;
pub use verifier::{sign_witness, Ed25519Verifier, SignatureVerifier};

#[cfg(test)]
pub use verifier::MockSignatureVerifier;
