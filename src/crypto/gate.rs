//! Admission gate consulted by the HTTP ingress before enqueueing.

use std::sync::Arc;

use crate::crypto::SignatureVerifier;
use crate::domain::RawWitness;

/// Validates an inbound witness before admission.
///
/// Pure predicate with no I/O: malformed hex and out-of-range values are
/// verification failures, not errors. The verifier handle is injected so
/// tests can substitute a double.
#[derive(Clone)]
pub struct SignatureGate {
    verifier: Arc<dyn SignatureVerifier>,
}

impl SignatureGate {
    pub fn new(verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self { verifier }
    }

    /// `true` iff all six fields parse and the signature verifies.
    pub fn verify(&self, witness: &RawWitness) -> bool {
        match witness.parse() {
            Some(parsed) => self.verifier.verify_sign(&parsed),
            None => false,
        }
    }
}

impl std::fmt::Debug for SignatureGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureGate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sign_witness, Ed25519Verifier, MockSignatureVerifier};
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    fn malformed() -> RawWitness {
        RawWitness {
            msg: "zz".to_string(),
            pkx: "00".to_string(),
            pky: "00".to_string(),
            sigx: "00".to_string(),
            sigy: "00".to_string(),
            sigr: "00".to_string(),
        }
    }

    #[test]
    fn malformed_hex_is_false_and_skips_the_verifier() {
        let mut verifier = MockSignatureVerifier::new();
        verifier.expect_verify_sign().times(0);
        let gate = SignatureGate::new(Arc::new(verifier));
        assert!(!gate.verify(&malformed()));
    }

    #[test]
    fn well_formed_witness_reaches_the_verifier_once() {
        let mut verifier = MockSignatureVerifier::new();
        verifier.expect_verify_sign().times(1).return_const(true);
        let gate = SignatureGate::new(Arc::new(verifier));
        let key = SigningKey::generate(&mut OsRng);
        assert!(gate.verify(&sign_witness(&key, b"hello")));
    }

    #[test]
    fn end_to_end_with_real_verifier() {
        let gate = SignatureGate::new(Arc::new(Ed25519Verifier));
        let key = SigningKey::generate(&mut OsRng);
        assert!(gate.verify(&sign_witness(&key, b"hello")));

        let mut forged = sign_witness(&key, b"hello");
        forged.sigr = "01".to_string();
        assert!(!gate.verify(&forged));
    }
}
