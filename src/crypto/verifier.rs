//! Signature verification over parsed witnesses.
//!
//! The verification primitive is a deployment concern hidden behind
//! [`SignatureVerifier`]; the pipeline only consumes the boolean. The
//! bundled implementation is Ed25519. Witness coordinates map onto the
//! Edwards-y compressed encodings: `pky`/`sigy` carry the y coordinate of
//! the public key and the signature's R point, `pkx`/`sigx` contribute the
//! x-parity bit, and `sigr` is the s scalar.

#[cfg(test)]
use mockall::automock;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SIGNATURE_LENGTH};

use crate::domain::{RawWitness, TxWitness};

/// Black-box signature predicate over a parsed witness.
///
/// Implementations must be pure and must not panic on any input.
#[cfg_attr(test, automock)]
pub trait SignatureVerifier: Send + Sync {
    /// `true` iff the witness signature verifies over its message.
    fn verify_sign(&self, witness: &TxWitness) -> bool;
}

/// Ed25519 verification of witness signatures.
#[derive(Debug, Default, Clone)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify_sign(&self, witness: &TxWitness) -> bool {
        let Some(key_bytes) = compress(witness.pky(), witness.pkx()) else {
            return false;
        };
        let Some(r_bytes) = compress(witness.sigy(), witness.sigx()) else {
            return false;
        };
        let Some(s_bytes) = pad32(witness.sigr()) else {
            return false;
        };

        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };

        let mut sig_bytes = [0u8; SIGNATURE_LENGTH];
        sig_bytes[..32].copy_from_slice(&r_bytes);
        sig_bytes[32..].copy_from_slice(&s_bytes);
        let signature = Signature::from_bytes(&sig_bytes);

        key.verify_strict(witness.msg(), &signature).is_ok()
    }
}

/// Build the compressed Edwards encoding from a little-endian y coordinate
/// and the parity of x. Returns `None` for out-of-range y.
fn compress(y_le: &[u8], x_le: &[u8]) -> Option<[u8; 32]> {
    let mut bytes = pad32(y_le)?;
    if bytes[31] & 0x80 != 0 {
        return None;
    }
    let x_parity = x_le.first().copied().unwrap_or(0) & 1;
    bytes[31] |= x_parity << 7;
    Some(bytes)
}

/// Left-pad (in little-endian terms: extend with high zero bytes) to 32
/// bytes. Integers wider than 32 bytes are out of range.
fn pad32(le: &[u8]) -> Option<[u8; 32]> {
    if le.len() > 32 {
        return None;
    }
    let mut bytes = [0u8; 32];
    bytes[..le.len()].copy_from_slice(le);
    Some(bytes)
}

/// Sign `msg` and lay the key and signature out as witness fields.
///
/// Counterpart of [`Ed25519Verifier`]: splits the compressed public key and
/// R point into (y, x-parity) pairs and carries the s scalar in `sigr`.
pub fn sign_witness(key: &SigningKey, msg: &[u8]) -> RawWitness {
    let signature = key.sign(msg).to_bytes();
    let (pky, pkx) = split_compressed(&key.verifying_key().to_bytes());
    let mut r = [0u8; 32];
    r.copy_from_slice(&signature[..32]);
    let (sigy, sigx) = split_compressed(&r);

    RawWitness {
        msg: hex::encode(msg),
        pkx,
        pky,
        sigx,
        sigy,
        sigr: hex::encode(&signature[32..]),
    }
}

fn split_compressed(compressed: &[u8; 32]) -> (String, String) {
    let mut y = *compressed;
    let parity = y[31] >> 7;
    y[31] &= 0x7f;
    (hex::encode(y), hex::encode([parity]))
}
