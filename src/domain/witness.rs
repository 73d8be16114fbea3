//! Signed transaction witnesses.
//!
//! A witness carries the six little-endian hex fields a client submits with
//! a transaction: the message plus the public-key and signature components.
//! Parsing is the only way to obtain a [`TxWitness`], and a parsed witness
//! is never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A witness exactly as submitted by a client: six little-endian hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWitness {
    pub msg: String,
    pub pkx: String,
    pub pky: String,
    pub sigx: String,
    pub sigy: String,
    pub sigr: String,
}

impl RawWitness {
    /// Extract a witness from a client-submitted `value` object.
    ///
    /// Returns `None` when any of the six fields is missing or not a string.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Parse the six fields as unsigned little-endian hex integers.
    ///
    /// Returns `None` on any malformed field; this function never errors.
    pub fn parse(&self) -> Option<TxWitness> {
        Some(TxWitness {
            msg: parse_le_hex(&self.msg)?,
            pkx: parse_le_hex(&self.pkx)?,
            pky: parse_le_hex(&self.pky)?,
            sigx: parse_le_hex(&self.sigx)?,
            sigy: parse_le_hex(&self.sigy)?,
            sigr: parse_le_hex(&self.sigr)?,
            raw: normalize(self),
        })
    }
}

/// A witness whose fields all parsed as unsigned hex integers.
///
/// Holds both the decoded little-endian bytes (for verification) and the
/// normalized hex text (for the private-input wire encoding, which forwards
/// the field text verbatim).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxWitness {
    msg: Vec<u8>,
    pkx: Vec<u8>,
    pky: Vec<u8>,
    sigx: Vec<u8>,
    sigy: Vec<u8>,
    sigr: Vec<u8>,
    raw: RawWitness,
}

impl TxWitness {
    pub fn msg(&self) -> &[u8] {
        &self.msg
    }

    pub fn pkx(&self) -> &[u8] {
        &self.pkx
    }

    pub fn pky(&self) -> &[u8] {
        &self.pky
    }

    pub fn sigx(&self) -> &[u8] {
        &self.sigx
    }

    pub fn sigy(&self) -> &[u8] {
        &self.sigy
    }

    pub fn sigr(&self) -> &[u8] {
        &self.sigr
    }

    /// Normalized hex field texts in wire order (msg, pkx, pky, sigx, sigy, sigr).
    pub fn hex_fields(&self) -> [&str; 6] {
        [
            &self.raw.msg,
            &self.raw.pkx,
            &self.raw.pky,
            &self.raw.sigx,
            &self.raw.sigy,
            &self.raw.sigr,
        ]
    }
}

/// Decode an unsigned little-endian hex integer.
///
/// Accepts an optional `0x`/`0X` prefix. Rejects empty, odd-length, and
/// non-hex input by returning `None` rather than erroring.
fn parse_le_hex(field: &str) -> Option<Vec<u8>> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    if digits.is_empty() {
        return None;
    }
    hex::decode(digits).ok()
}

/// Strip prefixes so the wire encoding never produces `0x0x...` tokens.
fn normalize(raw: &RawWitness) -> RawWitness {
    let strip = |s: &str| {
        s.strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s)
            .to_string()
    };
    RawWitness {
        msg: strip(&raw.msg),
        pkx: strip(&raw.pkx),
        pky: strip(&raw.pky),
        sigx: strip(&raw.sigx),
        sigy: strip(&raw.sigy),
        sigr: strip(&raw.sigr),
    }
}
