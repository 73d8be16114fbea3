//! Private-input encoding for witness batches.
//!
//! The downstream node expects a count token followed by the six witness
//! fields per transaction, in submission order. This layout is part of the
//! wire contract and must be reproduced exactly.

use crate::domain::TxWitness;

/// Encode a witness batch: `"<count>:i64"`, then per witness the tokens
/// `"0x<field>:bytes-packed"` for msg, pkx, pky, sigx, sigy, sigr.
pub fn encode_private_inputs(witnesses: &[TxWitness]) -> Vec<String> {
    let mut inputs = Vec::with_capacity(1 + witnesses.len() * 6);
    inputs.push(format!("{}:i64", witnesses.len()));
    for witness in witnesses {
        for field in witness.hex_fields() {
            inputs.push(format!("0x{field}:bytes-packed"));
        }
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawWitness;

    fn witness(tag: &str) -> TxWitness {
        RawWitness {
            msg: format!("{tag}aa"),
            pkx: format!("{tag}01"),
            pky: format!("{tag}02"),
            sigx: format!("{tag}03"),
            sigy: format!("{tag}04"),
            sigr: format!("{tag}05"),
        }
        .parse()
        .unwrap()
    }

    #[test]
    fn batch_of_two_is_thirteen_tokens_in_order() {
        let inputs = encode_private_inputs(&[witness("11"), witness("22")]);
        assert_eq!(inputs.len(), 13);
        assert_eq!(inputs[0], "2:i64");
        assert_eq!(
            &inputs[1..7],
            &[
                "0x11aa:bytes-packed",
                "0x1101:bytes-packed",
                "0x1102:bytes-packed",
                "0x1103:bytes-packed",
                "0x1104:bytes-packed",
                "0x1105:bytes-packed",
            ]
        );
        assert_eq!(inputs[7], "0x22aa:bytes-packed");
    }

    #[test]
    fn empty_batch_is_just_the_count() {
        assert_eq!(encode_private_inputs(&[]), vec!["0:i64".to_string()]);
    }

    #[test]
    fn prefixed_submissions_do_not_double_the_0x() {
        let parsed = RawWitness {
            msg: "0xdead".to_string(),
            pkx: "01".to_string(),
            pky: "02".to_string(),
            sigx: "03".to_string(),
            sigy: "04".to_string(),
            sigr: "05".to_string(),
        }
        .parse()
        .unwrap();
        let inputs = encode_private_inputs(&[parsed]);
        assert_eq!(inputs[1], "0xdead:bytes-packed");
    }
}
