//! Minimal Solidity ABI coding: unsigned integer arguments and return words.

use primitive_types::U256;
use sha3::{Digest, Keccak256};
use thiserror::Error;
use vc_api_types::AbiEntry;
use vc_chain_client::{INVALID_PARAMS, ProviderError};

const WORD_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("function '{0}' is not in the contract interface")]
    MissingFunction(String),
    #[error("{function} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported parameter type '{0}'; only unsigned integers are encoded")]
    UnsupportedType(String),
    #[error("value {value} does not fit in {kind}")]
    OutOfRange { kind: String, value: String },
    #[error("call returned no data; is a contract deployed at this address?")]
    EmptyReturn,
    #[error("malformed return data: {0}")]
    MalformedReturn(String),
}

impl From<AbiError> for ProviderError {
    fn from(err: AbiError) -> Self {
        ProviderError::new(INVALID_PARAMS, err.to_string())
    }
}

/// First four bytes of keccak-256 over the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// `0x`-prefixed call data for `entry` with the given arguments.
pub fn encode_call(entry: &AbiEntry, args: &[U256]) -> Result<String, AbiError> {
    if entry.inputs.len() != args.len() {
        return Err(AbiError::ArgumentCount {
            function: entry.name.clone(),
            expected: entry.inputs.len(),
            actual: args.len(),
        });
    }

    let mut data = String::with_capacity(2 + 8 + args.len() * WORD_HEX_LEN);
    data.push_str("0x");
    data.push_str(&hex::encode(selector(&entry.signature())));

    for (param, value) in entry.inputs.iter().zip(args) {
        let bits = uint_width(&param.kind)
            .ok_or_else(|| AbiError::UnsupportedType(param.kind.clone()))?;
        if value.bits() > bits {
            return Err(AbiError::OutOfRange {
                kind: param.kind.clone(),
                value: value.to_string(),
            });
        }
        data.push_str(&word_hex(value));
    }

    Ok(data)
}

/// Decode the first return word as an unsigned integer.
pub fn decode_uint(data: &str) -> Result<U256, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    if digits.is_empty() {
        return Err(AbiError::EmptyReturn);
    }
    if digits.len() < WORD_HEX_LEN {
        return Err(AbiError::MalformedReturn(format!(
            "expected at least {WORD_HEX_LEN} hex digits, got {}",
            digits.len()
        )));
    }
    // byte slice: the data may carry non-ASCII text from a misbehaving node
    let word = hex::decode(&digits.as_bytes()[..WORD_HEX_LEN])
        .map_err(|err| AbiError::MalformedReturn(err.to_string()))?;
    Ok(U256::from_big_endian(&word))
}

/// 32-byte big-endian word as 64 hex digits.
pub fn word_hex(value: &U256) -> String {
    let limbs = value.0;
    format!(
        "{:016x}{:016x}{:016x}{:016x}",
        limbs[3], limbs[2], limbs[1], limbs[0]
    )
}

fn uint_width(kind: &str) -> Option<usize> {
    let suffix = kind.strip_prefix("uint")?;
    if suffix.is_empty() {
        return Some(256);
    }
    let bits: usize = suffix.parse().ok()?;
    (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_api_types::AbiParam;

    fn function(name: &str, inputs: &[&str]) -> AbiEntry {
        AbiEntry {
            kind: "function".to_owned(),
            name: name.to_owned(),
            inputs: inputs
                .iter()
                .map(|kind| AbiParam {
                    name: String::new(),
                    kind: (*kind).to_owned(),
                })
                .collect(),
            outputs: Vec::new(),
            state_mutability: None,
        }
    }

    #[test]
    fn selectors_match_known_signatures() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("setNumber(uint256)"), [0x3f, 0xb5, 0xc1, 0xcb]);
    }

    #[test]
    fn encodes_uint_argument_as_padded_word() {
        let data = encode_call(&function("setNumber", &["uint256"]), &[U256::from(42u64)]).unwrap();
        assert_eq!(
            data,
            "0x3fb5c1cb000000000000000000000000000000000000000000000000000000000000002a"
        );
    }

    #[test]
    fn encodes_zero_argument_call_as_selector_only() {
        let entry = function("getNumber", &[]);
        let data = encode_call(&entry, &[]).unwrap();
        assert_eq!(data, format!("0x{}", hex::encode(selector("getNumber()"))));
        assert_eq!(data.len(), 10);
    }

    #[test]
    fn rejects_arity_type_and_range_mismatches() {
        let entry = function("setNumber", &["uint256"]);
        assert!(matches!(encode_call(&entry, &[]), Err(AbiError::ArgumentCount { .. })));

        let entry = function("setLabel", &["string"]);
        assert!(matches!(
            encode_call(&entry, &[U256::one()]),
            Err(AbiError::UnsupportedType(_))
        ));

        let entry = function("setSmall", &["uint8"]);
        assert!(encode_call(&entry, &[U256::from(255u64)]).is_ok());
        assert!(matches!(
            encode_call(&entry, &[U256::from(256u64)]),
            Err(AbiError::OutOfRange { .. })
        ));
    }

    #[test]
    fn decodes_first_word_without_precision_loss() {
        let word = format!("0x{}", word_hex(&U256::from(9_007_199_254_740_993u64)));
        assert_eq!(decode_uint(&word).unwrap(), U256::from(9_007_199_254_740_993u64));
        assert_eq!(decode_uint("0x").unwrap_err(), AbiError::EmptyReturn);
        assert!(matches!(decode_uint("0x1234"), Err(AbiError::MalformedReturn(_))));
    }

    #[test]
    fn non_hex_return_data_is_malformed_not_a_panic() {
        let straddling = format!("0x{}é", "0".repeat(63));
        assert!(matches!(decode_uint(&straddling), Err(AbiError::MalformedReturn(_))));

        let letters = format!("0x{}", "zz".repeat(32));
        assert!(matches!(decode_uint(&letters), Err(AbiError::MalformedReturn(_))));
    }
}
