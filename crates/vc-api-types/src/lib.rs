use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_READ_FUNCTION: &str = "getNumber";
pub const DEFAULT_WRITE_FUNCTION: &str = "setNumber";

/// An authorized wallet account, as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContractAddress(pub String);

impl ContractAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x` followed by exactly 40 hex digits.
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix("0x")
            .or_else(|| self.0.strip_prefix("0X"))
            .is_some_and(|digits| {
                digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit())
            })
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainId(pub String);

impl ChainId {
    /// Numeric chain id, accepting both `0x`-prefixed hex and decimal forms.
    pub fn numeric(&self) -> Option<u64> {
        let raw = self.0.trim();
        match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => raw.parse().ok(),
        }
    }

    pub fn same_chain(&self, other: &ChainId) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a == b,
            _ => self.0.trim().eq_ignore_ascii_case(other.0.trim()),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueParseError {
    #[error("a value is required")]
    Empty,
    #[error("'{0}' is not a non-negative whole number")]
    NotDecimal(String),
    #[error("'{0}' does not fit in 256 bits")]
    Overflow(String),
}

/// Unsigned contract value carried at full 256-bit width.
///
/// Never narrowed to a native integer: display and serialization both use
/// the decimal string form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainValue(pub U256);

impl ChainValue {
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn parse_decimal(input: &str) -> Result<Self, ValueParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValueParseError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValueParseError::NotDecimal(trimmed.to_owned()));
        }
        U256::from_dec_str(trimmed)
            .map(Self)
            .map_err(|_| ValueParseError::Overflow(trimmed.to_owned()))
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for ChainValue {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for ChainValue {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for ChainValue {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl fmt::Display for ChainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for ChainValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_decimal(&raw).map_err(serde::de::Error::custom)
    }
}

// ── Contract interface (ABI) ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_kind")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    pub state_mutability: Option<String>,
}

fn default_entry_kind() -> String {
    "function".to_owned()
}

impl AbiEntry {
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    /// Canonical signature used for selector derivation, e.g. `setNumber(uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.kind.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }
}

/// The contract interface plus the names of the value accessor and mutator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    #[serde(default = "default_read_function")]
    pub read_function: String,
    #[serde(default = "default_write_function")]
    pub write_function: String,
}

fn default_read_function() -> String {
    DEFAULT_READ_FUNCTION.to_owned()
}

fn default_write_function() -> String {
    DEFAULT_WRITE_FUNCTION.to_owned()
}

impl InterfaceDescriptor {
    pub fn new(abi: Vec<AbiEntry>) -> Self {
        Self {
            abi,
            read_function: default_read_function(),
            write_function: default_write_function(),
        }
    }

    /// Parse a bare ABI JSON array, using the default accessor names.
    pub fn from_abi_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        self.abi.iter().find(|entry| entry.is_function() && entry.name == name)
    }

    pub fn read_entry(&self) -> Option<&AbiEntry> {
        self.function(&self.read_function)
    }

    pub fn write_entry(&self) -> Option<&AbiEntry> {
        self.function(&self.write_function)
    }
}
