use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vc_api_types::{ChainId, ContractAddress, InterfaceDescriptor};

/// Deployment of the value contract: where it lives and how to call it.
///
/// ```json
/// { "address": "0x…", "chain_id": "0x7a69", "abi": [ … ] }
/// ```
/// `read_function` / `write_function` default to `getNumber` / `setNumber`.
/// When `chain_id` is set, binding fails on any other network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractConfig {
    pub address: ContractAddress,
    #[serde(default)]
    pub chain_id: Option<ChainId>,
    #[serde(flatten)]
    pub interface: InterfaceDescriptor,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read contract config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid contract config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ContractConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
