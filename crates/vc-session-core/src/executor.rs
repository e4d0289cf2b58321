use tracing::{debug, info, warn};
use vc_api_types::ChainValue;
use vc_chain_client::ProviderError;

use crate::error::OpError;
use crate::session::ContractHandle;

/// Runs the value accessor and mutator. Single attempt, no retry.
#[derive(Debug, Default, Clone, Copy)]
pub struct OperationExecutor;

impl OperationExecutor {
    /// Validate user text as a non-negative whole number before anything is sent.
    pub fn parse_input(text: &str) -> Result<ChainValue, OpError> {
        ChainValue::parse_decimal(text).map_err(OpError::from)
    }

    pub async fn read_value(&self, handle: &ContractHandle) -> Result<ChainValue, OpError> {
        let value = handle.calls().read_value().await.map_err(call_failed)?;
        debug!("read {value} from {}", handle.address());
        Ok(value)
    }

    /// Resolves after confirmation with the value now stored on chain.
    pub async fn write_value(
        &self,
        handle: &ContractHandle,
        input: ChainValue,
    ) -> Result<ChainValue, OpError> {
        let receipt = handle.calls().write_value(input).await.map_err(call_failed)?;
        if !receipt.success {
            warn!("transaction {} reverted", receipt.tx_hash);
            return Err(OpError::CallFailed(format!(
                "transaction {} reverted",
                receipt.tx_hash
            )));
        }

        info!(
            "stored {input} at {} (tx {}, block {:?})",
            handle.address(),
            receipt.tx_hash,
            receipt.block_number
        );
        Ok(input)
    }
}

fn call_failed(err: ProviderError) -> OpError {
    OpError::CallFailed(err.message)
}
