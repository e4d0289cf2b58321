use async_trait::async_trait;
use serde_json::{Value, json};
use std::rc::Rc;
use tracing::{debug, info, warn};
use vc_api_types::{ChainValue, ContractAddress, Identity, InterfaceDescriptor};
use vc_chain_client::{ContractCalls, ProviderError, ProviderResult, TxReceipt};

use crate::abi::{self, AbiError};
use crate::transport::{ConfirmationPolicy, RpcTransport};

/// A contract bound to a signer, speaking `eth_call` / `eth_sendTransaction`.
pub struct Eip1193Contract<T> {
    transport: Rc<T>,
    signer: Identity,
    address: ContractAddress,
    interface: InterfaceDescriptor,
    confirmation: ConfirmationPolicy,
}

impl<T: RpcTransport> Eip1193Contract<T> {
    pub fn new(
        transport: Rc<T>,
        signer: Identity,
        address: ContractAddress,
        interface: InterfaceDescriptor,
        confirmation: ConfirmationPolicy,
    ) -> Self {
        Self {
            transport,
            signer,
            address,
            interface,
            confirmation,
        }
    }

    async fn await_receipt(&self, tx_hash: &str) -> ProviderResult<TxReceipt> {
        let limit = self.confirmation.max_polls();
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let receipt = self
                .transport
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !receipt.is_null() {
                return parse_receipt(tx_hash, &receipt);
            }
            if limit.is_some_and(|max| attempt >= max) {
                break;
            }
            debug!("receipt for {tx_hash} not available (poll {attempt})");
            self.transport.delay(self.confirmation.poll_interval).await;
        }

        warn!("transaction {tx_hash} unconfirmed after {attempt} polls");
        Err(ProviderError::internal(format!(
            "transaction {tx_hash} was not confirmed within {}s",
            self.confirmation.timeout.unwrap_or_default().as_secs()
        )))
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport> ContractCalls for Eip1193Contract<T> {
    fn address(&self) -> &ContractAddress {
        &self.address
    }

    fn signer(&self) -> &Identity {
        &self.signer
    }

    async fn read_value(&self) -> ProviderResult<ChainValue> {
        let entry = self
            .interface
            .read_entry()
            .ok_or_else(|| AbiError::MissingFunction(self.interface.read_function.clone()))?;
        let data = abi::encode_call(entry, &[])?;

        let result = self
            .transport
            .request(
                "eth_call",
                json!([{ "from": self.signer.0, "to": self.address.0, "data": data }, "latest"]),
            )
            .await?;

        let raw = result
            .as_str()
            .ok_or_else(|| ProviderError::internal(format!("eth_call returned {result}")))?;
        Ok(ChainValue(abi::decode_uint(raw)?))
    }

    async fn write_value(&self, value: ChainValue) -> ProviderResult<TxReceipt> {
        let entry = self
            .interface
            .write_entry()
            .ok_or_else(|| AbiError::MissingFunction(self.interface.write_function.clone()))?;
        let data = abi::encode_call(entry, &[value.as_u256()])?;

        let result = self
            .transport
            .request(
                "eth_sendTransaction",
                json!([{ "from": self.signer.0, "to": self.address.0, "data": data }]),
            )
            .await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| {
                ProviderError::internal(format!("eth_sendTransaction returned {result}"))
            })?
            .to_owned();

        info!("submitted {} = {value} as {tx_hash}", entry.name);
        self.await_receipt(&tx_hash).await
    }
}

fn parse_receipt(tx_hash: &str, receipt: &Value) -> ProviderResult<TxReceipt> {
    let block_number = receipt
        .get("blockNumber")
        .and_then(Value::as_str)
        .and_then(|hex| u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok());

    // Receipts before Byzantium carry a state root instead of a status.
    let success = match receipt.get("status").and_then(Value::as_str) {
        Some(status) => match u64::from_str_radix(status.trim_start_matches("0x"), 16) {
            Ok(code) => code == 1,
            Err(_) => {
                return Err(ProviderError::internal(format!(
                    "receipt for {tx_hash} has unreadable status '{status}'"
                )));
            }
        },
        None => true,
    };

    Ok(TxReceipt {
        tx_hash: tx_hash.to_owned(),
        block_number,
        success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{selector, word_hex};
    use crate::testing::{ScriptedTransport, storage_interface};
    use primitive_types::U256;
    use std::time::Duration;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn contract(
        transport: ScriptedTransport,
        confirmation: ConfirmationPolicy,
    ) -> Eip1193Contract<ScriptedTransport> {
        Eip1193Contract::new(
            Rc::new(transport),
            Identity("0xabc".into()),
            ContractAddress(CONTRACT.into()),
            storage_interface(),
            confirmation,
        )
    }

    fn fast_policy(polls: u64) -> ConfirmationPolicy {
        ConfirmationPolicy {
            poll_interval: Duration::from_millis(10),
            timeout: Some(Duration::from_millis(10 * polls)),
        }
    }

    #[tokio::test]
    async fn read_value_decodes_past_double_precision() {
        let big = U256::from(9_007_199_254_740_993u64);
        let transport = ScriptedTransport::new()
            .respond("eth_call", Ok(json!(format!("0x{}", word_hex(&big)))));
        let contract = contract(transport, ConfirmationPolicy::default());

        let value = contract.read_value().await.unwrap();
        assert_eq!(value.to_string(), "9007199254740993");

        let calls = contract.transport.calls();
        assert_eq!(calls.len(), 1);
        let (method, params) = &calls[0];
        assert_eq!(method, "eth_call");
        assert_eq!(params[0]["to"], CONTRACT);
        assert_eq!(
            params[0]["data"],
            format!("0x{}", hex::encode(selector("getNumber()")))
        );
        assert_eq!(params[1], "latest");
    }

    #[tokio::test]
    async fn read_value_reports_empty_return_data() {
        let transport = ScriptedTransport::new().respond("eth_call", Ok(json!("0x")));
        let contract = contract(transport, ConfirmationPolicy::default());

        let err = contract.read_value().await.unwrap_err();
        assert!(err.message.contains("no data"));
    }

    #[tokio::test]
    async fn write_value_waits_for_receipt() {
        let transport = ScriptedTransport::new()
            .respond("eth_sendTransaction", Ok(json!("0xfeed")))
            .respond("eth_getTransactionReceipt", Ok(Value::Null))
            .respond("eth_getTransactionReceipt", Ok(Value::Null))
            .respond(
                "eth_getTransactionReceipt",
                Ok(json!({ "status": "0x1", "blockNumber": "0x10" })),
            );
        let contract = contract(transport, fast_policy(5));

        let receipt = contract.write_value(ChainValue::from(42)).await.unwrap();
        assert_eq!(
            receipt,
            TxReceipt {
                tx_hash: "0xfeed".into(),
                block_number: Some(16),
                success: true,
            }
        );
        assert_eq!(contract.transport.delays(), 2);

        let calls = contract.transport.calls();
        assert_eq!(calls[0].0, "eth_sendTransaction");
        assert_eq!(calls[0].1[0]["from"], "0xabc");
        assert_eq!(
            calls[0].1[0]["data"],
            "0x3fb5c1cb000000000000000000000000000000000000000000000000000000000000002a"
        );
    }

    #[tokio::test]
    async fn reverted_receipt_is_reported_as_unsuccessful() {
        let transport = ScriptedTransport::new()
            .respond("eth_sendTransaction", Ok(json!("0xdead")))
            .respond(
                "eth_getTransactionReceipt",
                Ok(json!({ "status": "0x0", "blockNumber": "0x2" })),
            );
        let contract = contract(transport, fast_policy(3));

        let receipt = contract.write_value(ChainValue::from(1)).await.unwrap();
        assert!(!receipt.success);
    }

    #[tokio::test]
    async fn unconfirmed_transaction_times_out() {
        let transport = ScriptedTransport::new()
            .respond("eth_sendTransaction", Ok(json!("0xslow")))
            .respond("eth_getTransactionReceipt", Ok(Value::Null))
            .respond("eth_getTransactionReceipt", Ok(Value::Null));
        let contract = contract(transport, fast_policy(2));

        let err = contract.write_value(ChainValue::from(7)).await.unwrap_err();
        assert!(err.message.contains("0xslow"));
        assert_eq!(contract.transport.delays(), 1);
    }

    #[tokio::test]
    async fn missing_accessor_fails_without_a_request() {
        let transport = ScriptedTransport::new();
        let mut contract = contract(transport, ConfirmationPolicy::default());
        contract.interface.read_function = "number".into();

        let err = contract.read_value().await.unwrap_err();
        assert!(err.message.contains("'number'"));
        assert!(contract.transport.calls().is_empty());
    }
}
