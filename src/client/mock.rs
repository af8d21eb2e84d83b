//! In-memory ledger implementing [`EvmClient`] for tests
//!
//! Understands native transfers plus the ERC-20 and wrapped-native calls the
//! wallet issues. Estimation dry-runs against a copy of the state so it fails
//! the same way the real node would.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use super::provider::classify_rpc_message;
use super::{EvmClient, FeeEstimate, Receipt, SignedTransaction};
use crate::config::rpc::chains;
use crate::erc20::{IERC20, IWETH};
use crate::{tokens, Error, Result};

const NATIVE_GAS: u64 = 21_000;
const TOKEN_GAS: u64 = 50_000;
const WRAP_GAS: u64 = 45_000;

#[derive(Clone)]
struct Ledger {
    balances: HashMap<Address, U256>,
    // (token, owner)
    token_balances: HashMap<(Address, Address), U256>,
    // (token, owner, spender)
    allowances: HashMap<(Address, Address, Address), U256>,
}

impl Ledger {
    fn native(&self, who: Address) -> U256 {
        self.balances.get(&who).copied().unwrap_or_default()
    }

    fn token(&self, token: Address, owner: Address) -> U256 {
        self.token_balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn move_native(&mut self, from: Address, to: Address, value: U256) -> Result<()> {
        let have = self.native(from);
        if have < value {
            return Err(classify_rpc_message(
                &format!("insufficient funds for transfer: have {} want {}", have, value),
                None,
            ));
        }
        self.balances.insert(from, have - value);
        *self.balances.entry(to).or_default() += value;
        Ok(())
    }

    fn move_token(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        let have = self.token(token, from);
        if have < amount {
            return Err(revert("ERC20: transfer amount exceeds balance"));
        }
        self.token_balances.insert((token, from), have - amount);
        *self.token_balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    /// Apply a call and return the gas it used
    fn execute(&mut self, chain_id: u64, from: Address, to: Address, value: U256, data: &[u8]) -> Result<u64> {
        self.move_native(from, to, value)?;

        if data.is_empty() {
            return Ok(NATIVE_GAS);
        }

        let selector: [u8; 4] = data[..4.min(data.len())]
            .try_into()
            .map_err(|_| revert("malformed calldata"))?;

        match selector {
            IERC20::transferCall::SELECTOR => {
                let call = IERC20::transferCall::abi_decode(data).map_err(|_| revert("bad transfer"))?;
                self.move_token(to, from, call.to, call.amount)?;
                Ok(TOKEN_GAS)
            }
            IERC20::transferFromCall::SELECTOR => {
                let call = IERC20::transferFromCall::abi_decode(data)
                    .map_err(|_| revert("bad transferFrom"))?;
                let key = (to, call.from, from);
                let allowed = self.allowances.get(&key).copied().unwrap_or_default();
                if allowed < call.amount {
                    return Err(revert("ERC20: insufficient allowance"));
                }
                self.move_token(to, call.from, call.to, call.amount)?;
                self.allowances.insert(key, allowed - call.amount);
                Ok(TOKEN_GAS)
            }
            IERC20::approveCall::SELECTOR => {
                let call = IERC20::approveCall::abi_decode(data).map_err(|_| revert("bad approve"))?;
                self.allowances.insert((to, from, call.spender), call.amount);
                Ok(TOKEN_GAS)
            }
            IWETH::depositCall::SELECTOR if is_wrapped_native(chain_id, to) => {
                *self.token_balances.entry((to, from)).or_default() += value;
                Ok(WRAP_GAS)
            }
            IWETH::withdrawCall::SELECTOR if is_wrapped_native(chain_id, to) => {
                let call = IWETH::withdrawCall::abi_decode(data).map_err(|_| revert("bad withdraw"))?;
                let have = self.token(to, from);
                if have < call.wad {
                    return Err(revert("insufficient wrapped balance"));
                }
                self.token_balances.insert((to, from), have - call.wad);
                self.move_native(to, from, call.wad)?;
                Ok(WRAP_GAS)
            }
            _ => Err(revert("unknown function selector")),
        }
    }
}

fn revert(reason: &str) -> Error {
    classify_rpc_message(&format!("execution reverted: {}", reason), None)
}

fn is_wrapped_native(chain_id: u64, token: Address) -> bool {
    tokens::registry().wrapped_native(chain_id) == Some(token)
}

struct State {
    chain_id: u64,
    block_number: u64,
    max_fee_per_gas: u128,
    max_priority_fee_per_gas: u128,
    ledger: Ledger,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<B256, Receipt>,
    failing_receipt_lookups: u32,
    revert_next_broadcast: bool,
    failing_fee_estimates: u32,
    broadcasts: u32,
    nonce_lookups: u32,
}

pub(crate) struct MockClient {
    state: Mutex<State>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                chain_id: chains::SEPOLIA,
                block_number: 100,
                max_fee_per_gas: 2_000_000_000,
                max_priority_fee_per_gas: 1_000_000_000,
                ledger: Ledger {
                    balances: HashMap::new(),
                    token_balances: HashMap::new(),
                    allowances: HashMap::new(),
                },
                nonces: HashMap::new(),
                receipts: HashMap::new(),
                failing_receipt_lookups: 0,
                revert_next_broadcast: false,
                failing_fee_estimates: 0,
                broadcasts: 0,
                nonce_lookups: 0,
            }),
        }
    }

    pub fn fund(&self, who: Address, amount: U256) {
        *self.state.lock().unwrap().ledger.balances.entry(who).or_default() += amount;
    }

    pub fn native_balance(&self, who: Address) -> U256 {
        self.state.lock().unwrap().ledger.native(who)
    }

    pub fn mint_token(&self, token: Address, owner: Address, amount: U256) {
        *self
            .state
            .lock()
            .unwrap()
            .ledger
            .token_balances
            .entry((token, owner))
            .or_default() += amount;
    }

    pub fn token_balance(&self, token: Address, owner: Address) -> U256 {
        self.state.lock().unwrap().ledger.token(token, owner)
    }

    pub fn token_allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .ledger
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn max_fee_per_gas(&self) -> u128 {
        self.state.lock().unwrap().max_fee_per_gas
    }

    pub fn set_max_fee_per_gas(&self, fee: u128) {
        self.state.lock().unwrap().max_fee_per_gas = fee;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = chain_id;
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().unwrap().block_number
    }

    pub fn mine_blocks(&self, n: u64) {
        self.state.lock().unwrap().block_number += n;
    }

    pub fn insert_receipt(&self, receipt: Receipt) {
        self.state
            .lock()
            .unwrap()
            .receipts
            .insert(receipt.transaction_hash, receipt);
    }

    /// Make the next `n` receipt lookups fail with a network error
    pub fn fail_next_receipt_lookups(&self, n: u32) {
        self.state.lock().unwrap().failing_receipt_lookups = n;
    }

    /// Make the next `n` fee estimates fail with a network error
    pub fn fail_next_fee_estimates(&self, n: u32) {
        self.state.lock().unwrap().failing_fee_estimates = n;
    }

    /// Make the next broadcast get mined with a failed status, as when state
    /// changes between estimation and inclusion
    pub fn revert_next_broadcast(&self) {
        self.state.lock().unwrap().revert_next_broadcast = true;
    }

    pub fn broadcast_count(&self) -> u32 {
        self.state.lock().unwrap().broadcasts
    }

    pub fn nonce_lookups(&self) -> u32 {
        self.state.lock().unwrap().nonce_lookups
    }
}

fn target(request: &TransactionRequest) -> Result<Address> {
    request
        .to
        .and_then(|kind| kind.to().copied())
        .ok_or_else(|| Error::Rpc("contract creation not supported".to_string()))
}

fn parts(request: &TransactionRequest) -> Result<(Address, Address, U256, Bytes)> {
    let from = request
        .from
        .ok_or_else(|| Error::Rpc("missing from".to_string()))?;
    let to = target(request)?;
    let value = request.value.unwrap_or_default();
    let data = request.input.input().cloned().unwrap_or_default();
    Ok((from, to, value, data))
}

#[async_trait]
impl EvmClient for MockClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.native_balance(address))
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        let to = target(request)?;
        let data = request.input.input().cloned().unwrap_or_default();
        let state = self.state.lock().unwrap();

        if data.len() >= 4 {
            let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
            if selector == IERC20::balanceOfCall::SELECTOR {
                let call = IERC20::balanceOfCall::abi_decode(&data).map_err(|_| revert("bad balanceOf"))?;
                return Ok(state.ledger.token(to, call.owner).abi_encode().into());
            }
            if selector == IERC20::allowanceCall::SELECTOR {
                let call = IERC20::allowanceCall::abi_decode(&data).map_err(|_| revert("bad allowance"))?;
                let allowed = state
                    .ledger
                    .allowances
                    .get(&(to, call.owner, call.spender))
                    .copied()
                    .unwrap_or_default();
                return Ok(allowed.abi_encode().into());
            }
        }

        Err(revert("unsupported call"))
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        let (from, to, value, data) = parts(request)?;
        let state = self.state.lock().unwrap();
        let mut dry_run = state.ledger.clone();
        dry_run.execute(state.chain_id, from, to, value, &data)
    }

    async fn estimate_fees(&self) -> Result<FeeEstimate> {
        let mut state = self.state.lock().unwrap();
        if state.failing_fee_estimates > 0 {
            state.failing_fee_estimates -= 1;
            return Err(Error::Network("connection reset by peer".to_string()));
        }
        Ok(FeeEstimate {
            max_fee_per_gas: state.max_fee_per_gas,
            max_priority_fee_per_gas: state.max_priority_fee_per_gas,
        })
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.nonce_lookups += 1;
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<B256> {
        let (from, to, value, data) = parts(&tx.request)?;
        let gas_limit = tx.request.gas.unwrap_or(NATIVE_GAS);
        let price = tx.request.max_fee_per_gas.unwrap_or_default();
        let max_cost = U256::from(gas_limit) * U256::from(price) + value;

        let mut state = self.state.lock().unwrap();
        let have = state.ledger.native(from);
        if have < max_cost {
            return Err(classify_rpc_message(
                &format!("insufficient funds for gas * price + value: have {} want {}", have, max_cost),
                None,
            ));
        }

        let expected_nonce = state.nonces.get(&from).copied().unwrap_or_default();
        if tx.request.nonce != Some(expected_nonce) {
            return Err(Error::Rpc(format!(
                "nonce mismatch: expected {} got {:?}",
                expected_nonce, tx.request.nonce
            )));
        }
        state.nonces.insert(from, expected_nonce + 1);

        let chain_id = state.chain_id;
        let forced_revert = std::mem::take(&mut state.revert_next_broadcast);
        let mut next = state.ledger.clone();
        let executed = if forced_revert {
            Err(revert("state changed since estimation"))
        } else {
            next.execute(chain_id, from, to, value, &data)
        };
        let (success, gas_used) = match executed {
            Ok(gas) => {
                state.ledger = next;
                (true, gas)
            }
            Err(_) => (false, gas_limit),
        };

        let fee = U256::from(gas_used) * U256::from(price);
        let remaining = state.ledger.native(from) - fee;
        state.ledger.balances.insert(from, remaining);

        state.block_number += 1;
        state.broadcasts += 1;
        let block_number = state.block_number;

        state.receipts.insert(
            tx.hash,
            Receipt {
                transaction_hash: tx.hash,
                block_number,
                gas_used,
                effective_gas_price: price,
                success,
            },
        );

        Ok(tx.hash)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        let mut state = self.state.lock().unwrap();
        if state.failing_receipt_lookups > 0 {
            state.failing_receipt_lookups -= 1;
            return Err(Error::Network("connection reset by peer".to_string()));
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn get_block_number(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().block_number)
    }
}
