//! Shared utilities for integration testing.
//!
//! `MockProvider` is an in-memory wallet + bank contract. It decodes the
//! ABI calls the client sends and applies them the way the deployed
//! contract does: deposits credit `msg.sender`, withdrawals revert on
//! insufficient balance, renames revert for anyone but the owner.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::sol_types::{SolInterface, SolValue};

use bank_client::blockchain::codec::encode_name;
use bank_client::blockchain::contract::IBank;
use bank_client::blockchain::{
    ChainClient, ContractCall, RawFailure, ReceiptOutcome, WalletProvider,
};
use bank_client::config::ChainConfig;
use bank_client::BankSession;

pub const CONTRACT: Address = Address::new([0xba; 20]);
pub const OWNER: Address = Address::new([0x01; 20]);
pub const CUSTOMER: Address = Address::new([0x02; 20]);

pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Debug)]
pub struct MockChain {
    pub accounts: Vec<Address>,
    /// Returned by `request_accounts` instead of `accounts` when set.
    pub account_failure: Option<RawFailure>,
    pub owner: Address,
    pub bank_name: B256,
    pub balances: HashMap<Address, U256>,
    pub block: u64,
    pub receipts: HashMap<TxHash, ReceiptOutcome>,
    /// Every transaction the wallet was asked to send.
    pub sent: Vec<ContractCall>,
    /// Every read-only call made.
    pub reads: Vec<ContractCall>,
    /// Consumed by the next `send_transaction`.
    pub next_send_failure: Option<RawFailure>,
    /// Returned by every read while set.
    pub read_failure: Option<RawFailure>,
    /// Receipt polls that report "pending" before the receipt shows up.
    pub pending_polls: u32,
    /// Per balance read, how long the answer takes. The value is captured
    /// when the read is issued.
    pub balance_read_delays: VecDeque<Duration>,
    tx_counter: u8,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            accounts: vec![CUSTOMER],
            account_failure: None,
            owner: OWNER,
            bank_name: B256::ZERO,
            balances: HashMap::new(),
            block: 100,
            receipts: HashMap::new(),
            sent: Vec::new(),
            reads: Vec::new(),
            next_send_failure: None,
            read_failure: None,
            pending_polls: 0,
            balance_read_delays: VecDeque::new(),
            tx_counter: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    chain: Arc<Mutex<MockChain>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose wallet exposes `account`, with `name` stored on chain.
    pub fn with_account(account: Address, name: &str) -> Self {
        let provider = Self::new();
        {
            let mut chain = provider.chain();
            chain.accounts = vec![account];
            chain.bank_name = encode_name(name).unwrap();
        }
        provider
    }

    pub fn chain(&self) -> MutexGuard<'_, MockChain> {
        self.chain.lock().unwrap()
    }

    pub fn set_balance(&self, account: Address, balance: U256) {
        self.chain().balances.insert(account, balance);
    }

    pub fn balance(&self, account: Address) -> U256 {
        self.chain().balances.get(&account).copied().unwrap_or_default()
    }

    fn sender(chain: &MockChain, call: &ContractCall) -> Address {
        call.from
            .or_else(|| chain.accounts.first().copied())
            .unwrap_or_default()
    }
}

fn reverted() -> RawFailure {
    RawFailure::Rpc {
        code: 3,
        message: "execution reverted".to_string(),
        data: None,
    }
}

impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, RawFailure> {
        let chain = self.chain();
        match &chain.account_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(chain.accounts.clone()),
        }
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, RawFailure> {
        let (output, delay) = {
            let mut chain = self.chain();
            chain.reads.push(call.clone());
            if let Some(failure) = &chain.read_failure {
                return Err(failure.clone());
            }

            let sender = Self::sender(&chain, &call);
            let decoded = IBank::IBankCalls::abi_decode(&call.data)
                .map_err(|e| RawFailure::Other(e.to_string()))?;
            match decoded {
                IBank::IBankCalls::bankName(_) => (chain.bank_name.abi_encode(), None),
                IBank::IBankCalls::bankOwner(_) => (chain.owner.abi_encode(), None),
                IBank::IBankCalls::getCustomerBalance(_) => {
                    let balance = chain.balances.get(&sender).copied().unwrap_or_default();
                    (balance.abi_encode(), chain.balance_read_delays.pop_front())
                }
                _ => return Err(reverted()),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Bytes::from(output))
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, RawFailure> {
        let mut chain = self.chain();
        if let Some(failure) = chain.next_send_failure.take() {
            return Err(failure);
        }
        chain.sent.push(call.clone());

        let sender = Self::sender(&chain, &call);
        let decoded = IBank::IBankCalls::abi_decode(&call.data)
            .map_err(|e| RawFailure::Other(e.to_string()))?;

        let success = match decoded {
            IBank::IBankCalls::depositMoney(_) => {
                *chain.balances.entry(sender).or_default() += call.value;
                true
            }
            IBank::IBankCalls::withdrawMoney(IBank::withdrawMoneyCall { amount, .. }) => {
                let balance = chain.balances.entry(sender).or_default();
                if *balance < amount {
                    false
                } else {
                    *balance -= amount;
                    true
                }
            }
            IBank::IBankCalls::setBankName(IBank::setBankNameCall { name }) => {
                if sender == chain.owner {
                    chain.bank_name = name;
                    true
                } else {
                    false
                }
            }
            _ => return Err(reverted()),
        };

        chain.tx_counter += 1;
        chain.block += 1;
        let hash = TxHash::with_last_byte(chain.tx_counter);
        let block_number = Some(chain.block);
        chain.receipts.insert(
            hash,
            ReceiptOutcome {
                success,
                block_number,
            },
        );
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptOutcome>, RawFailure> {
        let mut chain = self.chain();
        if chain.pending_polls > 0 {
            chain.pending_polls -= 1;
            return Ok(None);
        }
        Ok(chain.receipts.get(&hash).copied())
    }

    async fn block_number(&self) -> Result<u64, RawFailure> {
        Ok(self.chain().block)
    }
}

pub fn chain_config() -> ChainConfig {
    ChainConfig {
        poll_interval_ms: 1,
        ..ChainConfig::default()
    }
}

pub fn client(provider: &MockProvider) -> ChainClient<MockProvider> {
    ChainClient::new(Some(provider.clone()), CONTRACT, &chain_config())
}

pub fn session(provider: &MockProvider) -> BankSession<MockProvider> {
    BankSession::new(client(provider))
}

pub fn ether(amount: u128) -> U256 {
    U256::from(amount)
}
