//! Authoritative in-memory session snapshot.
//!
//! Fields are private and only change through the `apply_*` transitions, so
//! the owner flag can never disagree with `account` and `bank_owner`.
//!
//! # Refresh generations
//! Reads can complete in any order. Each refreshable field carries a
//! generation clock: `begin_refresh` hands out a ticket before the read is
//! issued, and the `*_from(ticket, ..)` transitions drop results whose
//! ticket is older than the last value applied to that field. Unticketed
//! transitions count as the newest write.

use alloy::primitives::U256;
use serde::Serialize;

use crate::blockchain::codec::to_decimal_string;
use crate::blockchain::types::Account;
use crate::session::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

/// Field that can be refreshed from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BankName,
    Owner,
    Balance,
}

impl Field {
    fn index(self) -> usize {
        match self {
            Field::BankName => 0,
            Field::Owner => 1,
            Field::Balance => 2,
        }
    }
}

/// Proof that a read was issued at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    field: Field,
    generation: u64,
}

impl RefreshTicket {
    pub(crate) fn unissued(field: Field) -> Self {
        Self { field, generation: 0 }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FieldClock {
    issued: u64,
    applied: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    connection_status: ConnectionStatus,
    account: Option<Account>,
    bank_owner: Option<Account>,
    is_owner: bool,
    bank_name: Option<String>,
    balance_wei: Option<U256>,
    last_error: Option<ErrorKind>,
    clocks: [FieldClock; 3],
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Last owner address read from the contract.
    pub fn bank_owner(&self) -> Option<&Account> {
        self.bank_owner.as_ref()
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn bank_name(&self) -> Option<&str> {
        self.bank_name.as_deref()
    }

    pub fn balance_wei(&self) -> Option<U256> {
        self.balance_wei
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// The owner is connected and the bank has no name yet.
    pub fn needs_name_setup(&self) -> bool {
        self.is_owner && self.bank_name.as_deref() == Some("")
    }

    /// Record a successful wallet connection.
    ///
    /// `owner` of `None` keeps the previously known owner.
    pub fn apply_connection(&mut self, account: Account, owner: Option<Account>) {
        self.account = Some(account);
        self.connection_status = ConnectionStatus::Connected;
        if let Some(owner) = owner {
            self.stamp(Field::Owner);
            self.bank_owner = Some(owner);
        }
        self.recompute_owner();
    }

    pub fn apply_owner(&mut self, owner: Account) {
        self.stamp(Field::Owner);
        self.bank_owner = Some(owner);
        self.recompute_owner();
    }

    pub fn apply_bank_name(&mut self, name: String) {
        self.stamp(Field::BankName);
        self.bank_name = Some(name);
    }

    pub fn apply_balance(&mut self, balance_wei: U256) {
        self.stamp(Field::Balance);
        self.balance_wei = Some(balance_wei);
    }

    /// Set `last_error`. Nothing else changes.
    pub fn apply_error(&mut self, kind: ErrorKind) {
        self.last_error = Some(kind);
    }

    /// The UI has shown the error.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Reserve a generation for a read of `field` about to be issued.
    pub fn begin_refresh(&mut self, field: Field) -> RefreshTicket {
        let clock = &mut self.clocks[field.index()];
        clock.issued += 1;
        RefreshTicket {
            field,
            generation: clock.issued,
        }
    }

    /// Apply an owner read unless a newer owner value already landed.
    pub fn apply_owner_from(&mut self, ticket: RefreshTicket, owner: Account) -> bool {
        if !self.accept(ticket, Field::Owner) {
            return false;
        }
        self.bank_owner = Some(owner);
        self.recompute_owner();
        true
    }

    /// Apply a name read unless a newer name already landed.
    pub fn apply_bank_name_from(&mut self, ticket: RefreshTicket, name: String) -> bool {
        if !self.accept(ticket, Field::BankName) {
            return false;
        }
        self.bank_name = Some(name);
        true
    }

    /// Apply a balance read unless a newer balance already landed.
    pub fn apply_balance_from(&mut self, ticket: RefreshTicket, balance_wei: U256) -> bool {
        if !self.accept(ticket, Field::Balance) {
            return false;
        }
        self.balance_wei = Some(balance_wei);
        true
    }

    /// Serializable view for the UI.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection_status: self.connection_status,
            account: self.account,
            bank_owner: self.bank_owner,
            is_owner: self.is_owner,
            bank_name: self.bank_name.clone(),
            needs_name_setup: self.needs_name_setup(),
            balance_wei: self.balance_wei.map(|v| v.to_string()),
            balance: self.balance_wei.map(to_decimal_string),
            last_error: self.last_error,
        }
    }

    fn stamp(&mut self, field: Field) {
        let clock = &mut self.clocks[field.index()];
        clock.issued += 1;
        clock.applied = clock.issued;
    }

    fn accept(&mut self, ticket: RefreshTicket, field: Field) -> bool {
        if ticket.field != field {
            tracing::warn!(?ticket, ?field, "Refresh ticket used for the wrong field");
            return false;
        }
        let clock = &mut self.clocks[field.index()];
        if ticket.generation < clock.applied {
            tracing::debug!(
                ?field,
                generation = ticket.generation,
                applied = clock.applied,
                "Discarding stale refresh"
            );
            return false;
        }
        clock.applied = ticket.generation;
        true
    }

    fn recompute_owner(&mut self) {
        self.is_owner = match (&self.account, &self.bank_owner) {
            (Some(account), Some(owner)) => account == owner,
            _ => false,
        };
    }
}

/// What the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub connection_status: ConnectionStatus,
    pub account: Option<Account>,
    pub bank_owner: Option<Account>,
    pub is_owner: bool,
    pub bank_name: Option<String>,
    pub needs_name_setup: bool,
    /// Base units as a decimal integer string.
    pub balance_wei: Option<String>,
    /// Balance in whole currency units.
    pub balance: Option<String>,
    pub last_error: Option<ErrorKind>,
}
