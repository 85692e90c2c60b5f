//! Signals emitted by successful farm and splitter operations.
//!
//! Components append to an [`EventLog`] only after every state change of an
//! operation has been applied, so a failed operation never leaves a signal
//! behind.

use serde::Serialize;

use crate::types::{Address, Amount, Shares};

/// A signal emitted by a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Deposited { depositor: Address, amount: Amount },
    Released { releaser: Address, amount: Amount },
    Burned { burner: Address, amount: Amount },
    OwnershipTransferred { previous: Address, new: Address },
    SharesTransferred { from: Address, to: Address, amount: Shares },
    PayeeAdded { account: Address, shares: Shares },
    /// `delta` is the signed change in the account's shares.
    PayeeUpdated { account: Address, delta: i128 },
    PayeeRemoved { account: Address },
    PaymentReleased { account: Address, amount: Amount },
}

impl Event {
    /// Short snake_case name of the signal.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "deposited",
            Self::Released { .. } => "released",
            Self::Burned { .. } => "burned",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::SharesTransferred { .. } => "shares_transferred",
            Self::PayeeAdded { .. } => "payee_added",
            Self::PayeeUpdated { .. } => "payee_updated",
            Self::PayeeRemoved { .. } => "payee_removed",
            Self::PaymentReleased { .. } => "payment_released",
        }
    }
}

/// Append-only buffer of emitted signals.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        tracing::trace!(event = event.name(), "emit");
        self.events.push(event);
    }

    /// Append every event from `events`, preserving order.
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Remove and return all buffered events.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
