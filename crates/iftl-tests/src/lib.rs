//! Scenario and adversarial test suite for IFTL yield farming.
//!
//! Integration tests drive a complete in-memory deployment (two token
//! ledgers, a manual clock and the farm) through end-to-end scenarios and
//! randomized operation sequences, checking the ledger invariants after
//! every step.

pub mod helpers;
