//! Attestation ledger implementations.
//!
//! This module provides concrete implementations of the generic
//! [`crate::workflow::attestation::AttestationPort`] trait:
//!
//! - [`stub::StubLedger`]: an in-process stand-in for a real ledger,
//! - [`instrumented::InstrumentedLedger`]: a decorator that records
//!   Prometheus metrics around any other ledger.

pub mod instrumented;
pub mod stub;

pub use instrumented::InstrumentedLedger;
pub use stub::StubLedger;
