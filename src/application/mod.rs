//! Application layer orchestrating intake, amendment and queries.
//!
//! This module defines the `MortgageLedger` service, which reads from the
//! ledger, hands the pure lifecycle rules their inputs, and commits the
//! results back as one guarded batch.

pub mod ledger;
