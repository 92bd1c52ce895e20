//! Mortgage domain: records, the portfolio index, and the rules applied on
//! intake and amendment. Nothing here touches the ledger directly.

pub mod application;
pub mod lifecycle;
pub mod mortgage;
pub mod patch;
pub mod portfolio;
pub mod ports;
pub mod risk;
