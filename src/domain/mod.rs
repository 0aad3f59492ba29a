//! Domain layer: identities, the processor record and its rules, payment validation,
//! and the ports through which the host ledger is reached.

pub mod events;
pub mod identity;
pub mod payment;
pub mod ports;
pub mod processor;
