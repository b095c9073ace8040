//! Core data types for AgriShield

pub mod account;
pub mod address;
pub mod observation;
pub mod oracle;
pub mod policy;
pub mod risk_pool;

pub use address::{Address, Amount, BlockHeight, PolicyId, TxContext};
