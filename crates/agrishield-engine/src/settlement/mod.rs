//! Settlement
//!
//! - **Trigger**: threshold comparison deciding whether a policy pays out
//! - **Payout**: coverage transfer to the holder on a breach
//! - **Refund**: pro-rata premium return on early cancellation
//!
//! Payout and cancellation share one shape: stage the policy copy, stage the
//! pool debit, move funds, then commit both records together.

pub mod payout;
pub mod refund;
pub mod trigger;

pub use payout::PayoutExecutor;
pub use refund::RefundCalculator;
pub use trigger::{FanOutReport, TriggerEvaluator};
