//! Utility functions shared by the analyzer and rule crates.

pub mod allowance;

#[doc(inline)]
pub use allowance::{check_allow_with_reason, AllowCheck};
