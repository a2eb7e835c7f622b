//! Shared types and ledger logic for the godown inventory platform
//!
//! Everything in this crate is free of I/O: the backend loads rows from the
//! datastore and hands them to these functions for balance checks, reports
//! and alert evaluation.

pub mod alerts;
pub mod ledger;
pub mod models;
pub mod reporting;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
