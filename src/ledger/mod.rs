//! Ledger side of reconciliation: snapshot model, import comments, record
//! building and the import job

pub mod comment;
pub mod core;
pub mod snapshot;
pub mod transaction;

pub use comment::*;
pub use core::*;
pub use snapshot::*;
pub use transaction::*;
