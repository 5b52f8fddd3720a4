//! tally-finance: interactive categorisation session over a bank-transaction
//! corpus, with per-category totals

pub mod error;
pub mod overview;
pub mod session;

pub use error::{Result, SessionError};
pub use overview::{CategoryGroup, CategoryTotal};
pub use session::{ClassificationSession, DebugSnapshot, SessionSettings};
