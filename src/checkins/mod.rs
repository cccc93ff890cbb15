//! Check-in orchestration: the transactional entry points of the engine.
//!
//! Every write path opens an IMMEDIATE transaction, which takes SQLite's
//! write lock up front. Concurrent submissions are therefore serialized:
//! two check-ins can never resolve the same "previous" check-in, and two
//! aggregate refreshes for one product can never interleave.

pub mod aggregates;
pub mod error;
pub mod orchestrator;
pub mod queries;
pub mod registry;

use rusqlite::{Connection, Transaction, TransactionBehavior};

pub use aggregates::{refresh_product_aggregate, refresh_products, repair_aggregates};
pub use error::CheckinError;
pub use orchestrator::*;
pub use queries::*;
pub use registry::*;

/// Begin a write transaction that holds the database write lock until commit.
pub(crate) fn begin_write(conn: &Connection) -> Result<Transaction<'_>, CheckinError> {
    Ok(Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?)
}
