//! # DataStore Module
//!
//! The ledger behind the digest pipeline: the channels being monitored, the
//! append-only set of video ids that have already been summarized, and the
//! summaries themselves together with their delivery status.
//!
//! The module uses sqlx for the Postgres backend and also ships an in-memory
//! store with the same contract for tests and embedders without a database.

mod datastore;
mod domain;

pub use datastore::memory::MemoryDataStore;
pub use datastore::postgres::PgDataStore;
pub use datastore::DataStore;
pub use domain::{Channel, ParseStatusError, Summary, SummaryStatus};
