//! Core primitives for the Family HQ chore and allowance tracker.
//!
//! The crate exposes the building blocks the `hq` dashboard is made of:
//!
//! * [`ledger`]: the balances table, the newest-first history log and the
//!   transaction processor that moves money between them.
//! * [`store`]: the narrow table-store contract plus a file-backed
//!   workbook, an in-memory store and a read cache.
//! * [`rotation`]: the weekly duty rotation keyed off a fixed epoch.
//! * [`household`]: roles and the per-role action catalog.
//! * [`config`]: `hq.toml` parsing.
//! * [`view`]: read-side projections (vault progress, recent history).

pub mod config;
pub mod household;
pub mod ledger;
pub mod rotation;
pub mod store;
pub mod view;

mod error;

pub use error::HqError;
