//! SQLite backend for the rollcall attendance store.
//!
//! The on-disk layout is a single key-value table mirroring the web
//! client's localStorage entries, one JSON document per key. All reads are
//! served from an in-memory [`rollcall_core::roster::Roster`] loaded at
//! open; SQLite is the durability layer only. [`tokio_rusqlite`] keeps
//! database access on a dedicated thread so the async runtime never blocks.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
