//! Domain model for rollcall: subjects with weekly schedules, dated
//! attendance records, and the derivations built on top of them.
//!
//! Everything here is pure state and pure functions; persistence lives
//! behind the [`store::AttendanceStore`] trait.

// Store backends implement the trait methods as native `async fn`
// (stabilised in Rust 1.75). Suppress the advisory lint about `Send` bounds
// on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod prefs;
pub mod record;
pub mod roster;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
