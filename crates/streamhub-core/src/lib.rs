//! Core types and trait definitions for the stream hub.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the typed settings boundary, input validation, theme derivation, and the
//! storage traits every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod announcement;
pub mod error;
pub mod event;
pub mod memory;
pub mod schedule;
pub mod setting;
pub mod store;
pub mod theme;

pub use error::{Error, Result};
