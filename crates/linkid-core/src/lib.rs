//! Core types and identity-resolution logic for linkid.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage is reached through [`port::ContactPort`]; the resolver itself is
//! [`resolver::Resolver`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod consolidated;
pub mod contact;
pub mod error;
pub mod observation;
pub mod plan;
pub mod port;
pub mod resolver;
pub mod store;

pub use error::{Error, Result};
