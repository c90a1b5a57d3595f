//! Core types and trait definitions for the Tierra user record gateway.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::DocumentStore`]; the HTTP layer and the server
//! binary talk to users only through [`gateway::UserGateway`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod document;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod outcome;
pub mod signin;
pub mod store;
pub mod user;

pub use error::{Failure, Result, ValidationError};
pub use outcome::Outcome;
