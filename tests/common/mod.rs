//! Integration test common infrastructure.
//!
//! Provides a scripted line server standing in for the chat service and
//! helpers for ticking a client until something observable happens.

pub mod server;

#[allow(unused_imports)]
pub use server::{FakeServer, ServerConn, tick_until};
