//! Core types and state management for the roster user directory.
//!
//! This crate has no terminal, HTTP or database dependencies. The fixture
//! transport and the durable key-value storage are abstracted behind
//! [`directory::FixtureSource`] and [`overlay::KeyValueStorage`]; the
//! front-end and backend crates supply the implementations.

// Trait methods are native `async fn`; the trait declarations spell out the
// `Send` bounds themselves.
#![allow(async_fn_in_trait)]

pub mod controller;
pub mod directory;
pub mod error;
pub mod filter;
pub mod overlay;
pub mod pagination;
pub mod user;

pub use error::{FilterParseError, LoadError, Result};
