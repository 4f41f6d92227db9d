//! Nexus is an interactive terminal chat client for remote LLM APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation state, the [`core::provider::Provider`]
//!   contract, the streaming/batched completion pipeline, and the executor
//!   that routes each input line.
//! - [`commands`] implements the `:`-prefixed administrative commands and
//!   the registry they are looked up in.
//! - [`api`] holds the concrete vendor backends that satisfy the provider
//!   contract.
//! - [`ui`] drives the line-oriented interactive session.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
